//! Vote reconciliation.
//!
//! One vote row per (thread, user). A repeated vote with the same voice is
//! a no-op; a changed voice updates the row in place and moves the tally by
//! the difference.

use crate::config::TallyMode;
use crate::engine::ForumEngine;
use crate::engine::users::user_not_found;
use crate::error::{ForumError, ForumResult};
use crate::model::{NewVote, Thread, ThreadRef, Vote};
use crate::repository::{ReadRepository, WriteRepository};
use crate::transaction::TableReader;
use tracing::{debug, instrument};

impl ForumEngine {
    /// Cast or change a vote. Returns the thread with its updated total.
    #[instrument(skip(self, vote), fields(thread = %thread, voice = vote.voice))]
    pub fn vote(&self, thread: &ThreadRef, vote: NewVote) -> ForumResult<Thread> {
        if !vote.is_valid_voice() {
            return Err(ForumError::Internal(format!(
                "voice must be 1 or -1, got {}",
                vote.voice
            )));
        }

        self.write("vote", |tx| {
            let user = tx
                .user_by_nickname(&vote.nickname)?
                .ok_or_else(|| user_not_found(&vote.nickname))?;
            let mut target = tx
                .resolve_thread(thread)?
                .ok_or_else(|| ForumError::NotFound(thread.not_found()))?;

            let row = Vote {
                thread: target.id,
                nickname: user.nickname,
                voice: vote.voice,
            };
            let previous = match tx.insert_vote_if_absent(&row)? {
                None => 0,
                Some(existing) => {
                    if existing.voice != row.voice {
                        tx.put_vote(&row)?;
                    }
                    existing.voice
                }
            };

            let delta = i64::from(row.voice - previous);
            debug!(delta, "vote reconciled");
            if delta != 0 && tx.tally() == TallyMode::Stored {
                target.votes += delta;
                tx.put_thread(&target)?;
            }
            tx.thread_by_id(target.id)?
                .ok_or_else(|| ForumError::Internal(format!("thread {} vanished", target.id)))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ForumConfig, TallyMode};
    use crate::engine::ForumEngine;
    use crate::model::{NewForum, NewThread, NewVote, ThreadRef, UserProfile, Vote};
    use crate::repository::tables::VOTES;
    use crate::storage::codec::decode;
    use crate::storage::keys::u64_key;
    use crate::storage::{Direction, KeyRange};

    fn engine_with_thread(tally: TallyMode) -> (ForumEngine, u64) {
        let engine = ForumEngine::open(ForumConfig::new().with_tally(tally)).unwrap();
        for nickname in ["x", "y"] {
            let profile = UserProfile {
                email: format!("{nickname}@example.org"),
                ..Default::default()
            };
            engine.create_user(nickname, profile).unwrap();
        }
        engine
            .create_forum(NewForum {
                slug: "f".into(),
                title: "F".into(),
                user: "x".into(),
            })
            .unwrap();
        let thread = engine
            .create_thread(
                "f",
                NewThread {
                    title: "t".into(),
                    author: "x".into(),
                    ..Default::default()
                },
            )
            .unwrap()
            .created()
            .unwrap();
        (engine, thread.id)
    }

    #[test]
    fn repeated_vote_keeps_one_row_per_user() {
        for tally in [TallyMode::Stored, TallyMode::Live] {
            let (engine, id) = engine_with_thread(tally);
            let thread = ThreadRef::Id(id);
            engine.vote(&thread, NewVote::new("x", 1)).unwrap();
            engine.vote(&thread, NewVote::new("X", 1)).unwrap();
            let voted = engine.vote(&thread, NewVote::new("y", -1)).unwrap();
            assert_eq!(voted.votes, 0, "{tally:?}");

            let snapshot = engine.store.snapshot();
            let rows: Vec<Vote> = snapshot
                .scan(VOTES, &KeyRange::prefix(&u64_key(id)), Direction::Forward, None)
                .unwrap()
                .into_iter()
                .map(|(_, bytes)| decode(&bytes).unwrap())
                .collect();
            let voices: Vec<(&str, i32)> = rows
                .iter()
                .map(|vote| (vote.nickname.as_str(), vote.voice))
                .collect();
            assert_eq!(voices, vec![("x", 1), ("y", -1)], "{tally:?}");
        }
    }
}
