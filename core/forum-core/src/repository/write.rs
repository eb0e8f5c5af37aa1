use super::tables::{
    ALL, FORUMS, IDX_FORUM_POSTS, IDX_FORUM_THREADS, IDX_FORUM_USERS, IDX_POST_TREE,
    IDX_THREAD_POSTS, IDX_THREAD_ROOTS, IDX_THREAD_SLUG, IDX_USER_EMAIL, META, POST_ID_MARK,
    POSTS, THREAD_ID_MARK, THREADS, USERS, VOTES,
};
use super::{
    email_key, forum_key, forum_post_key, forum_thread_key, forum_user_key, post_key,
    post_tree_key, thread_key, thread_post_key, thread_root_key, thread_slug_key, user_key,
    vote_key,
};
use crate::error::StoreResult;
use crate::model::{Forum, Post, Thread, User, Vote};
use crate::storage::codec::{decode, encode};
use crate::storage::keys::{fold, u64_key};
use crate::transaction::{Active, Transaction};

/// Mutations. Every method keeps the secondary indexes of the row it
/// writes in step with the row.
///
/// Methods named `insert_*` enforce natural-key uniqueness; a collision
/// poisons the unit and returns [`StoreError::UniqueViolation`] naming the
/// colliding table.
///
/// [`StoreError::UniqueViolation`]: crate::error::StoreError::UniqueViolation
pub trait WriteRepository {
    fn insert_user(&mut self, user: &User) -> StoreResult<()>;

    /// Replace `current` with `updated`, moving the email index entry when
    /// the folded email changes.
    fn update_user(&mut self, current: &User, updated: &User) -> StoreResult<()>;

    fn insert_forum(&mut self, forum: &Forum) -> StoreResult<()>;

    fn put_forum(&mut self, forum: &Forum) -> StoreResult<()>;

    fn insert_thread(&mut self, thread: &Thread) -> StoreResult<()>;

    /// Overwrite mutable thread fields. Slug, forum and created never change.
    fn put_thread(&mut self, thread: &Thread) -> StoreResult<()>;

    fn insert_post(&mut self, post: &Post) -> StoreResult<()>;

    fn put_post(&mut self, post: &Post) -> StoreResult<()>;

    /// Record a forum participant.
    fn add_forum_user(&mut self, forum: &str, nickname: &str) -> StoreResult<()>;

    /// Insert the vote unless the (thread, nickname) row exists; returns
    /// the existing row in that case.
    fn insert_vote_if_absent(&mut self, vote: &Vote) -> StoreResult<Option<Vote>>;

    fn put_vote(&mut self, vote: &Vote) -> StoreResult<()>;

    /// Wipe every table.
    fn clear_all(&mut self) -> StoreResult<()>;

    /// Record the last allocated thread and post ids, so a reopened store
    /// never hands them out again once the rows carrying them are gone.
    fn record_id_marks(&mut self, last_thread: u64, last_post: u64) -> StoreResult<()>;
}

impl WriteRepository for Transaction<'_, Active> {
    fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        self.insert_unique(USERS, user_key(&user.nickname), encode(user)?)?;
        self.insert_unique(
            IDX_USER_EMAIL,
            email_key(&user.email),
            user_key(&user.nickname),
        )
    }

    fn update_user(&mut self, current: &User, updated: &User) -> StoreResult<()> {
        if fold(&current.email) != fold(&updated.email) {
            self.insert_unique(
                IDX_USER_EMAIL,
                email_key(&updated.email),
                user_key(&updated.nickname),
            )?;
            self.delete(IDX_USER_EMAIL, email_key(&current.email))?;
        }
        self.put(USERS, user_key(&updated.nickname), encode(updated)?)
    }

    fn insert_forum(&mut self, forum: &Forum) -> StoreResult<()> {
        self.insert_unique(FORUMS, forum_key(&forum.slug), encode(forum)?)
    }

    fn put_forum(&mut self, forum: &Forum) -> StoreResult<()> {
        self.put(FORUMS, forum_key(&forum.slug), encode(forum)?)
    }

    fn insert_thread(&mut self, thread: &Thread) -> StoreResult<()> {
        if let Some(slug) = &thread.slug {
            self.insert_unique(IDX_THREAD_SLUG, thread_slug_key(slug), u64_key(thread.id))?;
        }
        self.put(THREADS, thread_key(thread.id), encode(thread)?)?;
        self.put(
            IDX_FORUM_THREADS,
            forum_thread_key(&thread.forum, &thread.created, thread.id),
            u64_key(thread.id),
        )?;
        self.add_forum_user(&thread.forum, &thread.author)
    }

    fn put_thread(&mut self, thread: &Thread) -> StoreResult<()> {
        self.put(THREADS, thread_key(thread.id), encode(thread)?)
    }

    fn insert_post(&mut self, post: &Post) -> StoreResult<()> {
        self.put(POSTS, post_key(post.id), encode(post)?)?;
        self.put(IDX_THREAD_POSTS, thread_post_key(post.thread, post.id), Vec::new())?;
        self.put(
            IDX_POST_TREE,
            post_tree_key(post.thread, &post.path),
            u64_key(post.id),
        )?;
        if post.is_root() {
            self.put(IDX_THREAD_ROOTS, thread_root_key(post.thread, post.id), Vec::new())?;
        }
        self.put(IDX_FORUM_POSTS, forum_post_key(&post.forum, post.id), Vec::new())?;
        self.add_forum_user(&post.forum, &post.author)
    }

    fn put_post(&mut self, post: &Post) -> StoreResult<()> {
        self.put(POSTS, post_key(post.id), encode(post)?)
    }

    fn add_forum_user(&mut self, forum: &str, nickname: &str) -> StoreResult<()> {
        self.put(IDX_FORUM_USERS, forum_user_key(forum, nickname), Vec::new())
    }

    fn insert_vote_if_absent(&mut self, vote: &Vote) -> StoreResult<Option<Vote>> {
        let existing = self.insert_if_absent(
            VOTES,
            vote_key(vote.thread, &vote.nickname),
            encode(vote)?,
        )?;
        match existing {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_vote(&mut self, vote: &Vote) -> StoreResult<()> {
        self.put(VOTES, vote_key(vote.thread, &vote.nickname), encode(vote)?)
    }

    fn clear_all(&mut self) -> StoreResult<()> {
        for table in ALL {
            self.clear(table)?;
        }
        Ok(())
    }

    fn record_id_marks(&mut self, last_thread: u64, last_post: u64) -> StoreResult<()> {
        self.put(META, THREAD_ID_MARK.to_vec(), u64_key(last_thread))?;
        self.put(META, POST_ID_MARK.to_vec(), u64_key(last_post))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyMode;
    use crate::error::StoreError;
    use crate::model::UserProfile;
    use crate::repository::ReadRepository;
    use crate::storage::InMemoryBackend;
    use crate::storage::keys::decode_u64;
    use crate::transaction::Store;
    use std::sync::Arc;

    fn store() -> Store {
        Store::new(Arc::new(InMemoryBackend::new()), TallyMode::Stored)
    }

    fn user(nickname: &str, email: &str) -> User {
        UserProfile {
            email: email.to_string(),
            ..Default::default()
        }
        .into_user(nickname)
    }

    #[test]
    fn email_collision_names_the_index() {
        let store = store();
        let mut tx = store.begin();
        tx.insert_user(&user("alice", "a@x.org")).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        let err = tx.insert_user(&user("bob", "A@X.org")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation {
                table: IDX_USER_EMAIL
            }
        ));
        assert!(tx.is_poisoned());
    }

    #[test]
    fn email_change_moves_the_index_entry() {
        let store = store();
        let alice = user("alice", "a@x.org");
        let mut tx = store.begin();
        tx.insert_user(&alice).unwrap();
        let moved = User {
            email: "new@x.org".into(),
            ..alice.clone()
        };
        tx.update_user(&alice, &moved).unwrap();
        tx.commit().unwrap();

        let snapshot = store.snapshot();
        assert!(snapshot.user_by_email("a@x.org").unwrap().is_none());
        assert_eq!(
            snapshot.user_by_email("new@x.org").unwrap().unwrap().nickname,
            "alice"
        );
    }

    #[test]
    fn clear_all_empties_every_table() {
        let store = store();
        let mut tx = store.begin();
        tx.insert_user(&user("alice", "a@x.org")).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        tx.clear_all().unwrap();
        tx.commit().unwrap();
        for table in ALL {
            assert_eq!(store.backend().count(table).unwrap(), 0);
        }
    }

    #[test]
    fn id_marks_survive_clear_all() {
        let store = store();
        let mut tx = store.begin();
        tx.clear_all().unwrap();
        tx.record_id_marks(7, 42).unwrap();
        tx.commit().unwrap();

        let snapshot = store.snapshot();
        let mark = |key: &[u8]| {
            snapshot
                .get(META, key)
                .unwrap()
                .map(|v| decode_u64(&v).unwrap())
        };
        assert_eq!(mark(THREAD_ID_MARK), Some(7));
        assert_eq!(mark(POST_ID_MARK), Some(42));
    }
}
