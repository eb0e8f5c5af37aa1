use crate::config::TallyMode;
use crate::engine::ForumEngine;
use crate::engine::idempotent::Attempt;
use crate::error::{ForumError, ForumResult};
use crate::model::{CreateOutcome, NewThread, Thread, ThreadRef, ThreadUpdate};
use crate::repository::{ReadRepository, WriteRepository};
use crate::transaction::TableReader;
use chrono::Utc;
use tracing::instrument;

impl ForumEngine {
    /// Create a thread in `forum_slug`. A thread with a slug is created at
    /// most once; later calls return the stored thread.
    #[instrument(skip(self, new), fields(author = %new.author))]
    pub fn create_thread(
        &self,
        forum_slug: &str,
        new: NewThread,
    ) -> ForumResult<CreateOutcome<Thread>> {
        let slug = new.slug().map(str::to_string);
        self.create_idempotent(
            "create_thread",
            |tx| {
                let author = tx.user_by_nickname(&new.author)?.ok_or_else(|| {
                    ForumError::NotFound(format!(
                        "Can't find thread author by nickname: {}",
                        new.author
                    ))
                })?;
                let mut forum = tx.forum_by_slug(forum_slug)?.ok_or_else(|| {
                    ForumError::NotFound(format!("Can't find thread forum by slug: {forum_slug}"))
                })?;

                let thread = Thread {
                    id: tx.next_thread_id(),
                    title: new.title,
                    author: author.nickname,
                    forum: forum.slug.clone(),
                    message: new.message,
                    votes: 0,
                    slug: slug.clone(),
                    created: new.created.unwrap_or_else(Utc::now),
                };
                let mut result = tx.insert_thread(&thread);
                if result.is_ok() && tx.tally() == TallyMode::Stored {
                    forum.threads += 1;
                    result = tx.put_forum(&forum);
                }
                Attempt::classify(result, thread)
            },
            |snapshot| match &slug {
                Some(slug) => Ok(snapshot.thread_by_slug(slug)?),
                None => Ok(None),
            },
        )
    }

    pub fn thread(&self, thread: &ThreadRef) -> ForumResult<Thread> {
        self.read(|snapshot| {
            snapshot
                .resolve_thread(thread)?
                .ok_or_else(|| ForumError::NotFound(thread.not_found()))
        })
    }

    /// Partial update of title and message.
    #[instrument(skip(self, update), fields(thread = %thread))]
    pub fn update_thread(&self, thread: &ThreadRef, update: ThreadUpdate) -> ForumResult<Thread> {
        self.write("update_thread", |tx| {
            let current = tx
                .resolve_thread(thread)?
                .ok_or_else(|| ForumError::NotFound(thread.not_found()))?;
            let updated = update.apply(&current);
            if updated != current {
                tx.put_thread(&updated)?;
            }
            Ok(updated)
        })
    }
}
