//! Service-level operations: counters and administrative reset.

use crate::engine::ForumEngine;
use crate::error::ForumResult;
use crate::model::Status;
use crate::repository::WriteRepository;
use crate::repository::tables::{FORUMS, POSTS, THREADS, USERS};
use tracing::{info, instrument};

impl ForumEngine {
    pub fn status(&self) -> ForumResult<Status> {
        self.read(|snapshot| {
            Ok(Status {
                user: snapshot.count(USERS)?,
                forum: snapshot.count(FORUMS)?,
                thread: snapshot.count(THREADS)?,
                post: snapshot.count(POSTS)?,
            })
        })
    }

    /// Wipe every table in one unit of work. Id sequences keep counting,
    /// also across a reopen.
    #[instrument(skip(self))]
    pub fn reset(&self) -> ForumResult<()> {
        self.write("reset", |tx| {
            tx.clear_all()?;
            tx.record_id_marks(
                self.store.thread_ids().current(),
                self.store.post_ids().current(),
            )?;
            Ok(())
        })?;
        info!("all tables cleared");
        Ok(())
    }
}
