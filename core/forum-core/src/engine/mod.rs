//! Forum engine facade.
//!
//! [`ForumEngine`] is the single entry point. Every public operation runs in
//! exactly one unit of work: mutations through the coordinator's write path,
//! lookups through a snapshot.
//!
//! # Example
//!
//! ```rust
//! use forum_core::{ForumEngine, NewForum, UserProfile};
//!
//! # fn main() -> forum_core::ForumResult<()> {
//! let engine = ForumEngine::open_in_memory()?;
//! engine.create_user("alice", UserProfile {
//!     fullname: "Alice".into(),
//!     about: String::new(),
//!     email: "alice@example.org".into(),
//! })?;
//! let forum = engine
//!     .create_forum(NewForum {
//!         slug: "rust".into(),
//!         title: "Rust".into(),
//!         user: "ALICE".into(),
//!     })?
//!     .created()
//!     .unwrap();
//! assert_eq!(forum.user, "alice");
//! # Ok(())
//! # }
//! ```

pub mod constructors;
pub mod coordinator;
pub mod forums;
pub mod idempotent;
pub mod posts;
pub mod service;
pub mod threads;
pub mod users;
pub mod votes;

use crate::config::{ForumConfig, TallyMode};
use crate::error::ForumResult;
use crate::transaction::Store;

/// Embedded discussion-forum store.
///
/// `Send + Sync`; share it across worker threads behind an `Arc`.
pub struct ForumEngine {
    pub(crate) store: Store,
    pub(crate) config: ForumConfig,
}

impl ForumEngine {
    pub fn config(&self) -> &ForumConfig {
        &self.config
    }

    pub fn tally_mode(&self) -> TallyMode {
        self.store.tally()
    }

    /// Number of units of work currently open.
    pub fn active_units(&self) -> usize {
        self.store.manager().active_count()
    }

    /// Persist buffered backend data.
    pub fn flush(&self) -> ForumResult<()> {
        self.store.backend().flush()?;
        Ok(())
    }

    pub(crate) fn page_limit(&self) -> usize {
        self.config.default_page_limit
    }
}
