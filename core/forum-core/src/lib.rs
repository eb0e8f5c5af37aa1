//! # forum-core: Embedded Discussion-Forum Store
//!
//! Users, forums, threads, threaded posts and votes over an ordered
//! key-value store, in memory or on disk with sled.
//!
//! ## Highlights
//!
//! - **Materialized paths**: every post stores the chain of ids from its
//!   thread root, so tree-ordered pages are plain index range scans
//! - **Keyset pagination**: flat, tree and parent_tree listings, ascending or
//!   descending, resumed from a cursor post
//! - **Idempotent create**: uniqueness races on users, forums and threads
//!   resolve to the stored record instead of an error
//! - **Atomic units of work**: typestate write transactions published as one
//!   batch, plus consistent read snapshots
//!
//! ## Quick start
//!
//! ```rust
//! use forum_core::{ForumEngine, NewForum, NewPost, NewThread, PostQuery, SortMode, ThreadRef, UserProfile};
//!
//! # fn main() -> forum_core::ForumResult<()> {
//! let engine = ForumEngine::open_in_memory()?;
//! engine.create_user("alice", UserProfile {
//!     email: "alice@example.org".into(),
//!     ..Default::default()
//! })?;
//! engine.create_forum(NewForum { slug: "rust".into(), title: "Rust".into(), user: "alice".into() })?;
//! let thread = engine
//!     .create_thread("rust", NewThread { title: "Hello".into(), author: "alice".into(), ..Default::default() })?
//!     .created()
//!     .unwrap();
//!
//! let thread = ThreadRef::Id(thread.id);
//! let root = engine.create_posts(&thread, vec![NewPost::root("alice", "first")])?;
//! engine.create_posts(&thread, vec![NewPost::reply(root[0].id, "alice", "reply")])?;
//!
//! let page = engine.posts(&thread, PostQuery::new(SortMode::Tree))?;
//! assert_eq!(page[1].path.as_slice(), &[root[0].id, page[1].id]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module layout
//!
//! - [`engine`]: the [`ForumEngine`] facade and its operations
//! - [`query`]: post pagination planner and executor, forum listings
//! - [`repository`]: typed reads and writes, table layout
//! - [`transaction`]: write units, snapshots, id sequences
//! - [`storage`]: in-memory and sled backends
//! - [`path`]: materialized path encoding

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod path;
pub mod query;
pub mod repository;
pub mod storage;
pub mod transaction;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use config::{ForumConfig, StorageConfig, TallyMode};
pub use engine::ForumEngine;
pub use error::{ErrorKind, ForumError, ForumResult};
pub use model::{
    CreateOutcome, Forum, NewForum, NewPost, NewThread, NewVote, Post, PostDetails, PostUpdate,
    Related, Status, Thread, ThreadRef, ThreadUpdate, User, UserProfile, UserUpdate, Vote,
};
pub use path::MaterializedPath;
pub use query::{PostQuery, SortMode, ThreadListQuery, UserListQuery};
