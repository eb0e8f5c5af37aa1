//! Typed repository over units of work.
//!
//! One method per query. [`ReadRepository`] works on any [`TableReader`]
//! (snapshots and write units alike); [`WriteRepository`] only on an active
//! write unit. Every secondary index is maintained here, next to the row it
//! indexes.
//!
//! [`TableReader`]: crate::transaction::TableReader

pub mod read;
pub mod tables;
pub mod write;

pub use read::ReadRepository;
pub use write::WriteRepository;

use crate::path::MaterializedPath;
use crate::storage::keys::{join, text_key, text_prefix, timestamp_key, u64_key};
use chrono::{DateTime, Utc};

// ════════════════════════════════════════════
// Key builders
// ════════════════════════════════════════════

pub(crate) fn user_key(nickname: &str) -> Vec<u8> {
    text_key(nickname)
}

pub(crate) fn email_key(email: &str) -> Vec<u8> {
    text_key(email)
}

pub(crate) fn forum_key(slug: &str) -> Vec<u8> {
    text_key(slug)
}

pub(crate) fn thread_key(id: u64) -> Vec<u8> {
    u64_key(id)
}

pub(crate) fn thread_slug_key(slug: &str) -> Vec<u8> {
    text_key(slug)
}

pub(crate) fn forum_thread_key(forum: &str, created: &DateTime<Utc>, id: u64) -> Vec<u8> {
    join(&[&text_prefix(forum), &timestamp_key(created), &u64_key(id)])
}

pub(crate) fn forum_user_key(forum: &str, nickname: &str) -> Vec<u8> {
    join(&[&text_prefix(forum), &text_key(nickname)])
}

pub(crate) fn post_key(id: u64) -> Vec<u8> {
    u64_key(id)
}

pub(crate) fn thread_post_key(thread: u64, id: u64) -> Vec<u8> {
    join(&[&u64_key(thread), &u64_key(id)])
}

pub(crate) fn post_tree_key(thread: u64, path: &MaterializedPath) -> Vec<u8> {
    join(&[&u64_key(thread), &path.encode()])
}

pub(crate) fn thread_root_key(thread: u64, root: u64) -> Vec<u8> {
    join(&[&u64_key(thread), &u64_key(root)])
}

pub(crate) fn forum_post_key(forum: &str, id: u64) -> Vec<u8> {
    join(&[&text_prefix(forum), &u64_key(id)])
}

pub(crate) fn vote_key(thread: u64, nickname: &str) -> Vec<u8> {
    join(&[&u64_key(thread), &text_key(nickname)])
}
