//! Entity records and request payloads.
//!
//! Stored records are `bincode`-encoded, so none of these types may use
//! `skip_serializing_if` or other attributes that make the field layout
//! depend on the value.

pub mod forum;
pub mod post;
pub mod status;
pub mod thread;
pub mod user;
pub mod vote;

pub use forum::{Forum, NewForum};
pub use post::{NewPost, Post, PostDetails, PostUpdate, Related};
pub use status::Status;
pub use thread::{NewThread, Thread, ThreadRef, ThreadUpdate};
pub use user::{User, UserProfile, UserUpdate};
pub use vote::{NewVote, Vote};

/// Result of an idempotent create.
///
/// `AlreadyExists` carries the record(s) that won the uniqueness race. It
/// is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome<T, C = T> {
    Created(T),
    AlreadyExists(C),
}

impl<T, C> CreateOutcome<T, C> {
    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }

    pub fn created(self) -> Option<T> {
        match self {
            CreateOutcome::Created(value) => Some(value),
            CreateOutcome::AlreadyExists(_) => None,
        }
    }

    pub fn existing(self) -> Option<C> {
        match self {
            CreateOutcome::Created(_) => None,
            CreateOutcome::AlreadyExists(existing) => Some(existing),
        }
    }
}

/// Partial-update rule: absent or empty means "keep the current value".
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
