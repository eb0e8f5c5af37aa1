//! Error types for the forum store.
//!
//! Two layers: [`StoreError`] is what the storage and transaction layers
//! report, already classified into a closed set of kinds. [`ForumError`] is
//! what engine operations return to the caller. Core logic only ever branches
//! on `StoreError` variants, never on backend-specific error values.

use thiserror::Error;

/// Classified storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert hit a uniqueness constraint. The unit of work that issued
    /// it is poisoned.
    #[error("unique constraint violated on '{table}'")]
    UniqueViolation { table: &'static str },

    /// A row that had to exist is missing
    #[error("row not found")]
    NotFound,

    /// The unit of work can no longer execute statements
    #[error("transaction aborted: {reason}")]
    TransactionAborted { reason: String },

    /// Anything else: I/O, corruption, undecodable rows
    #[error("store failure: {0}")]
    Other(String),
}

impl StoreError {
    /// True for a uniqueness violation on a natural key.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Other(format!("sled: {err}"))
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Other(format!("row codec: {err}"))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Other(format!("io: {err}"))
    }
}

/// Result type alias for storage and transaction operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Caller-facing kind of a [`ForumError`] (404 / 409 / 500 equivalents).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Internal,
}

/// Unified error type for all engine operations.
#[derive(Debug, Error)]
pub enum ForumError {
    /// A referenced user, forum, thread or post does not exist
    #[error("{0}")]
    NotFound(String),

    /// The request collides with existing state
    #[error("{0}")]
    Conflict(String),

    /// Malformed input or an unexpected store failure
    #[error("internal error: {0}")]
    Internal(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ForumError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForumError::NotFound(_) => ErrorKind::NotFound,
            ForumError::Conflict(_) => ErrorKind::Conflict,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for ForumError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ForumError::NotFound(err.to_string()),
            other => ForumError::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ForumError {
    fn from(err: serde_json::Error) -> Self {
        ForumError::Config(err.to_string())
    }
}

/// Result type alias for all engine operations.
pub type ForumResult<T> = Result<T, ForumError>;
