//! Idempotent create.
//!
//! An insert that collides on a natural key is not a failure: the unit is
//! rolled back (it is poisoned anyway) and the record that won is read back
//! in a fresh snapshot.

use crate::engine::ForumEngine;
use crate::error::{ForumError, ForumResult, StoreError, StoreResult};
use crate::model::CreateOutcome;
use crate::transaction::{Active, Snapshot, Transaction};
use tracing::{debug, warn};

/// Outcome of the insert phase.
#[derive(Debug)]
pub(crate) enum Attempt<T> {
    Inserted(T),
    Duplicate { table: &'static str },
}

impl<T> Attempt<T> {
    /// Classify a store result: a uniqueness violation becomes
    /// [`Attempt::Duplicate`], any other failure stays an error.
    pub(crate) fn classify(result: StoreResult<()>, value: T) -> ForumResult<Self> {
        match result {
            Ok(()) => Ok(Attempt::Inserted(value)),
            Err(StoreError::UniqueViolation { table }) => Ok(Attempt::Duplicate { table }),
            Err(err) => Err(err.into()),
        }
    }
}

impl ForumEngine {
    pub(crate) fn create_idempotent<T, C>(
        &self,
        op: &'static str,
        insert: impl FnOnce(&mut Transaction<'_, Active>) -> ForumResult<Attempt<T>>,
        read_back: impl FnOnce(&Snapshot<'_>) -> ForumResult<Option<C>>,
    ) -> ForumResult<CreateOutcome<T, C>> {
        let mut tx = self.store.begin();
        match insert(&mut tx) {
            Ok(Attempt::Inserted(value)) => {
                tx.commit()?;
                Ok(CreateOutcome::Created(value))
            }
            Ok(Attempt::Duplicate { table }) => {
                debug!(op, table, "natural key already taken, reading back");
                tx.rollback();
                match self.read(read_back)? {
                    Some(existing) => Ok(CreateOutcome::AlreadyExists(existing)),
                    None => Err(ForumError::Internal(format!(
                        "{op}: conflicting record on '{table}' is gone"
                    ))),
                }
            }
            Err(err) => {
                warn!(op, error = %err, "create aborted, rolling back");
                tx.rollback();
                Err(err)
            }
        }
    }
}
