//! Transaction boundaries for engine operations.
//!
//! A write operation runs its whole body inside one write unit: `Ok`
//! commits, `Err` rolls back. There are no retries.

use crate::engine::ForumEngine;
use crate::error::ForumResult;
use crate::transaction::{Active, Snapshot, Transaction};
use tracing::warn;

impl ForumEngine {
    pub(crate) fn write<T>(
        &self,
        op: &'static str,
        body: impl FnOnce(&mut Transaction<'_, Active>) -> ForumResult<T>,
    ) -> ForumResult<T> {
        let mut tx = self.store.begin();
        match body(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                warn!(
                    op,
                    pending = tx.pending_ops(),
                    error = %err,
                    "operation aborted, rolling back"
                );
                tx.rollback();
                Err(err)
            }
        }
    }

    pub(crate) fn read<T>(
        &self,
        body: impl FnOnce(&Snapshot<'_>) -> ForumResult<T>,
    ) -> ForumResult<T> {
        let snapshot = self.store.snapshot();
        let result = body(&snapshot);
        snapshot.finish();
        result
    }
}
