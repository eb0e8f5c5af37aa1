//! Units of work over a [`Store`].
//!
//! - [`Transaction`] is a write unit. It holds the store's writer lock from
//!   `begin` until commit or rollback, buffers its writes with
//!   read-your-writes visibility, and publishes them as one atomic batch.
//!   Holding the writer lock is what makes `insert_unique` an atomic
//!   uniqueness check.
//! - [`Snapshot`] is a read unit. It holds the commit gate shared, so it
//!   never observes a batch that is only partly applied.
//!
//! Never open a write unit while holding a snapshot on the same thread: the
//! commit of another writer waits for that snapshot.

pub mod manager;
pub mod snapshot;
pub mod unit;

use crate::config::TallyMode;
use crate::error::StoreResult;
use crate::storage::{Direction, KeyRange, StorageBackend};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

pub use manager::{IdSequence, TransactionManager, UnitKind};
pub use snapshot::Snapshot;
pub use unit::{Active, Committed, RolledBack, Transaction, TxState};

/// Uniform read access for both kinds of unit.
pub trait TableReader {
    fn get(&self, table: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn scan(
        &self,
        table: &str,
        range: &KeyRange,
        direction: Direction,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// How aggregates are maintained in the store this unit reads.
    fn tally(&self) -> TallyMode;
}

/// A storage backend plus the concurrency control around it.
pub struct Store {
    pub(crate) backend: Arc<dyn StorageBackend>,
    /// Serializes write units
    pub(crate) writer: Mutex<()>,
    /// Shared by snapshots, exclusive while a batch is applied
    pub(crate) commit_gate: RwLock<()>,
    pub(crate) manager: TransactionManager,
    thread_ids: IdSequence,
    post_ids: IdSequence,
    tally: TallyMode,
}

impl Store {
    pub fn new(backend: Arc<dyn StorageBackend>, tally: TallyMode) -> Self {
        Self {
            backend,
            writer: Mutex::new(()),
            commit_gate: RwLock::new(()),
            manager: TransactionManager::new(),
            thread_ids: IdSequence::default(),
            post_ids: IdSequence::default(),
            tally,
        }
    }

    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    pub fn manager(&self) -> &TransactionManager {
        &self.manager
    }

    pub fn tally(&self) -> TallyMode {
        self.tally
    }

    pub fn thread_ids(&self) -> &IdSequence {
        &self.thread_ids
    }

    pub fn post_ids(&self) -> &IdSequence {
        &self.post_ids
    }
}
