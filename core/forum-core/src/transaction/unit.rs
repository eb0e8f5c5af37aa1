//! Typestate write unit.
//!
//! Writes accumulate in a local buffer and reach the backend only on
//! `commit()`, as one [`WriteBatch`]. `commit` and `rollback` consume the
//! active transaction, so a finished unit cannot issue statements. Dropping
//! an active transaction aborts it.

use super::{Store, TableReader, UnitKind};
use crate::config::TallyMode;
use crate::error::{StoreError, StoreResult};
use crate::storage::{Direction, KeyRange, WriteBatch};
use parking_lot::MutexGuard;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Transaction state trait
pub trait TxState {}

/// Active: statements allowed
pub struct Active;

/// Committed: all writes published
pub struct Committed;

/// RolledBack: all writes discarded
pub struct RolledBack;

impl TxState for Active {}
impl TxState for Committed {}
impl TxState for RolledBack {}

/// Buffered rows of one table: `None` is a tombstone.
type LocalTable = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

pub struct Transaction<'a, S: TxState> {
    store: &'a Store,
    /// Registered with the manager while the unit is active
    unit_id: Option<u64>,
    writer: Option<MutexGuard<'a, ()>>,
    buffer: HashMap<String, LocalTable>,
    /// Tables wiped by this unit; their backend rows are invisible
    cleared: HashSet<String>,
    ops: usize,
    /// Set by a failed write; the unit then refuses every statement
    poisoned: Option<String>,
    _state: PhantomData<S>,
}

impl Store {
    /// Open a write unit, waiting for the current writer to finish.
    pub fn begin(&self) -> Transaction<'_, Active> {
        let writer = self.writer.lock();
        let unit_id = self.manager.begin(UnitKind::Write);
        debug!(unit = unit_id, "write unit opened");
        Transaction {
            store: self,
            unit_id: Some(unit_id),
            writer: Some(writer),
            buffer: HashMap::new(),
            cleared: HashSet::new(),
            ops: 0,
            poisoned: None,
            _state: PhantomData,
        }
    }
}

impl<'a, S: TxState> Transaction<'a, S> {
    fn closed<T: TxState>(store: &'a Store) -> Transaction<'a, T> {
        Transaction {
            store,
            unit_id: None,
            writer: None,
            buffer: HashMap::new(),
            cleared: HashSet::new(),
            ops: 0,
            poisoned: None,
            _state: PhantomData,
        }
    }

    fn end_unit(&mut self) {
        if let Some(id) = self.unit_id.take() {
            self.store.manager.end(id);
        }
        // Release the writer lock.
        self.writer.take();
    }
}

impl<S: TxState> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if let Some(id) = self.unit_id {
            debug!(unit = id, pending = self.ops, "write unit dropped without commit, aborting");
        }
        self.end_unit();
    }
}

impl<'a> Transaction<'a, Active> {
    fn check_open(&self) -> StoreResult<()> {
        match &self.poisoned {
            Some(reason) => Err(StoreError::TransactionAborted {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn unit_id(&self) -> Option<u64> {
        self.unit_id
    }

    /// True after a failed write. The unit must be rolled back.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Number of buffered write operations
    pub fn pending_ops(&self) -> usize {
        self.ops
    }

    // ════════════════════════════════════════════
    // Reads (local buffer first, then backend)
    // ════════════════════════════════════════════

    pub fn get(&self, table: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.check_open()?;
        if let Some(entry) = self.buffer.get(table).and_then(|rows| rows.get(key)) {
            return Ok(entry.clone());
        }
        if self.cleared.contains(table) {
            return Ok(None);
        }
        self.store.backend.get(table, key)
    }

    pub fn scan(
        &self,
        table: &str,
        range: &KeyRange,
        direction: Direction,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.check_open()?;
        let local = self.buffer.get(table);
        let cleared = self.cleared.contains(table);
        if local.is_none() && !cleared {
            return self.store.backend.scan(table, range, direction, limit);
        }

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = if cleared {
            BTreeMap::new()
        } else {
            self.store
                .backend
                .scan(table, range, Direction::Forward, None)?
                .into_iter()
                .collect()
        };
        if let Some(local) = local
            && !range.is_empty()
        {
            for (key, value) in local.range::<[u8], _>(range.as_bounds()) {
                match value {
                    Some(value) => {
                        merged.insert(key.clone(), value.clone());
                    }
                    None => {
                        merged.remove(key);
                    }
                }
            }
        }

        let limit = limit.unwrap_or(usize::MAX);
        Ok(match direction {
            Direction::Forward => merged.into_iter().take(limit).collect(),
            Direction::Reverse => merged.into_iter().rev().take(limit).collect(),
        })
    }

    // ════════════════════════════════════════════
    // Buffered writes
    // ════════════════════════════════════════════

    /// Upsert.
    pub fn put(&mut self, table: &str, key: Vec<u8>, value: Vec<u8>) -> StoreResult<()> {
        self.check_open()?;
        self.buffer
            .entry(table.to_string())
            .or_default()
            .insert(key, Some(value));
        self.ops += 1;
        Ok(())
    }

    pub fn delete(&mut self, table: &str, key: Vec<u8>) -> StoreResult<()> {
        self.check_open()?;
        self.buffer
            .entry(table.to_string())
            .or_default()
            .insert(key, None);
        self.ops += 1;
        Ok(())
    }

    /// Insert a row whose key must not exist yet.
    ///
    /// On collision the unit is poisoned and every later statement fails
    /// with [`StoreError::TransactionAborted`].
    pub fn insert_unique(
        &mut self,
        table: &'static str,
        key: Vec<u8>,
        value: Vec<u8>,
    ) -> StoreResult<()> {
        if self.get(table, &key)?.is_some() {
            warn!(unit = ?self.unit_id, table, "unique constraint violated, unit poisoned");
            self.poisoned = Some(format!("unique constraint violated on '{table}'"));
            return Err(StoreError::UniqueViolation { table });
        }
        self.put(table, key, value)
    }

    /// Insert a row unless the key exists. Returns the existing value
    /// instead of failing, and leaves the unit usable.
    pub fn insert_if_absent(
        &mut self,
        table: &str,
        key: Vec<u8>,
        value: Vec<u8>,
    ) -> StoreResult<Option<Vec<u8>>> {
        if let Some(existing) = self.get(table, &key)? {
            return Ok(Some(existing));
        }
        self.put(table, key, value)?;
        Ok(None)
    }

    /// Remove every row of `table`, including rows buffered earlier.
    pub fn clear(&mut self, table: &str) -> StoreResult<()> {
        self.check_open()?;
        self.buffer.remove(table);
        self.cleared.insert(table.to_string());
        self.ops += 1;
        Ok(())
    }

    pub fn next_thread_id(&self) -> u64 {
        self.store.thread_ids().next()
    }

    pub fn next_post_id(&self) -> u64 {
        self.store.post_ids().next()
    }

    // ════════════════════════════════════════════
    // Commit / Rollback
    // ════════════════════════════════════════════

    fn take_batch(&mut self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for table in self.cleared.drain() {
            batch.clear(&table);
        }
        for (table, rows) in self.buffer.drain() {
            for (key, value) in rows {
                match value {
                    Some(value) => batch.put(&table, key, value),
                    None => batch.delete(&table, key),
                }
            }
        }
        batch
    }

    /// Publish every buffered write atomically.
    ///
    /// A poisoned unit cannot commit; it is aborted and the error returned.
    pub fn commit(mut self) -> StoreResult<Transaction<'a, Committed>> {
        if let Some(reason) = self.poisoned.take() {
            warn!(unit = ?self.unit_id, "commit refused on poisoned unit");
            self.end_unit();
            return Err(StoreError::TransactionAborted { reason });
        }

        let batch = self.take_batch();
        if !batch.is_empty() {
            let writes = batch.len();
            let _gate = self.store.commit_gate.write();
            self.store.backend.apply(batch)?;
            debug!(unit = ?self.unit_id, writes, "write unit committed");
        }
        self.end_unit();
        Ok(Self::closed(self.store))
    }

    /// Discard every buffered write.
    pub fn rollback(mut self) -> Transaction<'a, RolledBack> {
        debug!(unit = ?self.unit_id, pending = self.pending_ops(), "write unit rolled back");
        self.buffer.clear();
        self.cleared.clear();
        self.end_unit();
        Self::closed(self.store)
    }
}

impl TableReader for Transaction<'_, Active> {
    fn get(&self, table: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Transaction::get(self, table, key)
    }

    fn scan(
        &self,
        table: &str,
        range: &KeyRange,
        direction: Direction,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Transaction::scan(self, table, range, direction, limit)
    }

    fn tally(&self) -> TallyMode {
        self.store.tally()
    }
}

impl Transaction<'_, Committed> {
    pub fn is_committed(&self) -> bool {
        true
    }
}

impl Transaction<'_, RolledBack> {
    pub fn is_rolled_back(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TallyMode;
    use crate::error::StoreError;
    use crate::storage::{Direction, InMemoryBackend, KeyRange};
    use crate::transaction::Store;
    use std::sync::Arc;

    fn store() -> Store {
        Store::new(Arc::new(InMemoryBackend::new()), TallyMode::Stored)
    }

    #[test]
    fn test_begin_commit() {
        let store = store();
        let mut tx = store.begin();
        tx.put("users", b"u1".to_vec(), b"Alice".to_vec()).unwrap();

        // Not visible outside before commit
        assert_eq!(store.backend().get("users", b"u1").unwrap(), None);
        // Read-your-writes inside
        assert_eq!(tx.get("users", b"u1").unwrap(), Some(b"Alice".to_vec()));

        let committed = tx.commit().unwrap();
        assert!(committed.is_committed());
        assert_eq!(
            store.backend().get("users", b"u1").unwrap(),
            Some(b"Alice".to_vec())
        );
        assert_eq!(store.manager().active_count(), 0);
    }

    #[test]
    fn test_rollback_discards() {
        let store = store();
        let mut tx = store.begin();
        tx.put("t", b"k".to_vec(), b"v".to_vec()).unwrap();
        let rolled_back = tx.rollback();
        assert!(rolled_back.is_rolled_back());
        assert_eq!(store.backend().get("t", b"k").unwrap(), None);
    }

    #[test]
    fn test_drop_aborts_and_releases_writer() {
        let store = store();
        {
            let mut tx = store.begin();
            tx.put("t", b"k".to_vec(), b"v".to_vec()).unwrap();
        }
        assert_eq!(store.manager().active_count(), 0);
        // A second writer can open, so the lock was released.
        let tx = store.begin();
        assert_eq!(tx.get("t", b"k").unwrap(), None);
    }

    #[test]
    fn test_unique_violation_poisons_unit() {
        let store = store();
        let mut tx = store.begin();
        tx.insert_unique("users", b"alice".to_vec(), b"1".to_vec())
            .unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        tx.put("other", b"x".to_vec(), b"y".to_vec()).unwrap();
        let err = tx
            .insert_unique("users", b"alice".to_vec(), b"2".to_vec())
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert!(tx.is_poisoned());
        assert!(matches!(
            tx.get("users", b"alice"),
            Err(StoreError::TransactionAborted { .. })
        ));
        assert!(matches!(
            tx.commit(),
            Err(StoreError::TransactionAborted { .. })
        ));
        // Nothing of the poisoned unit was published.
        assert_eq!(store.backend().get("other", b"x").unwrap(), None);
        assert_eq!(
            store.backend().get("users", b"alice").unwrap(),
            Some(b"1".to_vec())
        );
    }

    #[test]
    fn test_insert_if_absent_keeps_unit_usable() {
        let store = store();
        let mut tx = store.begin();
        assert_eq!(
            tx.insert_if_absent("votes", b"k".to_vec(), b"1".to_vec())
                .unwrap(),
            None
        );
        assert_eq!(
            tx.insert_if_absent("votes", b"k".to_vec(), b"2".to_vec())
                .unwrap(),
            Some(b"1".to_vec())
        );
        assert!(!tx.is_poisoned());
        tx.commit().unwrap();
        assert_eq!(
            store.backend().get("votes", b"k").unwrap(),
            Some(b"1".to_vec())
        );
    }

    #[test]
    fn test_scan_merges_buffer_and_backend() {
        let store = store();
        let mut tx = store.begin();
        for k in [b"a", b"b", b"c"] {
            tx.put("t", k.to_vec(), b"old".to_vec()).unwrap();
        }
        tx.commit().unwrap();

        let mut tx = store.begin();
        tx.delete("t", b"b".to_vec()).unwrap();
        tx.put("t", b"d".to_vec(), b"new".to_vec()).unwrap();
        let keys: Vec<Vec<u8>> = tx
            .scan("t", &KeyRange::all(), Direction::Reverse, Some(2))
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"d".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_clear_hides_backend_rows() {
        let store = store();
        let mut tx = store.begin();
        tx.put("t", b"a".to_vec(), b"1".to_vec()).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        tx.clear("t").unwrap();
        assert_eq!(tx.get("t", b"a").unwrap(), None);
        tx.put("t", b"b".to_vec(), b"2".to_vec()).unwrap();
        assert_eq!(
            tx.scan("t", &KeyRange::all(), Direction::Forward, None)
                .unwrap()
                .len(),
            1
        );
        tx.commit().unwrap();
        assert_eq!(store.backend().count("t").unwrap(), 1);
    }
}
