use super::{Store, TableReader, UnitKind};
use crate::config::TallyMode;
use crate::error::StoreResult;
use crate::storage::{Direction, KeyRange};
use parking_lot::RwLockReadGuard;
use tracing::trace;

/// Read unit. Every read it issues sees the same committed state, because
/// no batch can be applied while it holds the commit gate.
pub struct Snapshot<'a> {
    store: &'a Store,
    unit_id: Option<u64>,
    _gate: RwLockReadGuard<'a, ()>,
}

impl Store {
    /// Open a read unit.
    pub fn snapshot(&self) -> Snapshot<'_> {
        let gate = self.commit_gate.read();
        let unit_id = self.manager.begin(UnitKind::Read);
        trace!(
            unit = unit_id,
            writers = self.manager.active_writers(),
            "read unit opened"
        );
        Snapshot {
            store: self,
            unit_id: Some(unit_id),
            _gate: gate,
        }
    }
}

impl Snapshot<'_> {
    pub fn get(&self, table: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.store.backend.get(table, key)
    }

    pub fn scan(
        &self,
        table: &str,
        range: &KeyRange,
        direction: Direction,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.store.backend.scan(table, range, direction, limit)
    }

    pub fn count(&self, table: &str) -> StoreResult<usize> {
        self.store.backend.count(table)
    }

    /// Close the unit explicitly.
    pub fn finish(self) {}
}

impl Drop for Snapshot<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.unit_id.take() {
            self.store.manager.end(id);
        }
    }
}

impl TableReader for Snapshot<'_> {
    fn get(&self, table: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Snapshot::get(self, table, key)
    }

    fn scan(
        &self,
        table: &str,
        range: &KeyRange,
        direction: Direction,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Snapshot::scan(self, table, range, direction, limit)
    }

    fn tally(&self) -> TallyMode {
        self.store.tally()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TallyMode;
    use crate::storage::InMemoryBackend;
    use crate::transaction::Store;
    use std::sync::Arc;

    #[test]
    fn snapshot_sees_committed_rows_only() {
        let store = Store::new(Arc::new(InMemoryBackend::new()), TallyMode::Live);
        let mut tx = store.begin();
        tx.put("t", b"a".to_vec(), b"1".to_vec()).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin();
        tx.put("t", b"b".to_vec(), b"2".to_vec()).unwrap();
        {
            let snapshot = store.snapshot();
            assert_eq!(snapshot.count("t").unwrap(), 1);
            assert_eq!(snapshot.get("t", b"b").unwrap(), None);
            assert_eq!(store.manager().active_count(), 2);
            snapshot.finish();
        }
        tx.rollback();
        assert_eq!(store.manager().active_count(), 0);
    }
}
