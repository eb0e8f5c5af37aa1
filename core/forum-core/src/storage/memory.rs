//! In-memory backend using BTreeMap
//!
//! One lock guards every table, so a batch is applied atomically.

use crate::error::StoreResult;
use crate::storage::{BatchOp, Direction, KeyRange, StorageBackend, WriteBatch};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

type Table = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-memory backend using BTreeMap
pub struct InMemoryBackend {
    tables: RwLock<HashMap<String, Table>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, table: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let tables = self.tables.read();
        Ok(tables.get(table).and_then(|map| map.get(key).cloned()))
    }

    fn scan(
        &self,
        table: &str,
        range: &KeyRange,
        direction: Direction,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let tables = self.tables.read();
        let Some(map) = tables.get(table) else {
            return Ok(Vec::new());
        };
        let limit = limit.unwrap_or(usize::MAX);
        let iter = map
            .range::<[u8], _>(range.as_bounds())
            .map(|(k, v)| (k.clone(), v.clone()));
        let rows = match direction {
            Direction::Forward => iter.take(limit).collect(),
            Direction::Reverse => iter.rev().take(limit).collect(),
        };
        Ok(rows)
    }

    fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut tables = self.tables.write();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { table, key, value } => {
                    tables.entry(table).or_default().insert(key, value);
                }
                BatchOp::Delete { table, key } => {
                    if let Some(map) = tables.get_mut(&table) {
                        map.remove(&key);
                    }
                }
                BatchOp::Clear { table } => {
                    tables.remove(&table);
                }
            }
        }
        Ok(())
    }

    fn count(&self, table: &str) -> StoreResult<usize> {
        let tables = self.tables.read();
        Ok(tables.get(table).map(|m| m.len()).unwrap_or(0))
    }

    fn flush(&self) -> StoreResult<()> {
        // No-op for in-memory backend
        Ok(())
    }
}
