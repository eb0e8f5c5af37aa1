//! sled-backed durable storage.
//!
//! All tables share one sled `Tree`; a table is the key prefix
//! `table_name ++ 0x00`. Keeping everything in one tree lets a whole
//! [`WriteBatch`] go through a single `apply_batch`, which sled applies
//! atomically.

use crate::error::StoreResult;
use crate::storage::{BatchOp, Direction, KeyRange, StorageBackend, WriteBatch, prefix_successor};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;

const TREE_NAME: &str = "forum";

pub struct SledBackend {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledBackend {
    /// Open the backend at the given directory path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Open a temporary backend (for testing). Data is deleted on drop.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StoreResult<Self> {
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self { db, tree })
    }
}

fn table_prefix(table: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(table.len() + 1);
    prefix.extend_from_slice(table.as_bytes());
    prefix.push(0);
    prefix
}

fn prefixed(prefix: &[u8], key: &[u8]) -> Vec<u8> {
    let mut full = Vec::with_capacity(prefix.len() + key.len());
    full.extend_from_slice(prefix);
    full.extend_from_slice(key);
    full
}

impl StorageBackend for SledBackend {
    fn get(&self, table: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let full = prefixed(&table_prefix(table), key);
        Ok(self.tree.get(full)?.map(|ivec| ivec.to_vec()))
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
        let prefix = table_prefix(table);

        let start = match &range.start {
            Bound::Included(k) => Bound::Included(prefixed(&prefix, k)),
            Bound::Excluded(k) => Bound::Excluded(prefixed(&prefix, k)),
            Bound::Unbounded => Bound::Included(prefix.clone()),
        };
        let end = match &range.end {
            Bound::Included(k) => Bound::Included(prefixed(&prefix, k)),
            Bound::Excluded(k) => Bound::Excluded(prefixed(&prefix, k)),
            Bound::Unbounded => match prefix_successor(&prefix) {
                Some(successor) => Bound::Excluded(successor),
                None => Bound::Unbounded,
            },
        };

        let iter = self.tree.range::<Vec<u8>, _>((start, end));
        let limit = limit.unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        let mut push = |item: sled::Result<(sled::IVec, sled::IVec)>| -> StoreResult<()> {
            let (k, v) = item?;
            rows.push((k[prefix.len()..].to_vec(), v.to_vec()));
            Ok(())
        };
        match direction {
            Direction::Forward => {
                for item in iter.take(limit) {
                    push(item)?;
                }
            }
            Direction::Reverse => {
                for item in iter.rev().take(limit) {
                    push(item)?;
                }
            }
        }
        Ok(rows)
    }

    fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        // Resolve op order first: a Clear must also drop puts queued before it.
        let mut pending: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { table, key, value } => {
                    pending.insert(prefixed(&table_prefix(&table), &key), Some(value));
                }
                BatchOp::Delete { table, key } => {
                    pending.insert(prefixed(&table_prefix(&table), &key), None);
                }
                BatchOp::Clear { table } => {
                    let prefix = table_prefix(&table);
                    pending.retain(|k, _| !k.starts_with(&prefix));
                    for item in self.tree.scan_prefix(&prefix) {
                        let (k, _) = item?;
                        pending.insert(k.to_vec(), None);
                    }
                }
            }
        }

        let mut sled_batch = sled::Batch::default();
        for (key, value) in pending {
            match value {
                Some(value) => sled_batch.insert(key, value),
                None => sled_batch.remove(key),
            }
        }
        self.tree.apply_batch(sled_batch)?;
        Ok(())
    }

    fn count(&self, table: &str) -> StoreResult<usize> {
        let mut count = 0;
        for item in self.tree.scan_prefix(table_prefix(table)) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}
