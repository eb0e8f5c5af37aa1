//! Storage module: ordered key-value tables behind one trait.
//!
//! All backends implement [`StorageBackend`]. The transaction layer depends
//! only on this trait.
//!
//! # Contract
//!
//! - `get`: Returns `None` for non-existent keys, never errors on absence.
//! - `scan`: Returns key-value pairs in key order (or reverse key order)
//!   within the range, at most `limit` of them.
//! - `apply`: Applies a whole [`WriteBatch`] atomically. Readers observe
//!   either none or all of it.
//! - `count`: Returns the number of keys in a table.
//! - `flush`: Persists buffered data to durable storage.

pub mod codec;
pub mod keys;
pub mod memory;
pub mod sled_store;

use crate::error::StoreResult;
use std::ops::Bound;

pub use memory::InMemoryBackend;
pub use sled_store::SledBackend;

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn from_desc(desc: bool) -> Self {
        if desc {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }
}

/// Key range over one table's keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start: Bound<Vec<u8>>,
    pub end: Bound<Vec<u8>>,
}

impl KeyRange {
    pub fn all() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Every key starting with `prefix`.
    pub fn prefix(prefix: &[u8]) -> Self {
        Self {
            start: Bound::Included(prefix.to_vec()),
            end: match prefix_successor(prefix) {
                Some(successor) => Bound::Excluded(successor),
                None => Bound::Unbounded,
            },
        }
    }

    /// Replace the lower bound with an exclusive `key`. The key must lie
    /// inside the current range.
    pub fn after(mut self, key: Vec<u8>) -> Self {
        self.start = Bound::Excluded(key);
        self
    }

    /// Replace the upper bound with an exclusive `key`.
    pub fn before(mut self, key: Vec<u8>) -> Self {
        self.end = Bound::Excluded(key);
        self
    }

    /// Replace the lower bound with an inclusive `key`.
    pub fn from_key(mut self, key: Vec<u8>) -> Self {
        self.start = Bound::Included(key);
        self
    }

    /// Replace the upper bound with an inclusive `key`.
    pub fn through(mut self, key: Vec<u8>) -> Self {
        self.end = Bound::Included(key);
        self
    }

    /// True when no key can fall inside the range. Ordered maps panic on
    /// inverted ranges, so backends check this before scanning.
    pub fn is_empty(&self) -> bool {
        match (&self.start, &self.end) {
            (Bound::Included(start), Bound::Included(end)) => start > end,
            (Bound::Included(start), Bound::Excluded(end))
            | (Bound::Excluded(start), Bound::Included(end))
            | (Bound::Excluded(start), Bound::Excluded(end)) => start >= end,
            _ => false,
        }
    }

    pub fn as_bounds(&self) -> (Bound<&[u8]>, Bound<&[u8]>) {
        (
            self.start.as_ref().map(|k| k.as_slice()),
            self.end.as_ref().map(|k| k.as_slice()),
        )
    }
}

/// Smallest key greater than every key starting with `prefix`.
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut successor = prefix.to_vec();
    while let Some(last) = successor.pop() {
        if last < u8::MAX {
            successor.push(last + 1);
            return Some(successor);
        }
    }
    None
}

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put {
        table: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        table: String,
        key: Vec<u8>,
    },
    /// Remove every key of the table
    Clear { table: String },
}

/// Ordered list of writes applied as one atomic unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, table: &str, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put {
            table: table.to_string(),
            key,
            value,
        });
    }

    pub fn delete(&mut self, table: &str, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete {
            table: table.to_string(),
            key,
        });
    }

    pub fn clear(&mut self, table: &str) {
        self.ops.push(BatchOp::Clear {
            table: table.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Core storage interface: every backend implements this trait.
pub trait StorageBackend: Send + Sync {
    /// Get a value by key.
    fn get(&self, table: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Scan a range of keys in the given direction.
    fn scan(
        &self,
        table: &str,
        range: &KeyRange,
        direction: Direction,
        limit: Option<usize>,
    ) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// First key-value pair of a range in the given direction.
    fn scan_one(
        &self,
        table: &str,
        range: &KeyRange,
        direction: Direction,
    ) -> StoreResult<Option<(Vec<u8>, Vec<u8>)>> {
        Ok(self.scan(table, range, direction, Some(1))?.into_iter().next())
    }

    /// Apply all writes of the batch atomically.
    fn apply(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Return the number of keys in the given table.
    fn count(&self, table: &str) -> StoreResult<usize>;

    /// Flush any buffered data to durable storage.
    fn flush(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(range: &KeyRange, key: &[u8]) -> bool {
        let above_start = match &range.start {
            Bound::Included(start) => key >= start.as_slice(),
            Bound::Excluded(start) => key > start.as_slice(),
            Bound::Unbounded => true,
        };
        let below_end = match &range.end {
            Bound::Included(end) => key <= end.as_slice(),
            Bound::Excluded(end) => key < end.as_slice(),
            Bound::Unbounded => true,
        };
        above_start && below_end
    }

    #[test]
    fn prefix_successor_carries() {
        assert_eq!(prefix_successor(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_successor(&[1, 0xFF]), Some(vec![2]));
        assert_eq!(prefix_successor(&[0xFF, 0xFF]), None);
    }

    #[test]
    fn prefix_range_contains() {
        let range = KeyRange::prefix(&[0, 5]);
        assert!(contains(&range, &[0, 5]));
        assert!(contains(&range, &[0, 5, 0xFF, 0xFF]));
        assert!(!contains(&range, &[0, 6]));
        assert!(!contains(&range, &[0, 4, 0xFF]));
    }

    #[test]
    fn empty_range_detection() {
        let range = KeyRange::prefix(&[1]).after(vec![1, 9]).before(vec![1, 9]);
        assert!(range.is_empty());
        let range = KeyRange::prefix(&[1]).from_key(vec![1, 3]).through(vec![1, 3]);
        assert!(!range.is_empty());
        assert!(!KeyRange::all().is_empty());
    }
}
