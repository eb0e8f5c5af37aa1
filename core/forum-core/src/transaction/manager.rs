use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A source of monotonically increasing identifiers scoped to one store.
///
/// Thread and post ids come from here. Allocation happens before the row
/// that carries the id exists, which is what makes two-phase path
/// assignment possible. Ids handed to a unit that later aborts are not
/// reused.
#[derive(Debug)]
pub struct IdSequence {
    /// The last allocated id. Starts at 0, so the first id is 1.
    last: AtomicU64,
}

impl IdSequence {
    pub fn new(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// Allocate and return the next id.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Read the last allocated id without incrementing.
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }

    /// Make sure the sequence never hands out an id `<= floor`.
    pub fn advance_to(&self, floor: u64) {
        self.last.fetch_max(floor, Ordering::SeqCst);
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new(0)
    }
}

/// What a unit of work may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Read,
    Write,
}

/// Tracks open units of work.
#[derive(Debug, Default)]
pub struct TransactionManager {
    ids: IdSequence,
    /// Active units: unit_id -> kind
    active: DashMap<u64, UnitKind>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new unit and return its id.
    pub fn begin(&self, kind: UnitKind) -> u64 {
        let id = self.ids.next();
        self.active.insert(id, kind);
        id
    }

    /// Mark a unit as finished (committed, rolled back or dropped).
    pub fn end(&self, id: u64) {
        self.active.remove(&id);
    }

    /// Get the number of active units.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_writers(&self) -> usize {
        self.active
            .iter()
            .filter(|entry| *entry.value() == UnitKind::Write)
            .count()
    }
}
