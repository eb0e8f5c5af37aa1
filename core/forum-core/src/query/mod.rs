//! Query planning and execution.
//!
//! Post listings go through a planner ([`PostQuery::plan`]) that yields a
//! [`PostScanPlan`], and an executor that turns the plan into index range
//! scans. No listing ever walks the reply tree recursively.

pub mod executor;
pub mod listing;
pub mod planner;

pub use executor::execute;
pub use listing::{ThreadListQuery, UserListQuery, forum_threads, forum_users};
pub use planner::{PostQuery, PostScanPlan, ScanSpec, SortMode};

/// Page size from a raw parameter; invalid or non-positive values are
/// treated as absent.
pub(crate) fn raw_limit(limit: Option<&str>) -> Option<usize> {
    limit
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|&n| n > 0)
        .map(|n| n as usize)
}

pub(crate) fn raw_desc(desc: Option<&str>) -> bool {
    desc.and_then(|s| s.parse::<bool>().ok()).unwrap_or(false)
}
