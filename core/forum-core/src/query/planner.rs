//! Post pagination planning.
//!
//! A [`PostQuery`] is the caller's request; [`PostQuery::plan`] turns it
//! into a [`PostScanPlan`] bound to one resolved thread, which the executor
//! runs against a read unit.

use super::{raw_desc, raw_limit};
use crate::storage::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Traversal order of a post listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// By post id
    #[default]
    Flat,
    /// By materialized path
    Tree,
    /// A page of root posts, each followed by its whole subtree
    ParentTree,
}

impl SortMode {
    /// Parse a sort name. Unknown names fall back to [`SortMode::Flat`].
    pub fn parse_mode(s: &str) -> Self {
        match s {
            "tree" => SortMode::Tree,
            "parent_tree" => SortMode::ParentTree,
            _ => SortMode::Flat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Flat => "flat",
            SortMode::Tree => "tree",
            SortMode::ParentTree => "parent_tree",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pagination request for the posts of one thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostQuery {
    pub sort: SortMode,
    /// Page size; `None` means the configured default. In parent_tree mode
    /// it bounds the number of root posts.
    pub limit: Option<usize>,
    /// Id of the last post seen; 0 starts from the beginning
    pub since: u64,
    pub desc: bool,
}

impl PostQuery {
    pub fn new(sort: SortMode) -> Self {
        Self {
            sort,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_since(mut self, since: u64) -> Self {
        self.since = since;
        self
    }

    pub fn with_desc(mut self, desc: bool) -> Self {
        self.desc = desc;
        self
    }

    /// Build a query from raw string parameters. Invalid values fall back
    /// to their defaults instead of failing.
    pub fn from_raw(
        sort: Option<&str>,
        limit: Option<&str>,
        since: Option<&str>,
        desc: Option<&str>,
    ) -> Self {
        Self {
            sort: sort.map(SortMode::parse_mode).unwrap_or_default(),
            limit: raw_limit(limit),
            since: since.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0),
            desc: raw_desc(desc),
        }
    }

    /// Bind the query to a thread.
    pub fn plan(&self, thread: u64, default_limit: usize) -> PostScanPlan {
        let scan = ScanSpec {
            thread,
            cursor: (self.since != 0).then_some(self.since),
            direction: Direction::from_desc(self.desc),
            limit: self.limit.filter(|&n| n > 0).unwrap_or(default_limit),
        };
        match self.sort {
            SortMode::Flat => PostScanPlan::Flat(scan),
            SortMode::Tree => PostScanPlan::Tree(scan),
            SortMode::ParentTree => PostScanPlan::ParentTree(scan),
        }
    }
}

/// Parameters shared by every plan variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSpec {
    pub thread: u64,
    /// Post id of the cursor
    pub cursor: Option<u64>,
    pub direction: Direction,
    pub limit: usize,
}

/// Physical plan for a post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScanPlan {
    /// Range scan of `idx_thread_posts`
    Flat(ScanSpec),
    /// Range scan of `idx_post_tree`, positioned at the cursor post's path
    Tree(ScanSpec),
    /// Range scan of `idx_thread_roots`, then one prefix scan of
    /// `idx_post_tree` per selected root
    ParentTree(ScanSpec),
}

impl PostScanPlan {
    pub fn spec(&self) -> &ScanSpec {
        match self {
            PostScanPlan::Flat(spec) | PostScanPlan::Tree(spec) | PostScanPlan::ParentTree(spec) => {
                spec
            }
        }
    }

    pub fn sort(&self) -> SortMode {
        match self {
            PostScanPlan::Flat(_) => SortMode::Flat,
            PostScanPlan::Tree(_) => SortMode::Tree,
            PostScanPlan::ParentTree(_) => SortMode::ParentTree,
        }
    }
}
