use serde::{Deserialize, Serialize};

/// Row counts per entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub user: usize,
    pub forum: usize,
    pub thread: usize,
    pub post: usize,
}
