use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forum {
    pub slug: String,
    pub title: String,
    /// Owner nickname, in the stored spelling
    pub user: String,
    pub posts: i64,
    pub threads: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewForum {
    pub slug: String,
    pub title: String,
    pub user: String,
}
