use super::{Forum, Thread, User};
use crate::path::MaterializedPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    /// 0 for a root post
    pub parent: u64,
    pub author: String,
    pub message: String,
    #[serde(rename = "isEdited")]
    pub is_edited: bool,
    pub forum: String,
    pub thread: u64,
    pub created: DateTime<Utc>,
    pub path: MaterializedPath,
}

impl Post {
    pub fn is_root(&self) -> bool {
        self.parent == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPost {
    pub parent: u64,
    pub author: String,
    pub message: String,
}

impl NewPost {
    pub fn root(author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parent: 0,
            author: author.into(),
            message: message.into(),
        }
    }

    pub fn reply(parent: u64, author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parent,
            author: author.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostUpdate {
    pub message: Option<String>,
}

/// Entities that can be attached to a post lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Related {
    User,
    Forum,
    Thread,
}

impl Related {
    pub fn parse_related(s: &str) -> Option<Self> {
        match s.trim() {
            "user" => Some(Related::User),
            "forum" => Some(Related::Forum),
            "thread" => Some(Related::Thread),
            _ => None,
        }
    }

    /// Parse a comma-separated list such as `"user,thread"`. Unknown names
    /// are ignored.
    pub fn parse_list(list: &str) -> Vec<Self> {
        let mut related = Vec::new();
        for item in list.split(',').filter_map(Related::parse_related) {
            if !related.contains(&item) {
                related.push(item);
            }
        }
        related
    }
}

/// A post with the related entities that were asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetails {
    pub post: Post,
    pub author: Option<User>,
    pub thread: Option<Thread>,
    pub forum: Option<Forum>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_list_parsing() {
        assert_eq!(
            Related::parse_list("user,thread,bogus,user"),
            vec![Related::User, Related::Thread]
        );
        assert!(Related::parse_list("").is_empty());
    }
}
