use super::non_empty;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub forum: String,
    pub message: String,
    pub votes: i64,
    pub slug: Option<String>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewThread {
    pub title: String,
    pub author: String,
    pub message: String,
    pub slug: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl NewThread {
    /// The slug if one was given; an empty slug counts as none.
    pub fn slug(&self) -> Option<&str> {
        non_empty(&self.slug)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadUpdate {
    pub title: Option<String>,
    pub message: Option<String>,
}

impl ThreadUpdate {
    pub fn apply(&self, thread: &Thread) -> Thread {
        let mut updated = thread.clone();
        if let Some(title) = non_empty(&self.title) {
            updated.title = title.to_string();
        }
        if let Some(message) = non_empty(&self.message) {
            updated.message = message.to_string();
        }
        updated
    }
}

/// A thread addressed by id or by slug.
///
/// Parsing tries the numeric interpretation first, so a purely numeric
/// string is always an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThreadRef {
    Id(u64),
    Slug(String),
}

impl ThreadRef {
    pub fn parse(slug_or_id: &str) -> Self {
        match slug_or_id.parse::<u64>() {
            Ok(id) => ThreadRef::Id(id),
            Err(_) => ThreadRef::Slug(slug_or_id.to_string()),
        }
    }

    pub(crate) fn not_found(&self) -> String {
        match self {
            ThreadRef::Id(id) => format!("Can't find thread by id: {id}"),
            ThreadRef::Slug(slug) => format!("Can't find thread by slug: {slug}"),
        }
    }
}

impl FromStr for ThreadRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ThreadRef::parse(s))
    }
}

impl From<u64> for ThreadRef {
    fn from(id: u64) -> Self {
        ThreadRef::Id(id)
    }
}

impl From<&str> for ThreadRef {
    fn from(s: &str) -> Self {
        ThreadRef::parse(s)
    }
}

impl fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadRef::Id(id) => write!(f, "{id}"),
            ThreadRef::Slug(slug) => f.write_str(slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_input_is_an_id() {
        assert_eq!(ThreadRef::parse("42"), ThreadRef::Id(42));
        assert_eq!(
            ThreadRef::parse("rust-rocks"),
            ThreadRef::Slug("rust-rocks".to_string())
        );
        assert_eq!(ThreadRef::parse("-3"), ThreadRef::Slug("-3".to_string()));
    }

    #[test]
    fn empty_slug_is_no_slug() {
        let thread = NewThread {
            slug: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(thread.slug(), None);
    }

    #[test]
    fn update_with_empty_strings_keeps_fields() {
        let thread = Thread {
            id: 1,
            title: "title".into(),
            author: "alice".into(),
            forum: "rust".into(),
            message: "body".into(),
            votes: 0,
            slug: None,
            created: Utc::now(),
        };
        let unchanged = ThreadUpdate {
            title: Some(String::new()),
            message: Some(String::new()),
        }
        .apply(&thread);
        assert_eq!(unchanged, thread);

        let changed = ThreadUpdate {
            title: Some("new title".into()),
            message: Some("new body".into()),
        }
        .apply(&thread);
        assert_eq!(changed.title, "new title");
        assert_eq!(changed.message, "new body");
    }
}
