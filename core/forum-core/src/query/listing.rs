//! Per-forum listings: threads by creation time and participants by
//! nickname.

use super::{raw_desc, raw_limit};
use crate::error::{ForumError, ForumResult, StoreError, StoreResult};
use crate::model::{Thread, User};
use crate::repository::ReadRepository;
use crate::repository::tables::{IDX_FORUM_THREADS, IDX_FORUM_USERS, USERS};
use crate::storage::keys::{decode_u64, join, text_key, text_prefix, timestamp_key};
use crate::storage::{Direction, KeyRange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadListQuery {
    pub limit: Option<usize>,
    /// Inclusive bound on `created`: `>=` ascending, `<=` descending
    pub since: Option<DateTime<Utc>>,
    pub desc: bool,
}

impl ThreadListQuery {
    /// `since` must be an RFC 3339 timestamp.
    pub fn from_raw(
        limit: Option<&str>,
        since: Option<&str>,
        desc: Option<&str>,
    ) -> ForumResult<Self> {
        let since = match since {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|err| ForumError::Internal(format!("invalid since '{raw}': {err}")))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };
        Ok(Self {
            limit: raw_limit(limit),
            since,
            desc: raw_desc(desc),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserListQuery {
    pub limit: Option<usize>,
    /// Exclusive nickname bound, compared case-insensitively
    pub since: Option<String>,
    pub desc: bool,
}

impl UserListQuery {
    pub fn from_raw(limit: Option<&str>, since: Option<&str>, desc: Option<&str>) -> Self {
        Self {
            limit: raw_limit(limit),
            since: since.filter(|s| !s.is_empty()).map(str::to_string),
            desc: raw_desc(desc),
        }
    }
}

/// Threads of `forum` ordered by (created, id).
pub fn forum_threads<R: ReadRepository + ?Sized>(
    reader: &R,
    forum: &str,
    query: &ThreadListQuery,
    default_limit: usize,
) -> StoreResult<Vec<Thread>> {
    let prefix = text_prefix(forum);
    let direction = Direction::from_desc(query.desc);
    let mut range = KeyRange::prefix(&prefix);
    if let Some(since) = &query.since {
        let ts = timestamp_key(since);
        range = match direction {
            Direction::Forward => range.from_key(join(&[&prefix, &ts])),
            Direction::Reverse => range.through(join(&[&prefix, &ts, &u64::MAX.to_be_bytes()])),
        };
    }

    let limit = query.limit.filter(|&n| n > 0).unwrap_or(default_limit);
    let mut threads = Vec::new();
    for (_, id) in reader.scan(IDX_FORUM_THREADS, &range, direction, Some(limit))? {
        let id = decode_u64(&id)?;
        let thread = reader
            .thread_by_id(id)?
            .ok_or_else(|| StoreError::Other(format!("index references missing thread {id}")))?;
        threads.push(thread);
    }
    Ok(threads)
}

/// Participants of `forum` ordered by folded nickname.
pub fn forum_users<R: ReadRepository + ?Sized>(
    reader: &R,
    forum: &str,
    query: &UserListQuery,
    default_limit: usize,
) -> StoreResult<Vec<User>> {
    let prefix = text_prefix(forum);
    let direction = Direction::from_desc(query.desc);
    let mut range = KeyRange::prefix(&prefix);
    if let Some(since) = &query.since {
        let bound = join(&[&prefix, &text_key(since)]);
        range = match direction {
            Direction::Forward => range.after(bound),
            Direction::Reverse => range.before(bound),
        };
    }

    let limit = query.limit.filter(|&n| n > 0).unwrap_or(default_limit);
    let mut users = Vec::new();
    for (key, _) in reader.scan(IDX_FORUM_USERS, &range, direction, Some(limit))? {
        let nickname = key.get(prefix.len()..).unwrap_or_default();
        let user = reader.load::<User>(USERS, nickname)?.ok_or_else(|| {
            StoreError::Other(format!(
                "index references missing user {}",
                String::from_utf8_lossy(nickname)
            ))
        })?;
        users.push(user);
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_query_parses_rfc3339() {
        let since = "2024-01-02T03:04:05.000+03:00";
        let query = ThreadListQuery::from_raw(Some("10"), Some(since), Some("true")).unwrap();
        assert_eq!(query.limit, Some(10));
        assert!(query.desc);
        assert_eq!(
            query.since.unwrap().to_rfc3339(),
            "2024-01-02T00:04:05+00:00"
        );
    }

    #[test]
    fn malformed_timestamp_is_internal() {
        let err = ThreadListQuery::from_raw(None, Some("yesterday"), None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
    }

    #[test]
    fn user_query_defaults() {
        let query = UserListQuery::from_raw(Some("x"), Some(""), Some("no"));
        assert_eq!(query, UserListQuery::default());
    }
}
