use super::tables::{
    FORUMS, IDX_FORUM_POSTS, IDX_FORUM_THREADS, IDX_THREAD_SLUG, IDX_USER_EMAIL, POSTS, THREADS,
    USERS, VOTES,
};
use super::{email_key, forum_key, post_key, thread_key, thread_slug_key, user_key, vote_key};
use crate::config::TallyMode;
use crate::error::{StoreError, StoreResult};
use crate::model::{Forum, Post, Thread, ThreadRef, User, Vote};
use crate::storage::codec::decode;
use crate::storage::keys::{decode_u64, fold, text_prefix, u64_key};
use crate::storage::{Direction, KeyRange};
use crate::transaction::TableReader;
use serde::de::DeserializeOwned;

/// Entity lookups. Implemented for every [`TableReader`].
///
/// In [`TallyMode::Live`] the aggregates (`Forum::threads`, `Forum::posts`,
/// `Thread::votes`) are recomputed from their index tables on every read,
/// and the stored fields are ignored.
pub trait ReadRepository: TableReader {
    fn load<T: DeserializeOwned>(&self, table: &str, key: &[u8]) -> StoreResult<Option<T>> {
        match self.get(table, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Number of rows whose key starts with `prefix`.
    fn count_prefix(&self, table: &str, prefix: &[u8]) -> StoreResult<usize> {
        Ok(self
            .scan(table, &KeyRange::prefix(prefix), Direction::Forward, None)?
            .len())
    }

    fn user_by_nickname(&self, nickname: &str) -> StoreResult<Option<User>> {
        self.load(USERS, &user_key(nickname))
    }

    fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        match self.get(IDX_USER_EMAIL, &email_key(email))? {
            Some(owner) => self.load(USERS, &owner),
            None => Ok(None),
        }
    }

    /// Users colliding with a new user's natural keys: at most two,
    /// deduplicated, ordered by folded nickname.
    fn users_by_nickname_or_email(&self, nickname: &str, email: &str) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = Vec::with_capacity(2);
        for user in [self.user_by_nickname(nickname)?, self.user_by_email(email)?]
            .into_iter()
            .flatten()
        {
            if !users.iter().any(|u| fold(&u.nickname) == fold(&user.nickname)) {
                users.push(user);
            }
        }
        users.sort_by_key(|u| fold(&u.nickname));
        Ok(users)
    }

    fn forum_by_slug(&self, slug: &str) -> StoreResult<Option<Forum>> {
        let Some(mut forum) = self.load::<Forum>(FORUMS, &forum_key(slug))? else {
            return Ok(None);
        };
        if self.tally() == TallyMode::Live {
            let prefix = text_prefix(&forum.slug);
            forum.threads = self.count_prefix(IDX_FORUM_THREADS, &prefix)? as i64;
            forum.posts = self.count_prefix(IDX_FORUM_POSTS, &prefix)? as i64;
        }
        Ok(Some(forum))
    }

    fn thread_by_id(&self, id: u64) -> StoreResult<Option<Thread>> {
        let Some(mut thread) = self.load::<Thread>(THREADS, &thread_key(id))? else {
            return Ok(None);
        };
        if self.tally() == TallyMode::Live {
            thread.votes = self.vote_total(id)?;
        }
        Ok(Some(thread))
    }

    fn thread_by_slug(&self, slug: &str) -> StoreResult<Option<Thread>> {
        match self.get(IDX_THREAD_SLUG, &thread_slug_key(slug))? {
            Some(id) => self.thread_by_id(decode_u64(&id)?),
            None => Ok(None),
        }
    }

    fn resolve_thread(&self, thread: &ThreadRef) -> StoreResult<Option<Thread>> {
        match thread {
            ThreadRef::Id(id) => self.thread_by_id(*id),
            ThreadRef::Slug(slug) => self.thread_by_slug(slug),
        }
    }

    fn post_by_id(&self, id: u64) -> StoreResult<Option<Post>> {
        self.load(POSTS, &post_key(id))
    }

    /// Load a post an index entry points at.
    fn indexed_post(&self, id: u64) -> StoreResult<Post> {
        self.post_by_id(id)?
            .ok_or_else(|| StoreError::Other(format!("index references missing post {id}")))
    }

    fn vote(&self, thread: u64, nickname: &str) -> StoreResult<Option<Vote>> {
        self.load(VOTES, &vote_key(thread, nickname))
    }

    /// Sum of every vote cast on the thread.
    fn vote_total(&self, thread: u64) -> StoreResult<i64> {
        let rows = self.scan(
            VOTES,
            &KeyRange::prefix(&u64_key(thread)),
            Direction::Forward,
            None,
        )?;
        let mut total = 0i64;
        for (_, bytes) in rows {
            total += i64::from(decode::<Vote>(&bytes)?.voice);
        }
        Ok(total)
    }
}

impl<R: TableReader + ?Sized> ReadRepository for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserProfile;
    use crate::repository::WriteRepository;
    use crate::storage::InMemoryBackend;
    use crate::transaction::Store;
    use std::sync::Arc;

    fn user(nickname: &str, email: &str) -> User {
        UserProfile {
            fullname: nickname.to_uppercase(),
            about: String::new(),
            email: email.to_string(),
        }
        .into_user(nickname)
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let store = Store::new(Arc::new(InMemoryBackend::new()), TallyMode::Stored);
        let mut tx = store.begin();
        tx.insert_user(&user("Alice", "Alice@Example.org")).unwrap();
        tx.commit().unwrap();

        let snapshot = store.snapshot();
        let found = snapshot.user_by_nickname("ALICE").unwrap().unwrap();
        assert_eq!(found.nickname, "Alice");
        let by_email = snapshot.user_by_email("alice@example.ORG").unwrap().unwrap();
        assert_eq!(by_email.nickname, "Alice");
        assert!(snapshot.user_by_nickname("bob").unwrap().is_none());
    }

    #[test]
    fn collisions_are_deduplicated_and_sorted() {
        let store = Store::new(Arc::new(InMemoryBackend::new()), TallyMode::Stored);
        let mut tx = store.begin();
        tx.insert_user(&user("zed", "z@x.org")).unwrap();
        tx.insert_user(&user("amy", "a@x.org")).unwrap();
        tx.commit().unwrap();

        let snapshot = store.snapshot();
        let both = snapshot.users_by_nickname_or_email("ZED", "a@x.org").unwrap();
        let names: Vec<&str> = both.iter().map(|u| u.nickname.as_str()).collect();
        assert_eq!(names, vec!["amy", "zed"]);

        let one = snapshot.users_by_nickname_or_email("amy", "A@X.ORG").unwrap();
        assert_eq!(one.len(), 1);
    }
}
