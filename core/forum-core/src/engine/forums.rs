use crate::engine::ForumEngine;
use crate::engine::idempotent::Attempt;
use crate::error::{ForumError, ForumResult};
use crate::model::{CreateOutcome, Forum, NewForum, Thread, User};
use crate::query::listing::{self, ThreadListQuery, UserListQuery};
use crate::repository::{ReadRepository, WriteRepository};
use crate::transaction::Snapshot;
use tracing::instrument;

fn forum_not_found(slug: &str) -> ForumError {
    ForumError::NotFound(format!("Can't find forum by slug: {slug}"))
}

impl ForumEngine {
    /// Create a forum owned by an existing user.
    #[instrument(skip(self, new), fields(slug = %new.slug))]
    pub fn create_forum(&self, new: NewForum) -> ForumResult<CreateOutcome<Forum>> {
        let slug = new.slug.clone();
        self.create_idempotent(
            "create_forum",
            |tx| {
                let owner = tx.user_by_nickname(&new.user)?.ok_or_else(|| {
                    ForumError::NotFound(format!("Can't find user with nickname: {}", new.user))
                })?;
                let forum = Forum {
                    slug: new.slug,
                    title: new.title,
                    user: owner.nickname,
                    posts: 0,
                    threads: 0,
                };
                let result = tx.insert_forum(&forum);
                Attempt::classify(result, forum)
            },
            |snapshot| Ok(snapshot.forum_by_slug(&slug)?),
        )
    }

    pub fn forum(&self, slug: &str) -> ForumResult<Forum> {
        self.read(|snapshot| {
            snapshot.forum_by_slug(slug)?.ok_or_else(|| {
                ForumError::NotFound(format!("Can't find forum with slug: {slug}"))
            })
        })
    }

    /// Threads of a forum ordered by creation time.
    pub fn forum_threads(&self, slug: &str, query: ThreadListQuery) -> ForumResult<Vec<Thread>> {
        self.read(|snapshot| {
            let forum = existing_forum(snapshot, slug)?;
            Ok(listing::forum_threads(
                snapshot,
                &forum.slug,
                &query,
                self.page_limit(),
            )?)
        })
    }

    /// Users who started a thread or wrote a post in the forum.
    pub fn forum_users(&self, slug: &str, query: UserListQuery) -> ForumResult<Vec<User>> {
        self.read(|snapshot| {
            let forum = existing_forum(snapshot, slug)?;
            Ok(listing::forum_users(
                snapshot,
                &forum.slug,
                &query,
                self.page_limit(),
            )?)
        })
    }
}

fn existing_forum(snapshot: &Snapshot<'_>, slug: &str) -> ForumResult<Forum> {
    snapshot
        .forum_by_slug(slug)?
        .ok_or_else(|| forum_not_found(slug))
}
