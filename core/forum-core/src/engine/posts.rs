use crate::config::TallyMode;
use crate::engine::ForumEngine;
use crate::error::{ForumError, ForumResult};
use crate::model::{NewPost, Post, PostDetails, PostUpdate, Related, ThreadRef, non_empty};
use crate::path::PathEncoder;
use crate::query::{PostQuery, execute};
use crate::repository::{ReadRepository, WriteRepository};
use crate::storage::keys::fold;
use crate::transaction::TableReader;
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, instrument};

fn post_not_found(id: u64) -> ForumError {
    ForumError::NotFound(format!("Can't find post with id: {id}"))
}

impl ForumEngine {
    /// Create a batch of posts in one thread, atomically.
    ///
    /// Posts are created in input order and share one creation timestamp.
    /// A post may reply to a post created earlier in the same batch.
    #[instrument(skip(self, posts), fields(thread = %thread, count = posts.len()))]
    pub fn create_posts(&self, thread: &ThreadRef, posts: Vec<NewPost>) -> ForumResult<Vec<Post>> {
        self.write("create_posts", |tx| {
            let target = tx
                .resolve_thread(thread)?
                .ok_or_else(|| ForumError::NotFound(thread.not_found()))?;
            if posts.is_empty() {
                return Ok(Vec::new());
            }

            let created = Utc::now();
            // folded nickname -> stored spelling
            let mut authors: HashMap<String, String> = HashMap::new();
            let mut inserted = Vec::with_capacity(posts.len());
            for new in posts {
                let folded = fold(&new.author);
                let author = match authors.get(&folded) {
                    Some(author) => author.clone(),
                    None => {
                        let user = tx.user_by_nickname(&new.author)?.ok_or_else(|| {
                            ForumError::NotFound(format!(
                                "Can't find post author by nickname: {}",
                                new.author
                            ))
                        })?;
                        authors.insert(folded, user.nickname.clone());
                        user.nickname
                    }
                };

                let parent = match new.parent {
                    0 => None,
                    id => tx.post_by_id(id)?,
                };
                let parent_path = PathEncoder::parent_path(new.parent, target.id, parent.as_ref())?;
                let id = tx.next_post_id();
                let post = Post {
                    id,
                    parent: new.parent,
                    author,
                    message: new.message,
                    is_edited: false,
                    forum: target.forum.clone(),
                    thread: target.id,
                    created,
                    path: PathEncoder::assign(parent_path, id),
                };
                tx.insert_post(&post)?;
                inserted.push(post);
            }

            if tx.tally() == TallyMode::Stored {
                let mut forum = tx.forum_by_slug(&target.forum)?.ok_or_else(|| {
                    ForumError::Internal(format!("thread {} has no forum", target.id))
                })?;
                forum.posts += inserted.len() as i64;
                tx.put_forum(&forum)?;
            }
            debug!(created = inserted.len(), "posts buffered");
            Ok(inserted)
        })
    }

    /// One page of a thread's posts.
    pub fn posts(&self, thread: &ThreadRef, query: PostQuery) -> ForumResult<Vec<Post>> {
        self.read(|snapshot| {
            let target = snapshot
                .resolve_thread(thread)?
                .ok_or_else(|| ForumError::NotFound(thread.not_found()))?;
            let plan = query.plan(target.id, self.page_limit());
            Ok(execute(snapshot, &plan)?)
        })
    }

    /// A post together with the related entities asked for.
    pub fn post(&self, id: u64, related: &[Related]) -> ForumResult<PostDetails> {
        self.read(|snapshot| {
            let post = snapshot.post_by_id(id)?.ok_or_else(|| post_not_found(id))?;
            let mut details = PostDetails {
                post,
                author: None,
                thread: None,
                forum: None,
            };
            for item in related {
                match item {
                    Related::User => {
                        details.author = snapshot.user_by_nickname(&details.post.author)?;
                    }
                    Related::Thread => {
                        details.thread = snapshot.thread_by_id(details.post.thread)?;
                    }
                    Related::Forum => {
                        details.forum = snapshot.forum_by_slug(&details.post.forum)?;
                    }
                }
            }
            Ok(details)
        })
    }

    /// Replace a post's message. Marks the post edited only when the
    /// message actually changes.
    #[instrument(skip(self, update))]
    pub fn update_post(&self, id: u64, update: PostUpdate) -> ForumResult<Post> {
        self.write("update_post", |tx| {
            let mut post = tx.post_by_id(id)?.ok_or_else(|| post_not_found(id))?;
            if let Some(message) = non_empty(&update.message)
                && message != post.message
            {
                post.message = message.to_string();
                post.is_edited = true;
                tx.put_post(&post)?;
            }
            Ok(post)
        })
    }
}
