//! Table names and key layouts.
//!
//! | table               | key                                   | value    |
//! |---------------------|---------------------------------------|----------|
//! | `users`             | folded nickname                       | `User`   |
//! | `idx_user_email`    | folded email                          | folded nickname |
//! | `forums`            | folded slug                           | `Forum`  |
//! | `threads`           | id                                    | `Thread` |
//! | `idx_thread_slug`   | folded slug                           | id       |
//! | `idx_forum_threads` | folded forum, 0, created, id          | id       |
//! | `idx_forum_users`   | folded forum, 0, folded nickname      | empty    |
//! | `posts`             | id                                    | `Post`   |
//! | `idx_thread_posts`  | thread, id                            | empty    |
//! | `idx_post_tree`     | thread, path                          | id       |
//! | `idx_thread_roots`  | thread, root id                       | empty    |
//! | `idx_forum_posts`   | folded forum, 0, id                   | empty    |
//! | `votes`             | thread, folded nickname               | `Vote`   |
//! | `meta`              | mark name                             | id       |
//!
//! `meta` holds the id high-water marks recorded by a reset. It is not part
//! of [`ALL`] and survives the reset that writes it.

pub const USERS: &str = "users";
pub const IDX_USER_EMAIL: &str = "idx_user_email";
pub const FORUMS: &str = "forums";
pub const THREADS: &str = "threads";
pub const IDX_THREAD_SLUG: &str = "idx_thread_slug";
pub const IDX_FORUM_THREADS: &str = "idx_forum_threads";
pub const IDX_FORUM_USERS: &str = "idx_forum_users";
pub const POSTS: &str = "posts";
pub const IDX_THREAD_POSTS: &str = "idx_thread_posts";
pub const IDX_POST_TREE: &str = "idx_post_tree";
pub const IDX_THREAD_ROOTS: &str = "idx_thread_roots";
pub const IDX_FORUM_POSTS: &str = "idx_forum_posts";
pub const VOTES: &str = "votes";
pub const META: &str = "meta";

/// `meta` keys
pub const THREAD_ID_MARK: &[u8] = b"thread_ids";
pub const POST_ID_MARK: &[u8] = b"post_ids";

pub const ALL: [&str; 13] = [
    USERS,
    IDX_USER_EMAIL,
    FORUMS,
    THREADS,
    IDX_THREAD_SLUG,
    IDX_FORUM_THREADS,
    IDX_FORUM_USERS,
    POSTS,
    IDX_THREAD_POSTS,
    IDX_POST_TREE,
    IDX_THREAD_ROOTS,
    IDX_FORUM_POSTS,
    VOTES,
];
