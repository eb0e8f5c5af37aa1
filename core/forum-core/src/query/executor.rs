use super::planner::{PostScanPlan, ScanSpec};
use crate::error::StoreResult;
use crate::model::Post;
use crate::path::MaterializedPath;
use crate::repository::tables::{IDX_POST_TREE, IDX_THREAD_POSTS, IDX_THREAD_ROOTS};
use crate::repository::{ReadRepository, post_tree_key, thread_post_key, thread_root_key};
use crate::storage::keys::{decode_u64, u64_key};
use crate::storage::{Direction, KeyRange};
use tracing::debug;

const THREAD_PREFIX_LEN: usize = 8;

/// Run a plan against a read unit.
pub fn execute<R: ReadRepository + ?Sized>(
    reader: &R,
    plan: &PostScanPlan,
) -> StoreResult<Vec<Post>> {
    debug!(sort = %plan.sort(), spec = ?plan.spec(), "executing post scan");
    match plan {
        PostScanPlan::Flat(spec) => flat(reader, spec),
        PostScanPlan::Tree(spec) => tree(reader, spec),
        PostScanPlan::ParentTree(spec) => parent_tree(reader, spec),
    }
}

/// Narrow `range` to the keys strictly after (ascending) or strictly before
/// (descending) `cursor`.
fn past_cursor(range: KeyRange, cursor: Vec<u8>, direction: Direction) -> KeyRange {
    match direction {
        Direction::Forward => range.after(cursor),
        Direction::Reverse => range.before(cursor),
    }
}

/// Trailing id component of a `thread ++ id` key.
fn id_suffix(key: &[u8]) -> StoreResult<u64> {
    decode_u64(key.get(THREAD_PREFIX_LEN..).unwrap_or_default())
}

/// The cursor post, if it exists in the scanned thread.
fn cursor_post<R: ReadRepository + ?Sized>(
    reader: &R,
    spec: &ScanSpec,
    cursor: u64,
) -> StoreResult<Option<Post>> {
    Ok(reader
        .post_by_id(cursor)?
        .filter(|post| post.thread == spec.thread))
}

fn flat<R: ReadRepository + ?Sized>(reader: &R, spec: &ScanSpec) -> StoreResult<Vec<Post>> {
    let mut range = KeyRange::prefix(&u64_key(spec.thread));
    if let Some(cursor) = spec.cursor {
        range = past_cursor(range, thread_post_key(spec.thread, cursor), spec.direction);
    }
    reader
        .scan(IDX_THREAD_POSTS, &range, spec.direction, Some(spec.limit))?
        .into_iter()
        .map(|(key, _)| reader.indexed_post(id_suffix(&key)?))
        .collect()
}

fn tree<R: ReadRepository + ?Sized>(reader: &R, spec: &ScanSpec) -> StoreResult<Vec<Post>> {
    let mut range = KeyRange::prefix(&u64_key(spec.thread));
    if let Some(cursor) = spec.cursor {
        let Some(post) = cursor_post(reader, spec, cursor)? else {
            return Ok(Vec::new());
        };
        range = past_cursor(range, post_tree_key(spec.thread, &post.path), spec.direction);
    }
    reader
        .scan(IDX_POST_TREE, &range, spec.direction, Some(spec.limit))?
        .into_iter()
        .map(|(_, id)| reader.indexed_post(decode_u64(&id)?))
        .collect()
}

fn parent_tree<R: ReadRepository + ?Sized>(reader: &R, spec: &ScanSpec) -> StoreResult<Vec<Post>> {
    let mut range = KeyRange::prefix(&u64_key(spec.thread));
    if let Some(cursor) = spec.cursor {
        let Some(root) = cursor_post(reader, spec, cursor)?.and_then(|post| post.path.root_id())
        else {
            return Ok(Vec::new());
        };
        range = past_cursor(range, thread_root_key(spec.thread, root), spec.direction);
    }

    let roots = reader.scan(IDX_THREAD_ROOTS, &range, spec.direction, Some(spec.limit))?;
    let mut posts = Vec::new();
    for (key, _) in roots {
        let root = id_suffix(&key)?;
        let subtree_root = post_tree_key(spec.thread, &MaterializedPath::root(root));
        let subtree = KeyRange::prefix(&subtree_root);
        for (_, id) in reader.scan(IDX_POST_TREE, &subtree, Direction::Forward, None)? {
            posts.push(reader.indexed_post(decode_u64(&id)?)?);
        }
    }
    Ok(posts)
}
