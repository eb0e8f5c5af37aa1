//! Materialized paths for post trees.
//!
//! Every post carries the chain of post ids from its thread root down to
//! itself. Ordering posts by that chain (lexicographic, shorter prefix first)
//! puts each parent directly before its whole subtree, so tree-ordered reads
//! are plain range scans over an index keyed by the encoded path.
//!
//! # Encoding
//!
//! Each element is written as an 8-byte big-endian `u64`. Fixed-width
//! big-endian elements make bytewise comparison of the encodings agree with
//! `Vec<u64>` comparison, including the prefix rule.

use crate::error::{ForumError, ForumResult, StoreError, StoreResult};
use crate::model::Post;
use serde::{Deserialize, Serialize};

const ELEMENT_LEN: usize = 8;

/// Ordered chain of post ids from a thread root to a post (inclusive).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterializedPath(Vec<u64>);

impl MaterializedPath {
    /// Path of a root post: `[id]`.
    pub fn root(id: u64) -> Self {
        Self(vec![id])
    }

    /// This path with `id` appended.
    pub fn child(&self, id: u64) -> Self {
        let mut ids = Vec::with_capacity(self.0.len() + 1);
        ids.extend_from_slice(&self.0);
        ids.push(id);
        Self(ids)
    }

    pub fn from_ids(ids: Vec<u64>) -> Self {
        Self(ids)
    }

    /// Id of the thread root this path descends from.
    pub fn root_id(&self) -> Option<u64> {
        self.0.first().copied()
    }

    /// Id of the post this path belongs to.
    pub fn leaf_id(&self) -> Option<u64> {
        self.0.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// True if `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &MaterializedPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Order-preserving byte encoding.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() * ELEMENT_LEN);
        for id in &self.0 {
            bytes.extend_from_slice(&id.to_be_bytes());
        }
        bytes
    }

    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        if bytes.len() % ELEMENT_LEN != 0 {
            return Err(StoreError::Other(format!(
                "invalid path encoding length {}",
                bytes.len()
            )));
        }
        let ids = bytes
            .chunks_exact(ELEMENT_LEN)
            .map(|chunk| {
                let mut buf = [0u8; ELEMENT_LEN];
                buf.copy_from_slice(chunk);
                u64::from_be_bytes(buf)
            })
            .collect();
        Ok(Self(ids))
    }
}

/// Assigns paths to new posts.
///
/// Creation is two-phase: the caller first allocates the post id from the
/// store sequence, then asks the encoder for the path. The parent must
/// already be readable in the caller's unit of work.
pub struct PathEncoder;

impl PathEncoder {
    /// Validate the parent of a post destined for `thread` and return the
    /// path the new post extends. `None` means the post is a root.
    ///
    /// `parent_post` is the looked-up row for `parent` (ignored when
    /// `parent == 0`).
    pub fn parent_path(
        parent: u64,
        thread: u64,
        parent_post: Option<&Post>,
    ) -> ForumResult<Option<&MaterializedPath>> {
        if parent == 0 {
            return Ok(None);
        }
        match parent_post {
            None => Err(ForumError::NotFound(format!(
                "Can't find parent post by id: {parent}"
            ))),
            Some(post) if post.thread != thread => Err(ForumError::Conflict(
                "Parent post was created in another thread".to_string(),
            )),
            Some(post) => Ok(Some(&post.path)),
        }
    }

    /// Phase two: derive the path from an allocated id.
    pub fn assign(parent: Option<&MaterializedPath>, id: u64) -> MaterializedPath {
        match parent {
            Some(path) => path.child(id),
            None => MaterializedPath::root(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(ids: &[u64]) -> MaterializedPath {
        MaterializedPath::from_ids(ids.to_vec())
    }

    #[test]
    fn root_and_child() {
        let root = MaterializedPath::root(7);
        assert_eq!(root.as_slice(), &[7]);
        let child = root.child(9);
        assert_eq!(child.as_slice(), &[7, 9]);
        assert_eq!(child.root_id(), Some(7));
        assert_eq!(child.leaf_id(), Some(9));
        assert_eq!(child.depth(), 2);
    }

    #[test]
    fn prefix_sorts_before_subtree_and_subtree_before_sibling() {
        let a = path(&[1]);
        let a_child = path(&[1, 2]);
        let a_grandchild = path(&[1, 2, 4]);
        let b = path(&[3]);

        let mut paths = vec![b.clone(), a_grandchild.clone(), a.clone(), a_child.clone()];
        paths.sort();
        assert_eq!(paths, vec![a, a_child, a_grandchild, b]);
    }

    #[test]
    fn encoding_preserves_order_across_byte_boundaries() {
        let small = path(&[255]);
        let large = path(&[256]);
        assert!(small < large);
        assert!(small.encode() < large.encode());

        let parent = path(&[256]);
        let child = path(&[256, 1]);
        assert!(parent.encode() < child.encode());
    }

    #[test]
    fn decode_inverts_encode() {
        let p = path(&[1, u64::MAX, 42]);
        assert_eq!(MaterializedPath::decode(&p.encode()).unwrap(), p);
        assert!(MaterializedPath::decode(&[0u8; 7]).is_err());
    }

    #[test]
    fn ancestry() {
        assert!(path(&[1]).is_ancestor_of(&path(&[1, 2])));
        assert!(!path(&[1, 2]).is_ancestor_of(&path(&[1, 2])));
        assert!(!path(&[1, 3]).is_ancestor_of(&path(&[1, 2, 3])));
    }

    #[test]
    fn assign_extends_parent() {
        let parent = path(&[1, 2]);
        assert_eq!(PathEncoder::assign(Some(&parent), 5), path(&[1, 2, 5]));
        assert_eq!(PathEncoder::assign(None, 5), path(&[5]));
    }
}
