//! Engine constructors: factory methods for opening a ForumEngine

use crate::config::{ForumConfig, StorageConfig};
use crate::engine::ForumEngine;
use crate::error::{ForumResult, StoreResult};
use crate::repository::tables::{META, POST_ID_MARK, POSTS, THREAD_ID_MARK, THREADS};
use crate::storage::keys::decode_u64;
use crate::storage::{Direction, InMemoryBackend, KeyRange, SledBackend, StorageBackend};
use crate::transaction::Store;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

impl ForumEngine {
    /// Open an engine as described by `config`.
    #[instrument(skip(config), fields(tally = config.tally.as_str()))]
    pub fn open(config: ForumConfig) -> ForumResult<Self> {
        config.validate()?;
        let backend: Arc<dyn StorageBackend> = match &config.storage {
            StorageConfig::InMemory => Arc::new(InMemoryBackend::new()),
            StorageConfig::Sled { path } => {
                info!("Opening sled store at {:?}", path);
                std::fs::create_dir_all(path)?;
                Arc::new(SledBackend::open(path)?)
            }
        };
        Self::with_backend(backend, config)
    }

    /// Open a volatile engine with default settings.
    pub fn open_in_memory() -> ForumResult<Self> {
        Self::open(ForumConfig::default())
    }

    /// Open a durable engine with default settings.
    pub fn open_path(path: impl AsRef<Path>) -> ForumResult<Self> {
        Self::open(ForumConfig::new().with_storage(StorageConfig::Sled {
            path: path.as_ref().to_path_buf(),
        }))
    }

    /// Build an engine over an existing backend. Id sequences resume after
    /// the highest persisted thread and post ids, or after the marks an
    /// earlier reset recorded when those are higher.
    pub fn with_backend(
        backend: Arc<dyn StorageBackend>,
        config: ForumConfig,
    ) -> ForumResult<Self> {
        let store = Store::new(backend, config.tally);
        let last_thread =
            last_id(store.backend(), THREADS)?.max(id_mark(store.backend(), THREAD_ID_MARK)?);
        let last_post =
            last_id(store.backend(), POSTS)?.max(id_mark(store.backend(), POST_ID_MARK)?);
        store.thread_ids().advance_to(last_thread);
        store.post_ids().advance_to(last_post);
        info!(last_thread, last_post, "forum engine ready");
        Ok(Self { store, config })
    }
}

/// Highest id key of an id-keyed table, 0 when empty.
fn last_id(backend: &dyn StorageBackend, table: &str) -> StoreResult<u64> {
    match backend.scan_one(table, &KeyRange::all(), Direction::Reverse)? {
        Some((key, _)) => decode_u64(&key),
        None => Ok(0),
    }
}

/// Id high-water mark left by a reset, 0 when none was recorded.
fn id_mark(backend: &dyn StorageBackend, mark: &[u8]) -> StoreResult<u64> {
    match backend.get(META, mark)? {
        Some(bytes) => decode_u64(&bytes),
        None => Ok(0),
    }
}
