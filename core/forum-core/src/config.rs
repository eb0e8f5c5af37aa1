//! Engine configuration.
//!
//! A [`ForumConfig`] can be built in code, read from a JSON file, or taken
//! from `FORUM_*` environment variables.

use crate::error::{ForumError, ForumResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Page size used when a listing request carries no usable limit.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Selects the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local tables, lost on drop
    #[default]
    InMemory,
    /// sled database directory
    Sled { path: PathBuf },
}

/// How derived aggregates (thread votes, forum post/thread counters) are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TallyMode {
    /// Denormalized counters updated in the same unit of work as the rows
    #[default]
    Stored,
    /// Counters recomputed from the vote/thread/post rows on every read
    Live,
}

impl TallyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TallyMode::Stored => "stored",
            TallyMode::Live => "live",
        }
    }

    pub fn parse_mode(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stored" => Some(TallyMode::Stored),
            "live" => Some(TallyMode::Live),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    pub storage: StorageConfig,
    pub tally: TallyMode,
    pub default_page_limit: usize,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::InMemory,
            tally: TallyMode::Stored,
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ForumConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_tally(mut self, tally: TallyMode) -> Self {
        self.tally = tally;
        self
    }

    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.default_page_limit = limit;
        self
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> ForumResult<Self> {
        let raw = fs::read_to_string(path)?;
        let config: ForumConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a config from environment variables.
    ///
    /// - `FORUM_STORAGE_PATH`: switches to the sled backend at that path
    /// - `FORUM_TALLY_MODE`: `stored` or `live`
    /// - `FORUM_PAGE_LIMIT`: positive integer
    pub fn from_env() -> ForumResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = env::var("FORUM_STORAGE_PATH")
            && !path.is_empty()
        {
            config.storage = StorageConfig::Sled {
                path: PathBuf::from(path),
            };
        }

        if let Ok(mode) = env::var("FORUM_TALLY_MODE") {
            config.tally = TallyMode::parse_mode(&mode)
                .ok_or_else(|| ForumError::Config(format!("unknown tally mode '{mode}'")))?;
        }

        if let Ok(limit) = env::var("FORUM_PAGE_LIMIT") {
            config.default_page_limit = limit
                .trim()
                .parse()
                .map_err(|_| ForumError::Config(format!("invalid page limit '{limit}'")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ForumResult<()> {
        if self.default_page_limit == 0 {
            return Err(ForumError::Config(
                "default_page_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ForumConfig::default();
        assert_eq!(config.storage, StorageConfig::InMemory);
        assert_eq!(config.tally, TallyMode::Stored);
        assert_eq!(config.default_page_limit, 100);
    }

    #[test]
    fn json_with_missing_fields_uses_defaults() {
        let config: ForumConfig = serde_json::from_str(r#"{"tally": "live"}"#).unwrap();
        assert_eq!(config.tally, TallyMode::Live);
        assert_eq!(config.default_page_limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn json_sled_storage() {
        let config: ForumConfig =
            serde_json::from_str(r#"{"storage": {"kind": "sled", "path": "/tmp/forum"}}"#)
                .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sled {
                path: PathBuf::from("/tmp/forum")
            }
        );
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forum.json");
        let config = ForumConfig::new()
            .with_tally(TallyMode::Live)
            .with_page_limit(25);
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = ForumConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn zero_page_limit_rejected() {
        let config = ForumConfig::new().with_page_limit(0);
        assert!(matches!(config.validate(), Err(ForumError::Config(_))));
    }

    #[test]
    fn tally_mode_parse() {
        assert_eq!(TallyMode::parse_mode("LIVE"), Some(TallyMode::Live));
        assert_eq!(TallyMode::parse_mode(" stored "), Some(TallyMode::Stored));
        assert_eq!(TallyMode::parse_mode("cached"), None);
    }
}
