//! Store configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cache file name used when none is configured.
pub const DEFAULT_CACHE_FILE: &str = "dsca_layer_cache.json";

/// Where and how the snapshot document is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot document path
    pub path: PathBuf,
    /// Indent the document (two spaces) for human inspection
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CACHE_FILE),
            pretty: default_pretty(),
        }
    }
}

impl StoreConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
