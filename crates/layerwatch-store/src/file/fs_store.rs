//! File-backed snapshot store
//!
//! One JSON document per store. Reads tolerate a missing or unreadable file
//! (the next pass simply reports everything as new); writes go through
//! [`atomic_write`] and any failure is surfaced to the caller.

use crate::config::StoreConfig;
use crate::errors::{io_error, persist_error, serialization_error, Result};
use crate::file::atomic::atomic_write;
use layerwatch_core::errors::ExError;
use layerwatch_core::snapshot::{Snapshot, SnapshotStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What was found at the cache path.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No file at the path
    Missing,
    /// A well-formed snapshot document
    Loaded(Snapshot),
    /// A file exists but could not be read or interpreted
    Corrupt { reason: String },
}

impl LoadOutcome {
    /// The snapshot a detection pass should start from.
    pub fn into_snapshot(self) -> Snapshot {
        match self {
            LoadOutcome::Loaded(snapshot) => snapshot,
            LoadOutcome::Missing | LoadOutcome::Corrupt { .. } => Snapshot::new(),
        }
    }
}

/// Snapshot store holding a single JSON document on disk
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    path: PathBuf,
    pretty: bool,
}

impl FsSnapshotStore {
    /// Store at `path`, writing indented JSON
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            path: config.path.clone(),
            pretty: config.pretty,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache file and report exactly what was found.
    pub fn load_outcome(&self) -> LoadOutcome {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(e) => {
                return LoadOutcome::Corrupt {
                    reason: io_error("load_snapshot", &self.path, e).to_string(),
                }
            }
        };

        match Snapshot::from_json_slice(&bytes) {
            Ok(snapshot) => LoadOutcome::Loaded(snapshot),
            Err(e) => LoadOutcome::Corrupt {
                reason: e.to_string(),
            },
        }
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = snapshot
            .to_json_vec(self.pretty)
            .map_err(|e| serialization_error("encode_snapshot", e))?;
        atomic_write(&self.path, &bytes)
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn load(&self) -> Snapshot {
        let outcome = self.load_outcome();
        match &outcome {
            LoadOutcome::Missing => {
                tracing::debug!(
                    cache_path = %self.path.display(),
                    "no snapshot on disk; starting from empty"
                );
            }
            LoadOutcome::Corrupt { reason } => {
                tracing::warn!(
                    cache_path = %self.path.display(),
                    reason = %reason,
                    "snapshot unreadable; treating every record as new"
                );
            }
            LoadOutcome::Loaded(snapshot) => {
                tracing::debug!(
                    cache_path = %self.path.display(),
                    snapshot_len = snapshot.len(),
                    "snapshot loaded"
                );
            }
        }
        outcome.into_snapshot()
    }

    fn save(&self, snapshot: &Snapshot) -> std::result::Result<(), ExError> {
        self.write_snapshot(snapshot)
            .map_err(|cause| persist_error(&self.path, cause))?;
        tracing::debug!(
            cache_path = %self.path.display(),
            snapshot_len = snapshot.len(),
            "snapshot saved"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_reported_as_missing() {
        let dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(dir.path().join("absent.json"));

        assert_eq!(store.load_outcome(), LoadOutcome::Missing);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::new(dir.path().join("cache.json"));

        let mut snapshot = Snapshot::new();
        snapshot.insert_value("NOAA|e|n", json!({"source": "NOAA", "name": "n"}));
        store.save(&snapshot).unwrap();

        assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn test_non_object_root_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, b"[1, 2, 3]").unwrap();

        let store = FsSnapshotStore::new(&path);
        assert!(matches!(store.load_outcome(), LoadOutcome::Corrupt { .. }));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_compact_config_writes_single_line() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::with_path(dir.path().join("cache.json")).compact();
        let store = FsSnapshotStore::from_config(&config);

        let mut snapshot = Snapshot::new();
        snapshot.insert_value("a", json!({"x": 1}));
        store.save(&snapshot).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_describe_is_path() {
        let store = FsSnapshotStore::new("/var/lib/layerwatch/cache.json");
        assert_eq!(store.describe(), "/var/lib/layerwatch/cache.json");
    }
}
