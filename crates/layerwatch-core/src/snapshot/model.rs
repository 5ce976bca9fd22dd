//! Snapshot document model.
//!
//! Persisted as a single JSON object mapping identity key to the record as
//! last observed. There is no version field: entries are kept as raw JSON
//! values so older shapes (such as bare hash strings) load without error and
//! are reconciled later by the diff engine.

use crate::errors::{LayerWatchError, Result};
use crate::record::{json_type_name, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Identity key → last-observed record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a persisted snapshot document.
    ///
    /// # Errors
    ///
    /// - `Serialization` if the bytes are not valid JSON
    /// - `InvalidSnapshot` if the document root is not an object
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let root: Value = serde_json::from_slice(bytes)?;
        match root {
            Value::Object(entries) => Ok(Self {
                entries: entries.into_iter().collect(),
            }),
            other => Err(LayerWatchError::InvalidSnapshot {
                reason: format!(
                    "snapshot root must be a JSON object, got {}",
                    json_type_name(&other)
                ),
            }),
        }
    }

    /// Render the snapshot document.
    ///
    /// Keys are emitted in sorted order, so identical contents always render
    /// to identical bytes. `pretty` uses two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if JSON encoding fails.
    pub fn to_json_vec(&self, pretty: bool) -> Result<Vec<u8>> {
        let bytes = if pretty {
            serde_json::to_vec_pretty(&self.entries)?
        } else {
            serde_json::to_vec(&self.entries)?
        };
        Ok(bytes)
    }

    /// SHA256 of the canonical document; see [`compute_snapshot_digest`].
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if JSON encoding fails.
    ///
    /// [`compute_snapshot_digest`]: crate::snapshot::digest::compute_snapshot_digest
    pub fn digest(&self) -> Result<String> {
        crate::snapshot::digest::compute_snapshot_digest(self)
    }

    /// Store a record under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, record: Record) -> Option<Value> {
        self.entries.insert(key.into(), record.into_value())
    }

    /// Store an arbitrary value under `key` (legacy or foreign entries).
    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Record> for Snapshot {
    /// Build a snapshot keyed by identity; later records win on collision.
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for record in iter {
            let key = record.identity();
            snapshot.insert(key, record);
        }
        snapshot
    }
}
