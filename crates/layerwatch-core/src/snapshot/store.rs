//! Snapshot storage seam.
//!
//! The detector never touches files directly; it loads and saves through a
//! [`SnapshotStore`], so tests use [`InMemorySnapshotStore`] and production
//! wires in the file store from `layerwatch-store`.

use crate::errors::ExError;
use crate::snapshot::model::Snapshot;
use std::sync::{Arc, Mutex};

/// Durable home of the previous generation's snapshot.
pub trait SnapshotStore {
    /// Load the prior snapshot.
    ///
    /// Missing or unreadable state is not an error: implementations return
    /// an empty snapshot so every current record is reported as new.
    fn load(&self) -> Snapshot;

    /// Replace the stored snapshot with `snapshot`.
    ///
    /// # Errors
    ///
    /// Must return an error if the snapshot was not durably written.
    fn save(&self, snapshot: &Snapshot) -> Result<(), ExError>;

    /// Short description for logs (e.g. the cache path).
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self) -> Snapshot {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), ExError> {
        (**self).save(snapshot)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    fn load(&self) -> Snapshot {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), ExError> {
        (**self).save(snapshot)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&self) -> Snapshot {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), ExError> {
        (**self).save(snapshot)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Process-local snapshot store
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    state: Mutex<Snapshot>,
    saves: Mutex<usize>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            saves: Mutex::new(0),
        }
    }

    /// Current stored snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Snapshot {
        self.snapshot()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), ExError> {
        let mut state = self.state.lock().map_err(|_| {
            ExError::new(crate::errors::ExErrorKind::Concurrency)
                .with_op("save_snapshot")
                .with_message("in-memory snapshot lock poisoned")
        })?;
        *state = snapshot.clone();
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
