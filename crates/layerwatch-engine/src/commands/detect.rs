//! Detection orchestration.
//!
//! ## Pass (in order):
//! 1. Optionally gather one batch from the registered producers
//! 2. Acquire the service lock (one detection per store at a time)
//! 3. Run the change detector, which persists the new snapshot
//!
//! The lock is what makes a store safe to share: `ChangeDetector` itself
//! assumes it is the only pass touching its store.

use crate::producer::{gather_batch, LayerProducer, ProducerFailure};
use layerwatch_core::change::ChangeRecord;
use layerwatch_core::clock::{DetectionClock, SystemClock};
use layerwatch_core::detector::{ChangeDetector, DetectionReport};
use layerwatch_core::errors::{ExError, ExErrorKind};
use layerwatch_core::record::Record;
use layerwatch_core::snapshot::SnapshotStore;
use std::sync::{Mutex, MutexGuard};

/// Detection report for a gathered batch, with producers that failed.
#[derive(Debug, Clone)]
pub struct GatheredDetection {
    pub report: DetectionReport,
    pub failures: Vec<ProducerFailure>,
}

/// Serializes detection passes against one snapshot store.
pub struct DetectionService<S, C = SystemClock> {
    detector: Mutex<ChangeDetector<S, C>>,
}

impl<S: SnapshotStore> DetectionService<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_detector(ChangeDetector::new(store))
    }
}

impl<S: SnapshotStore, C: DetectionClock> DetectionService<S, C> {
    pub fn with_detector(detector: ChangeDetector<S, C>) -> Self {
        Self {
            detector: Mutex::new(detector),
        }
    }

    /// Classify `records` and replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// - `Concurrency` if a previous pass panicked while holding the lock
    /// - the store's error if the new snapshot could not be persisted
    pub fn detect(&self, records: &[Record]) -> Result<Vec<ChangeRecord>, ExError> {
        self.lock("detect")?.detect(records)
    }

    /// Like [`detect`](Self::detect), returning the full report.
    ///
    /// # Errors
    ///
    /// Same as [`detect`](Self::detect).
    pub fn run(&self, records: &[Record]) -> Result<DetectionReport, ExError> {
        self.lock("run")?.run(records)
    }

    /// Gather one batch from `producers`, then run detection on it.
    ///
    /// Failed producers contribute nothing. Their previously seen layers are
    /// therefore absent from the batch and show up in
    /// `report.dropped_keys`; callers that cannot accept that should check
    /// `failures` and use [`gather_batch`] plus [`run`](Self::run) instead.
    ///
    /// # Errors
    ///
    /// Same as [`detect`](Self::detect).
    pub fn gather_and_run(
        &self,
        producers: &[&dyn LayerProducer],
    ) -> Result<GatheredDetection, ExError> {
        let gathered = gather_batch(producers);
        let report = self.run(&gathered.records)?;
        Ok(GatheredDetection {
            report,
            failures: gathered.failures,
        })
    }

    fn lock(&self, op: &str) -> Result<MutexGuard<'_, ChangeDetector<S, C>>, ExError> {
        self.detector.lock().map_err(|_| {
            ExError::new(ExErrorKind::Concurrency)
                .with_op(op.to_string())
                .with_message("detection lock poisoned by an earlier panic")
        })
    }
}
