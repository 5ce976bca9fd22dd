//! Change detection over one batch of records.
//!
//! ## Pass (in order):
//! 1. Load the prior snapshot (missing/corrupt state loads as empty)
//! 2. For each record in input order: derive its identity, classify it
//!    against the prior snapshot, and place it in the next snapshot
//! 3. Persist the next snapshot, even when nothing changed
//! 4. Return the change records in processing order
//!
//! Classification is total: records are never rejected, and a prior entry
//! that is not an object is reported as a full replacement. The only way a
//! pass fails is a snapshot write failure, in which case no change list is
//! returned.
//!
//! Keys present in the prior snapshot but absent from the batch are dropped
//! from the new baseline. They are listed in the report for the operator but
//! produce no change record: absence may mean deleted upstream or simply not
//! fetched this run.

use crate::change::model::{ChangeRecord, ChangeType};
use crate::clock::{DetectionClock, SystemClock};
use crate::diff::engine::{diff_records, new_record_fields};
use crate::errors::ExError;
use crate::record::Record;
use crate::snapshot::digest::compute_snapshot_digest;
use crate::snapshot::model::Snapshot;
use crate::snapshot::store::SnapshotStore;
use crate::{log_op_end, log_op_error, log_op_start};
use layerwatch_core_types::RunId;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

/// Per-run classification counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectionStats {
    pub batch_len: usize,
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Records whose identity already appeared earlier in the same batch
    pub duplicate_keys: usize,
}

/// Full outcome of one detection pass.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub run_id: RunId,
    pub changes: Vec<ChangeRecord>,
    pub stats: DetectionStats,
    /// Prior keys missing from this batch, in sorted order
    pub dropped_keys: Vec<String>,
    /// Digest of the snapshot that was persisted
    pub snapshot_digest: Option<String>,
    /// Entries in the persisted snapshot
    pub snapshot_len: usize,
}

impl DetectionReport {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Compares batches against the stored snapshot.
///
/// Not internally synchronized: callers must not run two passes against the
/// same store at once (see `DetectionService` in `layerwatch-engine`).
pub struct ChangeDetector<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: SnapshotStore> ChangeDetector<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: SnapshotStore, C: DetectionClock> ChangeDetector<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Classify `records` and replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the new snapshot could not be persisted.
    pub fn detect(&self, records: &[Record]) -> Result<Vec<ChangeRecord>, ExError> {
        self.run(records).map(|report| report.changes)
    }

    /// Like [`detect`](Self::detect), returning the full report.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the new snapshot could not be persisted.
    pub fn run(&self, records: &[Record]) -> Result<DetectionReport, ExError> {
        let run_id = RunId::new();
        let started = Instant::now();
        let store_name = self.store.describe();
        log_op_start!(
            "detect",
            run_id = %run_id,
            batch_len = records.len(),
            store = %store_name
        );

        let prior = self.store.load();
        let mut next = Snapshot::new();
        let mut changes = Vec::new();
        let mut stats = DetectionStats {
            batch_len: records.len(),
            ..DetectionStats::default()
        };
        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());

        for record in records {
            let key = record.identity();
            if !seen.insert(key.clone()) {
                stats.duplicate_keys += 1;
                tracing::debug!(run_id = %run_id, layer_id = %key, "duplicate identity in batch; last record wins");
            }

            if let Some(change) = self.classify(&key, record, prior.get(&key)) {
                match change.change_type() {
                    ChangeType::New => stats.new += 1,
                    ChangeType::Updated => stats.updated += 1,
                }
                tracing::debug!(
                    run_id = %run_id,
                    layer_id = %key,
                    change_type = %change.change_type(),
                    changed_fields = change.changed_fields().len(),
                    "layer changed"
                );
                changes.push(change);
            } else {
                stats.unchanged += 1;
            }

            next.insert(key, record.clone());
        }

        let dropped_keys: Vec<String> = prior
            .keys()
            .filter(|key| !next.contains_key(key))
            .map(str::to_string)
            .collect();
        if !dropped_keys.is_empty() {
            tracing::info!(
                run_id = %run_id,
                dropped = dropped_keys.len(),
                "prior layers absent from batch were dropped from the baseline"
            );
        }

        if let Err(err) = self.store.save(&next) {
            let err = err.with_run_id(run_id.clone());
            log_op_error!(
                "detect",
                err.clone(),
                duration_ms = started.elapsed().as_millis() as u64,
                run_id = %run_id
            );
            return Err(err);
        }

        let snapshot_digest = match compute_snapshot_digest(&next) {
            Ok(digest) => Some(digest),
            Err(e) => {
                tracing::warn!(run_id = %run_id, error = %e, "could not digest persisted snapshot");
                None
            }
        };

        log_op_end!(
            "detect",
            duration_ms = started.elapsed().as_millis() as u64,
            run_id = %run_id,
            changes_len = changes.len(),
            new = stats.new,
            updated = stats.updated,
            unchanged = stats.unchanged,
            snapshot_len = next.len()
        );

        Ok(DetectionReport {
            run_id,
            changes,
            stats,
            dropped_keys,
            snapshot_digest,
            snapshot_len: next.len(),
        })
    }

    fn classify(
        &self,
        key: &str,
        record: &Record,
        prior: Option<&serde_json::Value>,
    ) -> Option<ChangeRecord> {
        let (change_type, changed_fields) = match prior {
            None => (ChangeType::New, new_record_fields(record)),
            Some(previous) => {
                let diff = diff_records(previous, record);
                if diff.is_empty() {
                    return None;
                }
                if diff.is_full_replacement() {
                    tracing::warn!(
                        layer_id = %key,
                        "prior snapshot entry is not an object; reporting full replacement"
                    );
                }
                (ChangeType::Updated, diff)
            }
        };

        Some(ChangeRecord::new(
            record.source(),
            key,
            change_type,
            changed_fields,
            self.clock.now(),
        ))
    }
}
