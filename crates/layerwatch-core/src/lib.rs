//! LayerWatch Core - change detection for upstream layer catalogs
//!
//! This crate provides the in-memory kernel of the change-detection cache:
//! - Layer records and their stable `source|endpoint|name` identity
//! - Field-level diffing tolerant of legacy snapshot entries
//! - The snapshot model and the `SnapshotStore` storage seam
//! - Change records and the detector that produces them
//! - The error and structured-logging facilities shared by the workspace

pub mod change;
pub mod clock;
pub mod detector;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod record;
pub mod snapshot;

pub use layerwatch_core_types as types;

// Re-export commonly used types
pub use change::{serialize_changes, ChangeRecord, ChangeType};
pub use clock::{DetectionClock, FixedClock, SystemClock};
pub use detector::{ChangeDetector, DetectionReport, DetectionStats};
pub use diff::{field_level_diff, FieldChange, FieldDiff};
pub use errors::{ExError, ExErrorKind, LayerWatchError, Result};
pub use record::{identity, Record};
pub use snapshot::{InMemorySnapshotStore, Snapshot, SnapshotStore};
