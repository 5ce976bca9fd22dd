//! Field-level record diff engine.
//!
//! Compares the previously persisted value for one identity against the
//! freshly fetched record and reports which fields changed.
//!
//! ## Entry point
//!
//! ```
//! use layerwatch_core::diff::field_level_diff;
//! use serde_json::json;
//!
//! let diff = field_level_diff(&json!({"a": 1, "b": 2}), &json!({"a": 1, "b": 3}));
//! assert_eq!(diff.len(), 1);
//! assert!(diff.get("b").is_some());
//! ```
//!
//! ## Guarantees
//!
//! - **Total**: any pair of JSON values yields a diff; nothing here fails.
//! - **Deep equality**: nested objects and arrays compare structurally, and
//!   object key order never produces a difference.
//! - **Absent equals null**: a field missing on one side compares as `null`.
//! - **Legacy tolerance**: a non-object operand (e.g. a hash string written by
//!   an older cache format) yields the single `__all__` full-replacement entry.

pub mod engine;
pub mod model;

pub use engine::{diff_records, field_level_diff, new_record_fields};
pub use model::{FieldChange, FieldDiff, RecordShape, FULL_REPLACEMENT_FIELD};
