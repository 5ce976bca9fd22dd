//! Field-level diff computation.
//!
//! The core entry point is [`field_level_diff`], which accepts the prior and
//! current value for one identity and produces a [`FieldDiff`].

use crate::diff::model::{FieldChange, FieldDiff, RecordShape};
use crate::record::Record;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Compute which fields differ between `old` and `new`.
///
/// When both sides are objects, every field in the union of their keys is
/// compared with deep equality, a missing side counting as `null`. When
/// either side is anything else the pair is reported as a full replacement.
pub fn field_level_diff(old: &Value, new: &Value) -> FieldDiff {
    match (RecordShape::of(old), RecordShape::of(new)) {
        (RecordShape::Fields(old_fields), RecordShape::Fields(new_fields)) => {
            diff_field_maps(old_fields, new_fields)
        }
        _ => FieldDiff::full_replacement(old.clone(), new.clone()),
    }
}

/// Diff a persisted snapshot entry against a current record.
pub fn diff_records(old: &Value, new: &Record) -> FieldDiff {
    match RecordShape::of(old) {
        RecordShape::Fields(old_fields) => diff_field_maps(old_fields, new.fields()),
        RecordShape::Opaque(_) => {
            FieldDiff::full_replacement(old.clone(), Value::Object(new.fields().clone()))
        }
    }
}

/// Diff for a record with no prior entry: every present field from `null`.
pub fn new_record_fields(record: &Record) -> FieldDiff {
    record
        .fields()
        .iter()
        .map(|(name, value)| (name.clone(), FieldChange::new(Value::Null, value.clone())))
        .collect()
}

fn diff_field_maps(old: &Map<String, Value>, new: &Map<String, Value>) -> FieldDiff {
    let all_fields: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    all_fields
        .into_iter()
        .filter_map(|field| {
            let old_value = old.get(field).unwrap_or(&Value::Null);
            let new_value = new.get(field).unwrap_or(&Value::Null);
            (old_value != new_value).then(|| {
                (
                    field.clone(),
                    FieldChange::new(old_value.clone(), new_value.clone()),
                )
            })
        })
        .collect()
}
