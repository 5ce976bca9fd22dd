//! Change record model.
//!
//! A `ChangeRecord` is created once during a detection pass and never
//! mutated afterwards. It is not persisted; only the snapshot is.

use crate::diff::model::FieldDiff;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::fmt;

/// Kind of detected change.
///
/// Unchanged records produce no `ChangeRecord`, so there is no variant for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    /// Identity absent from the prior snapshot
    New,
    /// Identity present with at least one differing field
    Updated,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::New => "NEW",
            ChangeType::Updated => "UPDATED",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected NEW or UPDATED layer.
///
/// `detection_time` is when the local comparison classified the record, not
/// when the layer changed upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    source: String,
    layer_id: String,
    change_type: ChangeType,
    changed_fields: FieldDiff,
    #[serde(serialize_with = "serialize_detection_time")]
    detection_time: DateTime<Utc>,
}

impl ChangeRecord {
    pub fn new(
        source: impl Into<String>,
        layer_id: impl Into<String>,
        change_type: ChangeType,
        changed_fields: FieldDiff,
        detection_time: DateTime<Utc>,
    ) -> Self {
        Self {
            source: source.into(),
            layer_id: layer_id.into(),
            change_type,
            changed_fields,
            detection_time,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identity key of the changed layer
    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    pub fn changed_fields(&self) -> &FieldDiff {
        &self.changed_fields
    }

    pub fn detection_time(&self) -> DateTime<Utc> {
        self.detection_time
    }

    /// Detection time as RFC 3339 UTC with microsecond precision.
    pub fn detection_time_iso(&self) -> String {
        format_detection_time(&self.detection_time)
    }

    /// Plain JSON projection used by export and display.
    ///
    /// `changed_fields` maps each field to a two-element `[old, new]` array.
    pub fn to_serializable(&self) -> Value {
        let changed_fields: Map<String, Value> = self
            .changed_fields
            .iter()
            .map(|(field, change)| {
                (
                    field.to_string(),
                    Value::Array(vec![change.old().clone(), change.new_value().clone()]),
                )
            })
            .collect();

        json!({
            "source": self.source,
            "layer_id": self.layer_id,
            "change_type": self.change_type.as_str(),
            "changed_fields": changed_fields,
            "detection_time": self.detection_time_iso(),
        })
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}",
            self.change_type,
            self.layer_id,
            self.detection_time_iso()
        )
    }
}

/// Serialize a change list, preserving order.
pub fn serialize_changes(changes: &[ChangeRecord]) -> Vec<Value> {
    changes.iter().map(ChangeRecord::to_serializable).collect()
}

fn format_detection_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn serialize_detection_time<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_detection_time(time))
}
