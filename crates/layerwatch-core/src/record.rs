//! Layer records and their identity.
//!
//! A [`Record`] is one layer descriptor as handed over by a producer: a JSON
//! object whose only guaranteed meaning is in the `source`, `endpoint` and
//! `name` fields. Everything else is source-specific and opaque here.

use crate::errors::{LayerWatchError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the upstream catalog name.
pub const FIELD_SOURCE: &str = "source";
/// Field holding the endpoint URL the layer was discovered at.
pub const FIELD_ENDPOINT: &str = "endpoint";
/// Field holding the layer's display name.
pub const FIELD_NAME: &str = "name";

const IDENTITY_SEPARATOR: char = '|';

/// A single layer descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value, rejecting anything that is not an object.
    ///
    /// # Errors
    ///
    /// Returns `LayerWatchError::InvalidRecord` when `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(LayerWatchError::InvalidRecord {
                reason: format!("expected a JSON object, got {}", json_type_name(&other)),
            }),
        }
    }

    /// Parse a JSON array of objects into a batch of records.
    ///
    /// # Errors
    ///
    /// - `Serialization` if the bytes are not JSON
    /// - `InvalidRecord` if the root is not an array or any element is not an object
    pub fn batch_from_json_slice(bytes: &[u8]) -> Result<Vec<Record>> {
        let root: Value = serde_json::from_slice(bytes)?;
        let items = match root {
            Value::Array(items) => items,
            other => {
                return Err(LayerWatchError::InvalidRecord {
                    reason: format!(
                        "batch must be a JSON array, got {}",
                        json_type_name(&other)
                    ),
                })
            }
        };
        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                Record::from_value(item).map_err(|e| match e {
                    LayerWatchError::InvalidRecord { reason } => LayerWatchError::InvalidRecord {
                        reason: format!("batch element {}: {}", idx, reason),
                    },
                    other => other,
                })
            })
            .collect()
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Raw field access; `None` when the field is absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Field rendered as text, or the empty string when absent or null.
    ///
    /// Strings are returned verbatim; other values use their compact JSON text.
    pub fn text_or_default(&self, name: &str) -> String {
        match self.0.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn source(&self) -> String {
        self.text_or_default(FIELD_SOURCE)
    }

    /// Stable identity key: `source|endpoint|name`.
    pub fn identity(&self) -> String {
        identity(self)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Record {
    type Error = LayerWatchError;

    fn try_from(value: Value) -> Result<Self> {
        Record::from_value(value)
    }
}

/// Derive the identity key of a record.
///
/// Total over any record: missing identity fields contribute an empty
/// segment, so `{}` maps to `"||"`. Records that agree on `source`,
/// `endpoint` and `name` share a key whatever their other fields hold.
pub fn identity(record: &Record) -> String {
    let mut key = record.text_or_default(FIELD_SOURCE);
    key.push(IDENTITY_SEPARATOR);
    key.push_str(&record.text_or_default(FIELD_ENDPOINT));
    key.push(IDENTITY_SEPARATOR);
    key.push_str(&record.text_or_default(FIELD_NAME));
    key
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_identity_joins_triple() {
        let r = record(json!({
            "source": "FEMA",
            "endpoint": "https://gis.fema.gov/arcgis/rest/services/FEMA",
            "name": "NFHL"
        }));
        assert_eq!(
            r.identity(),
            "FEMA|https://gis.fema.gov/arcgis/rest/services/FEMA|NFHL"
        );
    }

    #[test]
    fn test_identity_missing_fields_are_empty() {
        assert_eq!(identity(&Record::new()), "||");
        let r = record(json!({"name": "Alerts", "source": null}));
        assert_eq!(r.identity(), "||Alerts");
    }

    #[test]
    fn test_identity_ignores_other_fields() {
        let a = record(json!({"source": "NOAA", "endpoint": "e", "name": "n", "type": "A"}));
        let b = record(json!({"source": "NOAA", "endpoint": "e", "name": "n", "properties": {"x": 1}}));
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_renders_non_string_values() {
        let r = record(json!({"source": "USGS", "endpoint": 42, "name": true}));
        assert_eq!(r.identity(), "USGS|42|true");
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = Record::from_value(json!("deadbeef")).unwrap_err();
        assert!(matches!(err, LayerWatchError::InvalidRecord { .. }));
    }

    #[test]
    fn test_batch_from_json_slice() {
        let batch = Record::batch_from_json_slice(
            br#"[{"source": "EPA", "name": "a"}, {"source": "EPA", "name": "b"}]"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].identity(), "EPA||b");
    }

    #[test]
    fn test_batch_rejects_non_object_element() {
        let err = Record::batch_from_json_slice(br#"[{"name": "a"}, 7]"#).unwrap_err();
        match err {
            LayerWatchError::InvalidRecord { reason } => assert!(reason.contains("element 1")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_batch_rejects_non_array_root() {
        let err = Record::batch_from_json_slice(br#"{"name": "a"}"#).unwrap_err();
        assert!(matches!(err, LayerWatchError::InvalidRecord { .. }));
    }
}
