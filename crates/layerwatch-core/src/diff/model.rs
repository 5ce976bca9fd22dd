//! Diff output types.
//!
//! Collections use `BTreeMap` so serialized diffs are deterministic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Sentinel field name used when a diff cannot be broken down by field.
pub const FULL_REPLACEMENT_FIELD: &str = "__all__";

/// Old/new values for one changed field.
///
/// Serializes as a two-element `[old, new]` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange(pub Value, pub Value);

impl FieldChange {
    pub fn new(old: Value, new: Value) -> Self {
        Self(old, new)
    }

    /// Value in the prior snapshot (`null` when absent)
    pub fn old(&self) -> &Value {
        &self.0
    }

    /// Value in the current record (`null` when absent)
    pub fn new_value(&self) -> &Value {
        &self.1
    }
}

/// Changed fields keyed by field name.
///
/// An empty diff means the two sides are indistinguishable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDiff(BTreeMap<String, FieldChange>);

impl FieldDiff {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Diff consisting only of the full-replacement sentinel.
    pub fn full_replacement(old: Value, new: Value) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            FULL_REPLACEMENT_FIELD.to_string(),
            FieldChange::new(old, new),
        );
        Self(fields)
    }

    pub fn insert(&mut self, field: impl Into<String>, change: FieldChange) {
        self.0.insert(field.into(), change);
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the diff could not be attributed to individual fields.
    pub fn is_full_replacement(&self) -> bool {
        self.0.len() == 1 && self.0.contains_key(FULL_REPLACEMENT_FIELD)
    }

    /// Changed field names in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a FieldDiff {
    type Item = (&'a String, &'a FieldChange);
    type IntoIter = std::collections::btree_map::Iter<'a, String, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, FieldChange)> for FieldDiff {
    fn from_iter<I: IntoIterator<Item = (String, FieldChange)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Shape of one diff operand.
///
/// Only `Fields` operands can be compared field by field; anything else
/// forces a full replacement.
#[derive(Debug, Clone, Copy)]
pub enum RecordShape<'a> {
    Fields(&'a Map<String, Value>),
    Opaque(&'a Value),
}

impl<'a> RecordShape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(fields) => RecordShape::Fields(fields),
            other => RecordShape::Opaque(other),
        }
    }
}
