//! Detection pass properties, exercised through the in-memory store.

use layerwatch_core::diff::FULL_REPLACEMENT_FIELD;
use layerwatch_core::{
    ChangeDetector, ChangeType, FieldChange, InMemorySnapshotStore, Record, Snapshot,
    SnapshotStore,
};
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn layer(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

fn sample_batch() -> Vec<Record> {
    vec![
        layer(json!({
            "source": "FEMA",
            "endpoint": "https://hazards.fema.gov/arcgis/rest/services/public/NFHL",
            "name": "NFHL",
            "type": "MapServer",
            "properties": {"layers": 32}
        })),
        layer(json!({
            "source": "USGS",
            "endpoint": "https://earthquake.usgs.gov/fdsnws/event/1/query",
            "name": "Earthquakes past day",
            "formats": "GeoJSON"
        })),
        layer(json!({
            "source": "NOAA",
            "endpoint": "https://api.weather.gov/alerts/active",
            "name": "Active Alerts",
            "description": null
        })),
    ]
}

#[test]
fn test_first_run_one_new_per_identity_with_all_fields() {
    let store = InMemorySnapshotStore::new();
    let batch = sample_batch();

    let changes = ChangeDetector::new(&store).detect(&batch).unwrap();

    assert_eq!(changes.len(), batch.len());
    for (change, record) in changes.iter().zip(&batch) {
        assert_eq!(change.change_type(), ChangeType::New);
        assert_eq!(change.layer_id(), record.identity());
        assert_eq!(change.source(), record.source());
        assert_eq!(change.changed_fields().len(), record.len());
        for (field, value) in record.fields() {
            assert_eq!(
                change.changed_fields().get(field),
                Some(&FieldChange::new(Value::Null, value.clone()))
            );
        }
    }
}

#[test]
fn test_rerun_without_changes_is_empty() {
    let store = InMemorySnapshotStore::new();
    let detector = ChangeDetector::new(&store);
    let batch = sample_batch();

    assert_eq!(detector.detect(&batch).unwrap().len(), 3);
    assert!(detector.detect(&batch).unwrap().is_empty());
}

#[test]
fn test_rerun_with_reordered_batch_is_empty() {
    let store = InMemorySnapshotStore::new();
    let detector = ChangeDetector::new(&store);
    let mut batch = sample_batch();
    detector.detect(&batch).unwrap();

    batch.reverse();
    assert!(detector.detect(&batch).unwrap().is_empty());
}

#[test]
fn test_field_level_precision() {
    let mut prior = Snapshot::new();
    prior.insert_value("S|e|n", json!({"source": "S", "endpoint": "e", "name": "n", "a": 1, "b": 2}));
    let store = InMemorySnapshotStore::with_snapshot(prior);

    let changes = ChangeDetector::new(&store)
        .detect(&[layer(
            json!({"source": "S", "endpoint": "e", "name": "n", "a": 1, "b": 3}),
        )])
        .unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type(), ChangeType::Updated);
    assert_eq!(changes[0].changed_fields().len(), 1);
    assert_eq!(
        changes[0].changed_fields().get("b"),
        Some(&FieldChange::new(json!(2), json!(3)))
    );
    assert!(changes[0].changed_fields().get("a").is_none());
}

#[test]
fn test_legacy_hash_entry_tolerated() {
    let mut prior = Snapshot::new();
    prior.insert_value("S|e|n", json!("deadbeef"));
    let store = InMemorySnapshotStore::with_snapshot(prior);
    let record = layer(json!({"source": "S", "endpoint": "e", "name": "n", "type": "x"}));

    let changes = ChangeDetector::new(&store).detect(&[record.clone()]).unwrap();

    assert_eq!(changes.len(), 1);
    let fields = changes[0].changed_fields();
    assert!(fields.is_full_replacement());
    assert_eq!(
        fields.get(FULL_REPLACEMENT_FIELD),
        Some(&FieldChange::new(json!("deadbeef"), record.into_value()))
    );
}

#[test]
fn test_snapshot_holds_exactly_batch_identities() {
    let mut prior = Snapshot::new();
    prior.insert_value("OLD|x|y", json!({"source": "OLD"}));
    let store = InMemorySnapshotStore::with_snapshot(prior);
    let batch = sample_batch();

    ChangeDetector::new(&store).detect(&batch).unwrap();

    let stored: BTreeSet<String> = store.load().keys().map(str::to_string).collect();
    let expected: BTreeSet<String> = batch.iter().map(Record::identity).collect();
    assert_eq!(stored, expected);
}

#[test]
fn test_serialized_output_interface() {
    let store = InMemorySnapshotStore::new();
    let changes = ChangeDetector::new(&store)
        .detect(&[layer(json!({"source": "NASA", "endpoint": "cmr", "name": "MODIS"}))])
        .unwrap();

    let rendered = layerwatch_core::serialize_changes(&changes);
    let obj = rendered[0].as_object().unwrap();
    let keys: BTreeSet<&str> = obj.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["change_type", "changed_fields", "detection_time", "layer_id", "source"]
            .into_iter()
            .collect()
    );
    assert_eq!(obj["change_type"], json!("NEW"));
    assert_eq!(obj["changed_fields"]["name"], json!([null, "MODIS"]));
    let time = obj["detection_time"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
}

mod properties {
    use super::*;
    use layerwatch_core::field_level_diff;
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::from),
        ]
    }

    fn object() -> impl Strategy<Value = serde_json::Map<String, Value>> {
        prop::collection::btree_map("[a-d]", scalar(), 0..5)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn identity_ignores_non_identity_fields(
            source in "[A-Z]{1,5}",
            endpoint in "[a-z/:.]{0,12}",
            name in "[ -~]{0,10}",
            extra_a in object(),
            extra_b in object(),
        ) {
            let mut a = Record::from(extra_a);
            let mut b = Record::from(extra_b);
            for r in [&mut a, &mut b] {
                r.insert("source", source.clone());
                r.insert("endpoint", endpoint.clone());
                r.insert("name", name.clone());
            }
            prop_assert_eq!(a.identity(), b.identity());
            prop_assert_eq!(a.identity(), a.identity());
        }

        #[test]
        fn diff_of_value_with_itself_is_empty(fields in object()) {
            let value = Value::Object(fields);
            prop_assert!(field_level_diff(&value, &value).is_empty());
        }

        #[test]
        fn diff_reports_exactly_differing_fields(old in object(), new in object()) {
            let diff = field_level_diff(&Value::Object(old.clone()), &Value::Object(new.clone()));
            let null = Value::Null;
            for key in old.keys().chain(new.keys()) {
                let before = old.get(key).unwrap_or(&null);
                let after = new.get(key).unwrap_or(&null);
                prop_assert_eq!(diff.get(key).is_some(), before != after);
            }
            prop_assert!(diff.field_names().all(|k| old.contains_key(k) || new.contains_key(k)));
        }
    }
}
