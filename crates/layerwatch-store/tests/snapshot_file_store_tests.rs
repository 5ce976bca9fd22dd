// Integration tests for the file-backed snapshot store
// Covers cache recovery, persistence failure and baseline replacement

use layerwatch_core::{ChangeDetector, ChangeType, ExErrorKind, Record, Snapshot, SnapshotStore};
use layerwatch_store::{FsSnapshotStore, LoadOutcome, StoreConfig};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn setup_cache_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp cache directory")
}

fn layer(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

fn read_document(store: &FsSnapshotStore) -> serde_json::Map<String, Value> {
    let text = fs::read_to_string(store.path()).unwrap();
    match serde_json::from_str(&text).unwrap() {
        Value::Object(map) => map,
        other => panic!("cache root is not an object: {}", other),
    }
}

#[test]
fn test_first_run_without_cache_reports_all_new() {
    // Given: No cache file on disk
    let dir = setup_cache_dir();
    let store = FsSnapshotStore::new(dir.path().join("dsca_layer_cache.json"));
    let detector = ChangeDetector::new(&store);

    // When: A batch is detected
    let changes = detector
        .detect(&[
            layer(json!({"source": "NOAA", "endpoint": "e1", "name": "a"})),
            layer(json!({"source": "NOAA", "endpoint": "e1", "name": "b"})),
        ])
        .unwrap();

    // Then: Every record is NEW and the cache now exists
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|c| c.change_type() == ChangeType::New));
    assert!(store.path().exists());
}

#[test]
fn test_corrupt_cache_is_treated_as_empty() {
    // Given: A cache file holding invalid JSON
    let dir = setup_cache_dir();
    let path = dir.path().join("cache.json");
    fs::write(&path, b"{not json").unwrap();
    let store = FsSnapshotStore::new(&path);

    // When: A batch is detected
    let changes = ChangeDetector::new(&store)
        .detect(&[layer(json!({"source": "EPA", "name": "x"}))])
        .unwrap();

    // Then: The record is NEW and the cache is rewritten as valid JSON
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type(), ChangeType::New);
    assert!(matches!(store.load_outcome(), LoadOutcome::Loaded(_)));
}

#[test]
fn test_array_root_cache_is_treated_as_empty() {
    // Given: A cache whose root is a JSON array
    let dir = setup_cache_dir();
    let path = dir.path().join("cache.json");
    fs::write(&path, b"[{\"source\": \"EPA\"}]").unwrap();
    let store = FsSnapshotStore::new(&path);

    // When: The store is loaded
    let outcome = store.load_outcome();

    // Then: It is reported corrupt and loads as empty
    match outcome {
        LoadOutcome::Corrupt { reason } => assert!(reason.contains("array")),
        other => panic!("expected corrupt outcome, got {:?}", other),
    }
    assert!(store.load().is_empty());
}

#[test]
fn test_legacy_hash_entry_reports_full_replacement() {
    // Given: A cache from an older format storing a bare hash per key
    let dir = setup_cache_dir();
    let path = dir.path().join("cache.json");
    fs::write(&path, br#"{"NASA|e|MODIS": "deadbeef"}"#).unwrap();
    let store = FsSnapshotStore::new(&path);

    // When: The same identity is observed again
    let current = json!({"source": "NASA", "endpoint": "e", "name": "MODIS"});
    let changes = ChangeDetector::new(&store)
        .detect(&[layer(current.clone())])
        .unwrap();

    // Then: It is UPDATED with the whole-record sentinel
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type(), ChangeType::Updated);
    let change = changes[0].changed_fields().get("__all__").unwrap();
    assert_eq!(change.old(), &json!("deadbeef"));
    assert_eq!(change.new_value(), &current);

    // And: The cache entry is upgraded to the full record
    assert_eq!(read_document(&store).get("NASA|e|MODIS"), Some(&current));
}

#[test]
fn test_cache_holds_exactly_the_last_batch() {
    // Given: A cache seeded with two layers
    let dir = setup_cache_dir();
    let store = FsSnapshotStore::new(dir.path().join("cache.json"));
    let detector = ChangeDetector::new(&store);
    detector
        .detect(&[
            layer(json!({"source": "A", "endpoint": "e", "name": "1"})),
            layer(json!({"source": "A", "endpoint": "e", "name": "2"})),
        ])
        .unwrap();

    // When: A later batch only contains a different layer
    detector
        .detect(&[layer(json!({"source": "A", "endpoint": "e", "name": "3"}))])
        .unwrap();

    // Then: The document holds only that layer's key
    let keys: Vec<String> = read_document(&store).keys().cloned().collect();
    assert_eq!(keys, vec!["A|e|3".to_string()]);
}

#[test]
fn test_unchanged_batch_still_rewrites_cache() {
    // Given: A cache already matching the batch
    let dir = setup_cache_dir();
    let store = FsSnapshotStore::new(dir.path().join("cache.json"));
    let batch = [layer(json!({"source": "A", "endpoint": "e", "name": "1"}))];
    let detector = ChangeDetector::new(&store);
    detector.detect(&batch).unwrap();
    fs::write(store.path(), br#"{"A|e|1": {"endpoint": "e", "name": "1", "source": "A"}}"#)
        .unwrap();

    // When: The same batch is detected
    let changes = detector.detect(&batch).unwrap();

    // Then: No changes, and the document is rewritten in the store's format
    assert!(changes.is_empty());
    let text = fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("\n  \"A|e|1\""));
}

#[test]
fn test_pretty_document_has_sorted_keys() {
    // Given: A snapshot with keys inserted out of order
    let dir = setup_cache_dir();
    let store = FsSnapshotStore::new(dir.path().join("cache.json"));
    let mut snapshot = Snapshot::new();
    snapshot.insert_value("b", json!({"n": 2}));
    snapshot.insert_value("a", json!({"n": 1}));

    // When: It is saved
    store.save(&snapshot).unwrap();

    // Then: Keys appear sorted with two-space indentation
    let text = fs::read_to_string(store.path()).unwrap();
    let a = text.find("\"a\"").unwrap();
    let b = text.find("\"b\"").unwrap();
    assert!(a < b);
    assert!(text.starts_with("{\n  \"a\""));
}

#[test]
fn test_save_failure_is_propagated_and_returns_no_changes() {
    // Given: A cache path whose parent is a regular file
    let dir = setup_cache_dir();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"x").unwrap();
    let store = FsSnapshotStore::new(blocker.join("cache.json"));

    // When: A batch is detected
    let result = ChangeDetector::new(&store).detect(&[layer(json!({"name": "x"}))]);

    // Then: The pass fails with a persistence error carrying the path
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert!(err.path().unwrap().ends_with("cache.json"));
    assert_eq!(err.source_error().map(|e| e.kind()), Some(ExErrorKind::Io));
}

#[test]
fn test_failed_save_leaves_previous_cache_intact() {
    // Given: A valid cache, and a directory squatting on the temp file name
    let dir = setup_cache_dir();
    let path = dir.path().join("cache.json");
    let store = FsSnapshotStore::new(&path);
    let detector = ChangeDetector::new(&store);
    detector.detect(&[layer(json!({"source": "A", "name": "1"}))]).unwrap();
    let before = fs::read(&path).unwrap();
    fs::create_dir(dir.path().join("cache.json.tmp")).unwrap();

    // When: A new batch is detected
    let result = detector.detect(&[layer(json!({"source": "A", "name": "2"}))]);

    // Then: The pass fails and the old document is untouched
    assert!(result.is_err());
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_no_temp_file_left_after_save() {
    // Given: A store in an empty directory
    let dir = setup_cache_dir();
    let store = FsSnapshotStore::from_config(&StoreConfig::with_path(dir.path().join("c.json")));

    // When: A snapshot is saved
    store.save(&Snapshot::new()).unwrap();

    // Then: Only the cache file is present
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["c.json".to_string()]);
}
