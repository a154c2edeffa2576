//! Snapshot files on disk

use chrono::{TimeZone, Utc};
use gcp_inventory::inventory::store::{self, SnapshotError};
use gcp_inventory::inventory::{compute_change_report, ResourceRecord, Snapshot};
use gcp_inventory::resource::ResourceKind;
use serde_json::Value;

fn sample() -> Snapshot {
    Snapshot::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap())
        .with(
            ResourceKind::ComputeInstances,
            vec![ResourceRecord::new("vm-1 (us-central1-a)", "machine: e2-small", "RUNNING")],
        )
        .with(
            ResourceKind::StorageBuckets,
            vec![
                ResourceRecord::new("logs", "location: US", "active"),
                ResourceRecord::new("backups", "location: EU", "active"),
            ],
        )
        .with(ResourceKind::PubsubTopics, vec![])
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scans").join("latest.json");

    store::save(&sample(), &path).unwrap();
    let loaded = store::load(&path).unwrap();

    assert_eq!(loaded, sample());
}

#[test]
fn test_saved_file_has_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latest.json");
    store::save(&sample(), &path).unwrap();

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["total_resources"], 3);
    assert!(document["timestamp"].as_str().unwrap().starts_with("2024-06-01T08:00:00"));
    assert_eq!(document["resources"]["storage-buckets"][1]["id"], "backups");
    assert_eq!(document["resources"]["pubsub-topics"], Value::Array(vec![]));
}

#[test]
fn test_missing_file_compares_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.json");

    assert!(matches!(store::load(&path), Err(SnapshotError::NotFound(_))));

    let previous = store::load_or_empty(&path).unwrap();
    assert!(previous.snapshot.is_empty());
    assert!(matches!(previous.fallback, Some(SnapshotError::NotFound(_))));

    let report = compute_change_report(&sample(), &previous.snapshot);
    assert_eq!(report.total_added(), 3);
    assert_eq!(report.total_removed(), 0);
}

#[test]
fn test_malformed_file_compares_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"resources\": ").unwrap();

    assert!(matches!(store::load(&path), Err(SnapshotError::Malformed { .. })));
    let previous = store::load_or_empty(&path).unwrap();
    assert!(previous.snapshot.is_empty());
    let reason = previous.fallback.unwrap().to_string();
    assert!(reason.contains("not valid JSON"), "{}", reason);
}

#[test]
fn test_empty_legacy_file_is_not_a_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");
    std::fs::write(&path, "{}").unwrap();

    let previous = store::load_or_empty(&path).unwrap();
    assert!(previous.snapshot.is_empty());
    assert!(previous.fallback.is_none());
}

#[test]
fn test_unknown_kind_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.json");
    std::fs::write(
        &path,
        r#"{ "timestamp": "2024-06-01T08:00:00Z", "resources": { "compute-instancez": [] } }"#,
    )
    .unwrap();

    let err = store::load_or_empty(&path).unwrap_err();
    assert!(matches!(err, SnapshotError::UnknownKind { .. }));
    assert!(err.to_string().contains("compute-instancez"));
}

#[test]
fn test_legacy_string_records_compare_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r#"{ "storage-buckets": ["logs location: US", "old-bucket"] }"#,
    )
    .unwrap();

    let previous = store::load(&path).unwrap();
    let report = compute_change_report(&sample(), &previous);

    let added: Vec<&str> = report.added[&ResourceKind::StorageBuckets]
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    let removed: Vec<&str> = report.removed[&ResourceKind::StorageBuckets]
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(added, vec!["backups"]);
    assert_eq!(removed, vec!["old-bucket"]);
    assert_eq!(report.total_added(), 2);
}
