//! Property-based tests for snapshot comparison
//!
//! Snapshots are generated from small id alphabets so that overlap between
//! the two sides is common.

use gcp_inventory::inventory::{compute_change_report, ResourceRecord, Snapshot};
use gcp_inventory::resource::ResourceKind;
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_kind() -> impl Strategy<Value = ResourceKind> {
    prop::sample::select(ResourceKind::ALL.to_vec())
}

fn arb_record() -> impl Strategy<Value = ResourceRecord> {
    (
        "[a-e][0-9]",
        prop_oneof!["", "size gb: 10", "attached: no"],
        prop_oneof!["", "RUNNING", "TERMINATED", "active"],
    )
        .prop_map(|(id, extra, status)| ResourceRecord::new(id, extra, status))
}

fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::btree_map(arb_kind(), prop::collection::vec(arb_record(), 0..8), 0..6)
        .prop_map(|resources| Snapshot {
            captured_at: None,
            resources,
        })
}

fn ids(records: &[ResourceRecord]) -> HashSet<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

proptest! {
    #[test]
    fn comparing_a_snapshot_with_itself_reports_nothing(snapshot in arb_snapshot()) {
        let report = compute_change_report(&snapshot, &snapshot);
        prop_assert!(report.added.is_empty());
        prop_assert!(report.removed.is_empty());
        prop_assert!(report.modified.is_empty());
    }

    #[test]
    fn swapping_sides_swaps_added_and_removed(current in arb_snapshot(), previous in arb_snapshot()) {
        let forward = compute_change_report(&current, &previous);
        let backward = compute_change_report(&previous, &current);
        prop_assert_eq!(&forward.added, &backward.removed);
        prop_assert_eq!(&forward.removed, &backward.added);
    }

    #[test]
    fn new_kind_is_added_wholesale(previous in arb_snapshot(), records in prop::collection::vec(arb_record(), 1..8)) {
        let kind = ResourceKind::ALL
            .into_iter()
            .find(|k| previous.records(*k).is_none());
        prop_assume!(kind.is_some());
        let kind = kind.unwrap();

        let mut current = previous.clone();
        current.insert(kind, records.clone());

        let report = compute_change_report(&current, &previous);
        prop_assert_eq!(report.added.get(&kind), Some(&records));
        prop_assert_eq!(report.added.len(), 1);
        prop_assert!(report.removed.is_empty());
    }

    #[test]
    fn reported_ids_are_exactly_the_set_differences(current in arb_snapshot(), previous in arb_snapshot()) {
        let report = compute_change_report(&current, &previous);

        for (kind, records) in &report.added {
            prop_assert!(!records.is_empty());
            let previous_ids = previous.records(*kind).map(ids).unwrap_or_default();
            prop_assert!(records.iter().all(|r| !previous_ids.contains(r.id.as_str())));
        }
        for (kind, records) in &report.removed {
            prop_assert!(!records.is_empty());
            let current_ids = current.records(*kind).map(ids).unwrap_or_default();
            prop_assert!(records.iter().all(|r| !current_ids.contains(r.id.as_str())));
        }

        // nothing that should be reported is missing
        for (kind, records) in &current.resources {
            let previous_ids = previous.records(*kind).map(ids).unwrap_or_default();
            let expected = records.iter().filter(|r| !previous_ids.contains(r.id.as_str())).count();
            prop_assert_eq!(report.added.get(kind).map_or(0, Vec::len), expected);
        }
    }

    #[test]
    fn added_records_keep_source_order(current in arb_snapshot()) {
        let report = compute_change_report(&current, &Snapshot::default());
        for (kind, records) in &report.added {
            prop_assert_eq!(Some(records.as_slice()), current.records(*kind));
        }
    }
}
