//! Snapshot comparison.
//!
//! Identity is the record `id` within a kind, nothing else:
//! - a kind only in the current snapshot is added wholesale
//! - a kind only in the previous snapshot is removed wholesale
//! - otherwise ids are compared as sets and matching records are reported
//!   in the order of the snapshot they come from
//!
//! Records whose id exists on both sides are never reported, even when their
//! status or details differ; `modified` stays empty.

use super::record::{ResourceRecord, Snapshot};
use crate::resource::ResourceKind;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

pub type KindRecords = BTreeMap<ResourceKind, Vec<ResourceRecord>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    pub added: KindRecords,
    pub removed: KindRecords,
    /// Never populated: same-id attribute changes are not detected
    pub modified: KindRecords,
    pub current_captured_at: Option<DateTime<Utc>>,
    pub previous_captured_at: Option<DateTime<Utc>>,
}

impl ChangeReport {
    pub fn total_added(&self) -> usize {
        self.added.values().map(Vec::len).sum()
    }

    pub fn total_removed(&self) -> usize {
        self.removed.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_added() == 0 && self.total_removed() == 0
    }
}

fn id_set(records: &[ResourceRecord]) -> HashSet<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

/// Records of `side` whose id is missing from `other`, in `side` order.
/// A kind absent from `other` yields every record of `side`.
fn missing_from(side: &Snapshot, other: &Snapshot) -> KindRecords {
    let mut result = KindRecords::new();

    for (kind, records) in &side.resources {
        let missing: Vec<ResourceRecord> = match other.resources.get(kind) {
            None => records.clone(),
            Some(other_records) => {
                let other_ids = id_set(other_records);
                records
                    .iter()
                    .filter(|r| !other_ids.contains(r.id.as_str()))
                    .cloned()
                    .collect()
            }
        };

        if !missing.is_empty() {
            result.insert(*kind, missing);
        }
    }

    result
}

/// Compare a fresh snapshot against a previously saved one
pub fn compute_change_report(current: &Snapshot, previous: &Snapshot) -> ChangeReport {
    ChangeReport {
        added: missing_from(current, previous),
        removed: missing_from(previous, current),
        modified: KindRecords::new(),
        current_captured_at: current.captured_at,
        previous_captured_at: previous.captured_at,
    }
}
