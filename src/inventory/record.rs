use crate::resource::ResourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One discovered cloud resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    #[serde(default)]
    pub extra: String,
    #[serde(default)]
    pub status: String,
}

impl ResourceRecord {
    pub fn new(id: impl Into<String>, extra: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: extra.into(),
            status: status.into(),
        }
    }
}

/// Point-in-time enumeration of every scanned kind.
///
/// Kinds iterate in `ResourceKind` declaration order. A kind that was listed
/// successfully but had nothing in it maps to an empty list; a kind that was
/// not listed (filtered out or failed) is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub captured_at: Option<DateTime<Utc>>,
    pub resources: BTreeMap<ResourceKind, Vec<ResourceRecord>>,
}

impl Snapshot {
    pub fn new(captured_at: DateTime<Utc>) -> Self {
        Self {
            captured_at: Some(captured_at),
            resources: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, kind: ResourceKind, records: Vec<ResourceRecord>) {
        self.resources.insert(kind, records);
    }

    /// Builder used heavily by tests
    pub fn with(mut self, kind: ResourceKind, records: Vec<ResourceRecord>) -> Self {
        self.insert(kind, records);
        self
    }

    pub fn records(&self, kind: ResourceKind) -> Option<&[ResourceRecord]> {
        self.resources.get(&kind).map(Vec::as_slice)
    }

    /// Kinds with at least one record, in display order
    pub fn non_empty(&self) -> impl Iterator<Item = (ResourceKind, &[ResourceRecord])> + '_ {
        self.resources
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(kind, records)| (*kind, records.as_slice()))
    }

    pub fn total_resources(&self) -> usize {
        self.resources.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_resources() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_resources_sums_all_kinds() {
        let snapshot = Snapshot::default()
            .with(
                ResourceKind::StorageBuckets,
                vec![ResourceRecord::new("b1", "", "active"), ResourceRecord::new("b2", "", "active")],
            )
            .with(ResourceKind::Secrets, vec![ResourceRecord::new("s1", "", "")])
            .with(ResourceKind::PubsubTopics, vec![]);

        assert_eq!(snapshot.total_resources(), 3);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_non_empty_skips_empty_kinds_in_kind_order() {
        let snapshot = Snapshot::default()
            .with(ResourceKind::Secrets, vec![ResourceRecord::new("s1", "", "")])
            .with(ResourceKind::PubsubTopics, vec![])
            .with(ResourceKind::ComputeInstances, vec![ResourceRecord::new("vm", "", "RUNNING")]);

        let kinds: Vec<ResourceKind> = snapshot.non_empty().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, vec![ResourceKind::ComputeInstances, ResourceKind::Secrets]);
        assert_eq!(snapshot.resources.len(), 3);
    }

    #[test]
    fn test_record_defaults_missing_fields() {
        let record: ResourceRecord = serde_json::from_str(r#"{ "id": "b1" }"#).unwrap();
        assert_eq!(record, ResourceRecord::new("b1", "", ""));
    }
}
