//! Resource analysis.
//!
//! Heuristics over a snapshot: which kinds typically generate cost, and which
//! records look abandoned. They only read `status` and the `extra` text built
//! by the fetcher, so they stay cheap and never call the provider.

use super::record::{ResourceRecord, Snapshot};
use crate::resource::ResourceKind;

/// Kinds that bill while they exist, independent of traffic
pub const COST_KINDS: &[ResourceKind] = &[
    ResourceKind::ComputeInstances,
    ResourceKind::ComputeDisks,
    ResourceKind::ComputeAddresses,
    ResourceKind::SqlInstances,
    ResourceKind::ForwardingRules,
    ResourceKind::CloudRouters,
    ResourceKind::GkeClusters,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedCategory {
    UnattachedDisks,
    ReservedAddresses,
    StoppedInstances,
}

impl UnusedCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnattachedDisks => "Unattached disks",
            Self::ReservedAddresses => "Reserved but unused addresses",
            Self::StoppedInstances => "Stopped instances (disks still billed)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Record count per cost-generating kind, zero counts omitted
    pub cost_resources: Vec<(ResourceKind, usize)>,
    pub unused: Vec<(UnusedCategory, Vec<ResourceRecord>)>,
}

impl AnalysisReport {
    pub fn total_cost_resources(&self) -> usize {
        self.cost_resources.iter().map(|(_, count)| count).sum()
    }

    pub fn total_unused(&self) -> usize {
        self.unused.iter().map(|(_, records)| records.len()).sum()
    }
}

fn matching(
    snapshot: &Snapshot,
    kind: ResourceKind,
    predicate: impl Fn(&ResourceRecord) -> bool,
) -> Vec<ResourceRecord> {
    snapshot
        .records(kind)
        .unwrap_or_default()
        .iter()
        .filter(|r| predicate(r))
        .cloned()
        .collect()
}

fn is_unattached(record: &ResourceRecord) -> bool {
    record
        .extra
        .split(" | ")
        .any(|segment| segment.trim() == "attached: no")
}

pub fn analyze(snapshot: &Snapshot) -> AnalysisReport {
    let cost_resources = COST_KINDS
        .iter()
        .filter_map(|kind| {
            let count = snapshot.records(*kind).map_or(0, <[ResourceRecord]>::len);
            (count > 0).then_some((*kind, count))
        })
        .collect();

    let unused = vec![
        (
            UnusedCategory::UnattachedDisks,
            matching(snapshot, ResourceKind::ComputeDisks, is_unattached),
        ),
        (
            UnusedCategory::ReservedAddresses,
            matching(snapshot, ResourceKind::ComputeAddresses, |r| {
                r.status.eq_ignore_ascii_case("RESERVED")
            }),
        ),
        (
            UnusedCategory::StoppedInstances,
            matching(snapshot, ResourceKind::ComputeInstances, |r| {
                r.status.eq_ignore_ascii_case("TERMINATED") || r.status.eq_ignore_ascii_case("STOPPED")
            }),
        ),
    ];

    AnalysisReport {
        cost_resources,
        unused,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot::default()
            .with(
                ResourceKind::ComputeDisks,
                vec![
                    ResourceRecord::new("boot (us-central1-a)", "size gb: 10 | type: pd-balanced | attached: yes", "READY"),
                    ResourceRecord::new("scratch (us-central1-a)", "size gb: 500 | type: pd-ssd | attached: no", "READY"),
                ],
            )
            .with(
                ResourceKind::ComputeAddresses,
                vec![
                    ResourceRecord::new("lb-ip (us-central1)", "address: 34.1.2.3", "IN_USE"),
                    ResourceRecord::new("spare-ip (us-central1)", "address: 34.1.2.4", "RESERVED"),
                ],
            )
            .with(
                ResourceKind::ComputeInstances,
                vec![
                    ResourceRecord::new("web (us-central1-a)", "", "RUNNING"),
                    ResourceRecord::new("old (us-central1-a)", "", "TERMINATED"),
                ],
            )
            .with(ResourceKind::SqlInstances, vec![])
            .with(ResourceKind::PubsubTopics, vec![ResourceRecord::new("t", "", "")])
    }

    #[test]
    fn test_cost_resources_skip_empty_and_non_cost_kinds() {
        let report = analyze(&snapshot());
        assert_eq!(
            report.cost_resources,
            vec![
                (ResourceKind::ComputeInstances, 2),
                (ResourceKind::ComputeDisks, 2),
                (ResourceKind::ComputeAddresses, 2),
            ]
        );
        assert_eq!(report.total_cost_resources(), 6);
    }

    #[test]
    fn test_unused_resources_detected() {
        let report = analyze(&snapshot());
        let find = |category| {
            report
                .unused
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, records)| records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>())
                .unwrap()
        };

        assert_eq!(find(UnusedCategory::UnattachedDisks), vec!["scratch (us-central1-a)"]);
        assert_eq!(find(UnusedCategory::ReservedAddresses), vec!["spare-ip (us-central1)"]);
        assert_eq!(find(UnusedCategory::StoppedInstances), vec!["old (us-central1-a)"]);
        assert_eq!(report.total_unused(), 3);
    }

    #[test]
    fn test_empty_snapshot_has_nothing_to_report() {
        let report = analyze(&Snapshot::default());
        assert!(report.cost_resources.is_empty());
        assert_eq!(report.total_unused(), 0);
    }
}
