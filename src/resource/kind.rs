//! Resource kinds
//!
//! The closed set of resource categories the scanner knows how to list.
//! Every place a kind name enters the program (CLI filters, config file,
//! stored snapshots, the embedded registry) goes through [`ResourceKind::from_str`],
//! so a misspelled kind is rejected instead of creating a new category.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Broad service grouping, used for `--list-services` output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceCategory {
    Compute,
    Storage,
    Serverless,
    Databases,
    Networking,
    Identity,
    Messaging,
    Containers,
    Dns,
}

impl ServiceCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Compute => "Compute",
            Self::Storage => "Storage",
            Self::Serverless => "Serverless",
            Self::Databases => "Databases",
            Self::Networking => "Networking",
            Self::Identity => "Security & Identity",
            Self::Messaging => "Messaging",
            Self::Containers => "Containers",
            Self::Dns => "DNS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource kind: '{0}' (run with --list-services to see valid kinds)")]
pub struct UnknownKind(pub String);

/// A resource category. Declaration order is the display and storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    ComputeInstances,
    ComputeDisks,
    ComputeAddresses,
    StorageBuckets,
    CloudFunctions,
    RunServices,
    SqlInstances,
    BigqueryDatasets,
    VpcNetworks,
    VpcSubnetworks,
    VpcFirewalls,
    CloudRouters,
    ForwardingRules,
    BackendServices,
    SslCertificates,
    IamServiceAccounts,
    Secrets,
    PubsubTopics,
    PubsubSubscriptions,
    GkeClusters,
    ArtifactRepositories,
    DnsManagedZones,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 22] = [
        Self::ComputeInstances,
        Self::ComputeDisks,
        Self::ComputeAddresses,
        Self::StorageBuckets,
        Self::CloudFunctions,
        Self::RunServices,
        Self::SqlInstances,
        Self::BigqueryDatasets,
        Self::VpcNetworks,
        Self::VpcSubnetworks,
        Self::VpcFirewalls,
        Self::CloudRouters,
        Self::ForwardingRules,
        Self::BackendServices,
        Self::SslCertificates,
        Self::IamServiceAccounts,
        Self::Secrets,
        Self::PubsubTopics,
        Self::PubsubSubscriptions,
        Self::GkeClusters,
        Self::ArtifactRepositories,
        Self::DnsManagedZones,
    ];

    /// Stable key used in snapshot files, CSV rows and CLI filters
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComputeInstances => "compute-instances",
            Self::ComputeDisks => "compute-disks",
            Self::ComputeAddresses => "compute-addresses",
            Self::StorageBuckets => "storage-buckets",
            Self::CloudFunctions => "cloud-functions",
            Self::RunServices => "run-services",
            Self::SqlInstances => "sql-instances",
            Self::BigqueryDatasets => "bigquery-datasets",
            Self::VpcNetworks => "vpc-networks",
            Self::VpcSubnetworks => "vpc-subnetworks",
            Self::VpcFirewalls => "vpc-firewalls",
            Self::CloudRouters => "cloud-routers",
            Self::ForwardingRules => "forwarding-rules",
            Self::BackendServices => "backend-services",
            Self::SslCertificates => "ssl-certificates",
            Self::IamServiceAccounts => "iam-service-accounts",
            Self::Secrets => "secrets",
            Self::PubsubTopics => "pubsub-topics",
            Self::PubsubSubscriptions => "pubsub-subscriptions",
            Self::GkeClusters => "gke-clusters",
            Self::ArtifactRepositories => "artifact-repositories",
            Self::DnsManagedZones => "dns-managed-zones",
        }
    }

    pub fn category(&self) -> ServiceCategory {
        match self {
            Self::ComputeInstances | Self::ComputeDisks | Self::ComputeAddresses => {
                ServiceCategory::Compute
            }
            Self::StorageBuckets => ServiceCategory::Storage,
            Self::CloudFunctions | Self::RunServices => ServiceCategory::Serverless,
            Self::SqlInstances | Self::BigqueryDatasets => ServiceCategory::Databases,
            Self::VpcNetworks
            | Self::VpcSubnetworks
            | Self::VpcFirewalls
            | Self::CloudRouters
            | Self::ForwardingRules
            | Self::BackendServices
            | Self::SslCertificates => ServiceCategory::Networking,
            Self::IamServiceAccounts | Self::Secrets => ServiceCategory::Identity,
            Self::PubsubTopics | Self::PubsubSubscriptions => ServiceCategory::Messaging,
            Self::GkeClusters | Self::ArtifactRepositories => ServiceCategory::Containers,
            Self::DnsManagedZones => ServiceCategory::Dns,
        }
    }

    /// Human-readable name, taken from the registry definition
    pub fn display_name(&self) -> &'static str {
        super::get_resource(*self)
            .map(|def| def.display_name.as_str())
            .unwrap_or_else(|| self.as_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for ResourceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
