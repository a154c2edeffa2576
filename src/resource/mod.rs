//! Resource abstraction layer
//!
//! Resource kinds are a closed set ([`ResourceKind`]); how each kind is
//! listed and rendered is data, loaded from JSON files embedded at compile
//! time.
//!
//! # Architecture
//!
//! - [`kind`] - The closed set of kinds and their canonical names
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`fetcher`] - Lists a kind with pagination and normalizes items to records
//! - [`sdk_dispatch`] - Maps abstract SDK method names to concrete REST API calls
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `common.json` - Status markers shared by every kind
//! - `compute.json` - VM instances, disks, addresses
//! - `network.json` - VPC, firewall, load balancing and DNS resources
//! - `storage.json` - Buckets, Cloud SQL, BigQuery
//! - `services.json` - Serverless, IAM, secrets, Pub/Sub
//! - `containers.json` - GKE and Artifact Registry

pub mod fetcher;
pub mod kind;
pub mod registry;
pub mod sdk_dispatch;

pub use fetcher::{extract_json_value, list_records, normalize_item};
pub use kind::{ResourceKind, ServiceCategory, UnknownKind};
pub use registry::{get_registry, get_resource, status_glyph, ResourceDef};
