//! Inventory data model and the operations on captured snapshots
//!
//! - [`record`] - `ResourceRecord` and `Snapshot`
//! - [`diff`] - change detection between two snapshots
//! - [`store`] - JSON persistence of snapshots
//! - [`analysis`] - cost and unused-resource heuristics

pub mod analysis;
pub mod diff;
pub mod record;
pub mod store;

pub use diff::{compute_change_report, ChangeReport};
pub use record::{ResourceRecord, Snapshot};
