//! gcp-inventory: read-only resource inventory for Google Cloud projects,
//! with snapshot comparison between runs.

pub mod config;
pub mod gcp;
pub mod inventory;
pub mod report;
pub mod resource;
pub mod scan;
