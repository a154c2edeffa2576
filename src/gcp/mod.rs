//! GCP API interaction module
//!
//! This module provides the core functionality for talking to Google Cloud
//! Platform REST APIs: authentication, the HTTP client and URL builders.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials or a key file
//! - [`client`] - Main GCP client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use crate::gcp::client::{GcpClient, RegionScope};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let region = RegionScope::Region("us-central1".to_string());
//!     let client = GcpClient::new("my-project", region, None).await?;
//!     let networks = client.get(&client.compute_global_url("networks")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
