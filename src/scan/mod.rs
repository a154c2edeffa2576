//! Resource collection
//!
//! Lists the selected kinds from a [`ResourceSource`] and merges the results
//! into a [`Snapshot`]. A failing kind is recorded in [`ScanResult::failures`]
//! and left out of the snapshot; the other kinds are unaffected.

use crate::gcp::client::GcpClient;
use crate::gcp::http::{describe_status, format_gcp_error, ApiError};
use crate::inventory::{ResourceRecord, Snapshot};
use crate::resource::{fetcher, ResourceKind};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use std::time::Instant;
use thiserror::Error;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("authentication failed (401)")]
    Unauthenticated,

    #[error("permission denied (403)")]
    PermissionDenied,

    #[error("not found (404), the API may not be enabled")]
    NotFound,

    #[error("rate limited (429)")]
    RateLimited,

    #[error("service unavailable ({0})")]
    Unavailable(StatusCode),

    #[error("API request failed ({0})")]
    Api(StatusCode),

    #[error("{0}")]
    Request(String),
}

impl CollectionError {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => Self::Unauthenticated,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::Unavailable(status),
            _ => Self::Api(status),
        }
    }

    /// Short advice for the console
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Unauthenticated => describe_status(StatusCode::UNAUTHORIZED),
            Self::PermissionDenied => describe_status(StatusCode::FORBIDDEN),
            Self::NotFound => describe_status(StatusCode::NOT_FOUND),
            Self::RateLimited => describe_status(StatusCode::TOO_MANY_REQUESTS),
            Self::Unavailable(status) | Self::Api(status) => describe_status(*status),
            Self::Request(_) => "Request failed. Check your network connection and try again.",
        }
    }
}

impl From<anyhow::Error> for CollectionError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast_ref::<ApiError>() {
            Some(api_error) => Self::from_status(api_error.status),
            None => Self::Request(format_gcp_error(&error)),
        }
    }
}

/// Anything that can list the records of one kind
#[allow(async_fn_in_trait)]
pub trait ResourceSource {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<ResourceRecord>, CollectionError>;
}

impl ResourceSource for GcpClient {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<ResourceRecord>, CollectionError> {
        fetcher::list_records(kind, self)
            .await
            .map_err(CollectionError::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFailure {
    pub kind: ResourceKind,
    pub error: CollectionError,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub snapshot: Snapshot,
    pub failures: Vec<CollectionFailure>,
    pub duration_ms: u128,
}

/// List `kinds` with at most `concurrency` requests in flight.
///
/// Results are merged in the order of `kinds`, whatever order the listings
/// finish in.
pub async fn collect<S: ResourceSource>(source: &S, kinds: &[ResourceKind], concurrency: usize) -> ScanResult {
    let started = Instant::now();
    let mut snapshot = Snapshot::new(Utc::now());
    let mut failures = Vec::new();

    tracing::info!(
        "Collecting {} resource kinds (concurrency {})",
        kinds.len(),
        concurrency
    );

    let results: Vec<_> = stream::iter(kinds.iter().copied())
        .map(|kind| async move { (kind, source.list(kind).await) })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    for (kind, result) in results {
        match result {
            Ok(records) => {
                tracing::debug!("{}: {} records", kind, records.len());
                snapshot.insert(kind, records);
            }
            Err(error) => {
                tracing::warn!("Failed to list {}: {}", kind, error);
                failures.push(CollectionFailure { kind, error });
            }
        }
    }

    let duration_ms = started.elapsed().as_millis();
    tracing::info!(
        "Collected {} resources in {} ms ({} kinds failed)",
        snapshot.total_resources(),
        duration_ms,
        failures.len()
    );

    ScanResult {
        snapshot,
        failures,
        duration_ms,
    }
}
