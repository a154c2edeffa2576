//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication
//! and HTTP functionality.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Part of the project a scan covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionScope {
    /// One region, its zones and global resources
    Region(String),
    /// Every region, through the `-` location wildcard
    All,
}

impl fmt::Display for RegionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region(region) => f.write_str(region),
            Self::All => f.write_str("all regions"),
        }
    }
}

/// Base URLs of the GCP services the scanner reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub compute: String,
    pub storage: String,
    pub container: String,
    pub sqladmin: String,
    pub bigquery: String,
    pub cloudfunctions: String,
    pub run: String,
    pub iam: String,
    pub secretmanager: String,
    pub pubsub: String,
    pub artifactregistry: String,
    pub dns: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            compute: "https://compute.googleapis.com".to_string(),
            storage: "https://storage.googleapis.com".to_string(),
            container: "https://container.googleapis.com".to_string(),
            sqladmin: "https://sqladmin.googleapis.com".to_string(),
            bigquery: "https://bigquery.googleapis.com".to_string(),
            cloudfunctions: "https://cloudfunctions.googleapis.com".to_string(),
            run: "https://run.googleapis.com".to_string(),
            iam: "https://iam.googleapis.com".to_string(),
            secretmanager: "https://secretmanager.googleapis.com".to_string(),
            pubsub: "https://pubsub.googleapis.com".to_string(),
            artifactregistry: "https://artifactregistry.googleapis.com".to_string(),
            dns: "https://dns.googleapis.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Route every service to the same base URL (emulators, mock servers)
    pub fn uniform(base: &str) -> Result<Self> {
        let parsed = url::Url::parse(base).with_context(|| format!("Invalid endpoint URL: {}", base))?;
        let base = parsed.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            compute: base.clone(),
            storage: base.clone(),
            container: base.clone(),
            sqladmin: base.clone(),
            bigquery: base.clone(),
            cloudfunctions: base.clone(),
            run: base.clone(),
            iam: base.clone(),
            secretmanager: base.clone(),
            pubsub: base.clone(),
            artifactregistry: base.clone(),
            dns: base,
        })
    }
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub endpoints: Endpoints,
    pub project_id: String,
    pub region: RegionScope,
}

impl GcpClient {
    /// Create a new GCP client, authenticating with ADC or the given key file
    pub async fn new(project_id: &str, region: RegionScope, key_file: Option<&Path>) -> Result<Self> {
        let credentials = match key_file {
            Some(path) => GcpCredentials::from_key_file(path)?,
            None => GcpCredentials::new()
                .await
                .context("Failed to initialize GCP credentials")?,
        };

        Self::with_credentials(credentials, project_id, region, Endpoints::default())
    }

    pub fn with_credentials(
        credentials: GcpCredentials,
        project_id: &str,
        region: RegionScope,
        endpoints: Endpoints,
    ) -> Result<Self> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            endpoints,
            project_id: project_id.to_string(),
            region,
        })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }

    pub fn all_regions(&self) -> bool {
        self.region == RegionScope::All
    }

    /// Location segment for `locations/{location}` style APIs
    pub fn location(&self) -> &str {
        match &self.region {
            RegionScope::Region(region) => region,
            RegionScope::All => "-",
        }
    }

    /// True when an aggregated-list scope key (e.g. `zones/us-central1-a`,
    /// `regions/us-central1`) belongs to the scanned region. The `global`
    /// scope is project-wide and always included.
    pub fn scope_in_region(&self, scope_key: &str) -> bool {
        let region = match &self.region {
            RegionScope::Region(region) => region.as_str(),
            RegionScope::All => return true,
        };
        if scope_key == "global" {
            return true;
        }
        let location = scope_key.rsplit('/').next().unwrap_or(scope_key);
        location == region
            || location
                .strip_prefix(region)
                .is_some_and(|rest| rest.starts_with('-'))
    }

    // =========================================================================
    // Compute Engine API helpers
    // =========================================================================

    pub fn compute_url(&self, path: &str) -> String {
        format!(
            "{}/compute/v1/projects/{}/{}",
            self.endpoints.compute, self.project_id, path
        )
    }

    pub fn compute_global_url(&self, resource: &str) -> String {
        self.compute_url(&format!("global/{}", resource))
    }

    /// Build aggregated Compute Engine API URL (all zones and regions)
    pub fn compute_aggregated_url(&self, resource: &str) -> String {
        self.compute_url(&format!("aggregated/{}", resource))
    }

    // =========================================================================
    // Other service helpers
    // =========================================================================

    pub fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.endpoints.storage, path)
    }

    pub fn container_location_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/{}",
            self.endpoints.container,
            self.project_id,
            self.location(),
            resource
        )
    }

    pub fn sqladmin_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.endpoints.sqladmin, self.project_id, resource
        )
    }

    pub fn bigquery_url(&self, resource: &str) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/{}",
            self.endpoints.bigquery, self.project_id, resource
        )
    }

    pub fn cloudfunctions_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/{}",
            self.endpoints.cloudfunctions,
            self.project_id,
            self.location(),
            resource
        )
    }

    pub fn run_url(&self, resource: &str) -> String {
        format!(
            "{}/v2/projects/{}/locations/{}/{}",
            self.endpoints.run,
            self.project_id,
            self.location(),
            resource
        )
    }

    pub fn iam_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.endpoints.iam, self.project_id, resource
        )
    }

    pub fn secretmanager_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.endpoints.secretmanager, self.project_id, resource
        )
    }

    pub fn pubsub_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.endpoints.pubsub, self.project_id, resource
        )
    }

    pub fn artifactregistry_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/{}",
            self.endpoints.artifactregistry,
            self.project_id,
            self.location(),
            resource
        )
    }

    pub fn dns_url(&self, resource: &str) -> String {
        format!(
            "{}/dns/v1/projects/{}/{}",
            self.endpoints.dns, self.project_id, resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(region: RegionScope) -> GcpClient {
        GcpClient::with_credentials(
            GcpCredentials::from_static_token("t"),
            "my-project",
            region,
            Endpoints::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_compute_urls() {
        let client = client(RegionScope::Region("us-central1".to_string()));
        assert_eq!(
            client.compute_aggregated_url("instances"),
            "https://compute.googleapis.com/compute/v1/projects/my-project/aggregated/instances"
        );
        assert_eq!(
            client.compute_global_url("networks"),
            "https://compute.googleapis.com/compute/v1/projects/my-project/global/networks"
        );
    }

    #[test]
    fn test_location_wildcard_for_all_regions() {
        assert_eq!(client(RegionScope::All).location(), "-");
        assert_eq!(client(RegionScope::Region("europe-west1".to_string())).location(), "europe-west1");
        assert!(client(RegionScope::All)
            .run_url("services")
            .ends_with("/v2/projects/my-project/locations/-/services"));
    }

    #[test]
    fn test_region_named_all_is_not_a_wildcard() {
        let client = client(RegionScope::Region("all".to_string()));
        assert!(!client.all_regions());
        assert_eq!(client.location(), "all");
        assert!(!client.scope_in_region("zones/us-central1-a"));
    }

    #[test]
    fn test_region_scope_display() {
        assert_eq!(RegionScope::All.to_string(), "all regions");
        assert_eq!(RegionScope::Region("us-east1".to_string()).to_string(), "us-east1");
    }

    #[test]
    fn test_scope_in_region() {
        let client = client(RegionScope::Region("us-central1".to_string()));
        assert!(client.scope_in_region("zones/us-central1-a"));
        assert!(client.scope_in_region("regions/us-central1"));
        assert!(!client.scope_in_region("zones/us-central2-a"));
        assert!(!client.scope_in_region("regions/us-east1"));
        assert!(client.scope_in_region("global"));
    }

    #[test]
    fn test_uniform_endpoints_trim_trailing_slash() {
        let endpoints = Endpoints::uniform("http://127.0.0.1:8080/").unwrap();
        assert_eq!(endpoints.compute, "http://127.0.0.1:8080");
        assert_eq!(endpoints.dns, "http://127.0.0.1:8080");
        assert!(Endpoints::uniform("not a url").is_err());
    }
}
