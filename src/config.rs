//! Configuration Management
//!
//! Persistent defaults for gcp-inventory, stored as JSON in the user config
//! directory. Command-line flags always win over these values.

use crate::gcp::auth;
use crate::resource::ResourceKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "gcp-inventory";
pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_OUTPUT_DIR: &str = "exports";

/// User configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default project ID
    #[serde(default)]
    pub project_id: Option<String>,
    /// Default region
    #[serde(default)]
    pub region: Option<String>,
    /// Directory for exports
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub use_emojis: Option<bool>,
    /// Kinds never scanned unless named with --services
    #[serde(default)]
    pub disabled_services: Vec<ResourceKind>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit path; a missing or invalid file gives defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Get effective project (CLI > config > gcloud default)
    pub fn effective_project(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.project_id.clone())
            .or_else(auth::get_default_project)
            .filter(|p| !p.trim().is_empty())
    }

    /// Get effective region (CLI > config > gcloud default > us-central1)
    pub fn effective_region(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.region.clone())
            .or_else(auth::get_default_region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    pub fn effective_output_dir(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn is_enabled(&self, kind: ResourceKind) -> bool {
        !self.disabled_services.contains(&kind)
    }

    /// Kinds to scan, in declaration order.
    ///
    /// A non-empty `include` list replaces the config's enabled set; `exclude`
    /// always applies last.
    pub fn selected_kinds(&self, include: &[ResourceKind], exclude: &[ResourceKind]) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| {
                if include.is_empty() {
                    self.is_enabled(*kind)
                } else {
                    include.contains(kind)
                }
            })
            .filter(|kind| !exclude.contains(kind))
            .collect()
    }
}
