//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads all GCP resource definitions from embedded JSON files
//! and provides lookup functions for the rest of the application. Keys in the
//! JSON files must name a [`ResourceKind`]; an unknown key aborts the load.

use super::kind::ResourceKind;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/common.json"),
    include_str!("../resources/compute.json"),
    include_str!("../resources/network.json"),
    include_str!("../resources/storage.json"),
    include_str!("../resources/services.json"),
    include_str!("../resources/containers.json"),
];

/// Console marker for a provider status value
#[derive(Debug, Clone, Deserialize)]
pub struct StatusGlyph {
    pub value: String,
    pub emoji: String,
    pub ascii: String,
}

/// One `label: value` segment of a record's `extra` text
#[derive(Debug, Clone, Deserialize)]
pub struct ExtraField {
    pub label: String,
    pub json_path: String,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDef {
    pub display_name: String,
    pub service: String,
    pub sdk_method: String,
    #[serde(default)]
    pub sdk_method_params: Value,
    pub response_path: String,
    /// Dot path of the identifier field
    pub id_field: String,
    /// Dot path of the zone/region/location; appended to the id when present
    #[serde(default)]
    pub location_field: Option<String>,
    #[serde(default)]
    pub status_field: Option<String>,
    /// Status used when the API reports none
    #[serde(default)]
    pub default_status: Option<String>,
    #[serde(default)]
    pub extra_fields: Vec<ExtraField>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
struct ResourceFile {
    #[serde(default)]
    status_glyphs: Vec<StatusGlyph>,
    #[serde(default)]
    default_glyph: Option<StatusGlyph>,
    #[serde(default)]
    resources: HashMap<String, ResourceDef>,
}

/// Merged, validated registry
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub status_glyphs: Vec<StatusGlyph>,
    pub default_glyph: StatusGlyph,
    pub resources: HashMap<ResourceKind, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            status_glyphs: Vec::new(),
            default_glyph: StatusGlyph {
                value: String::new(),
                emoji: "🔹".to_string(),
                ascii: "[*]".to_string(),
            },
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceFile = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));

            final_config.status_glyphs.extend(partial.status_glyphs);
            if let Some(glyph) = partial.default_glyph {
                final_config.default_glyph = glyph;
            }

            for (key, def) in partial.resources {
                let kind: ResourceKind = key
                    .parse()
                    .unwrap_or_else(|e| panic!("Embedded resource JSON: {}", e));
                final_config.resources.insert(kind, def);
            }
        }

        final_config
    })
}

/// Get a resource definition by kind
pub fn get_resource(kind: ResourceKind) -> Option<&'static ResourceDef> {
    get_registry().resources.get(&kind)
}

/// Marker for a status string; unknown and empty statuses get the default marker
pub fn status_glyph(status: &str, use_emojis: bool) -> &'static str {
    let registry = get_registry();
    let glyph = registry
        .status_glyphs
        .iter()
        .find(|g| g.value.eq_ignore_ascii_case(status.trim()))
        .unwrap_or(&registry.default_glyph);

    if use_emojis {
        &glyph.emoji
    } else {
        &glyph.ascii
    }
}
