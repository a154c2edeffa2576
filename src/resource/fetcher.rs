//! Resource Fetcher
//!
//! Lists one resource kind from GCP, following page tokens, and turns each
//! raw API item into a [`ResourceRecord`].

use super::kind::ResourceKind;
use super::registry::{get_resource, ResourceDef};
use super::sdk_dispatch;
use crate::gcp::client::GcpClient;
use crate::inventory::ResourceRecord;
use anyhow::Result;
use serde_json::Value;

/// Placeholder returned by [`extract_json_value`] for missing values
pub const MISSING: &str = "-";

/// Result of paginated fetch
pub struct PaginatedResult {
    pub items: Vec<Value>,
    pub next_token: Option<String>,
}

/// List every record of one kind (auto-paginate)
pub async fn list_records(kind: ResourceKind, client: &GcpClient) -> Result<Vec<ResourceRecord>> {
    let def = resource_def(kind)?;
    let items = fetch_resources(kind, client).await?;
    let records: Vec<ResourceRecord> = items.iter().filter_map(|item| normalize_item(def, item)).collect();

    tracing::debug!(
        "{}: {} raw items, {} records",
        kind,
        items.len(),
        records.len()
    );
    Ok(records)
}

/// Fetch all raw items of one kind (auto-paginate)
pub async fn fetch_resources(kind: ResourceKind, client: &GcpClient) -> Result<Vec<Value>> {
    let mut all_items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let result = fetch_resources_paginated(kind, client, page_token.as_deref()).await?;
        all_items.extend(result.items);

        match result.next_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(all_items)
}

/// Fetch one page of raw items
pub async fn fetch_resources_paginated(
    kind: ResourceKind,
    client: &GcpClient,
    page_token: Option<&str>,
) -> Result<PaginatedResult> {
    let def = resource_def(kind)?;

    let mut params = def.sdk_method_params.clone();
    if params.is_null() {
        params = Value::Object(serde_json::Map::new());
    }
    if let (Value::Object(map), Some(token)) = (&mut params, page_token) {
        map.insert("pageToken".to_string(), Value::String(token.to_string()));
    }

    let response = sdk_dispatch::invoke_sdk(&def.service, &def.sdk_method, client, &params).await?;

    let items = extract_items(&response, &def.response_path, kind);
    let next_token = response
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok(PaginatedResult { items, next_token })
}

fn resource_def(kind: ResourceKind) -> Result<&'static ResourceDef> {
    get_resource(kind).ok_or_else(|| anyhow::anyhow!("No resource definition for {}", kind))
}

/// Extract items from response using the response_path
fn extract_items(response: &Value, path: &str, kind: ResourceKind) -> Vec<Value> {
    let raw_items = if path.is_empty() {
        response.as_array().cloned().unwrap_or_default()
    } else {
        let mut current = response;
        for part in path.split('.') {
            current = match current.get(part) {
                Some(v) => v,
                None => return vec![],
            };
        }
        current.as_array().cloned().unwrap_or_default()
    };

    raw_items
        .into_iter()
        .map(|item| post_process_item(item, kind))
        .collect()
}

fn insert_str(map: &mut serde_json::Map<String, Value>, key: &str, value: impl Into<String>) {
    map.insert(key.to_string(), Value::String(value.into()));
}

fn post_process_item(mut item: Value, kind: ResourceKind) -> Value {
    if let Value::Object(map) = &mut item {
        add_computed_fields(map, kind);
    }
    item
}

/// Add computed fields referenced by the registry's `json_path`s
fn add_computed_fields(map: &mut serde_json::Map<String, Value>, kind: ResourceKind) {
    // Short names from full URLs or resource paths
    for field in ["zone", "region", "machineType", "type", "network", "target", "topic", "name"] {
        if let Some(value) = map.get(field).and_then(|v| v.as_str()) {
            let short = extract_short_name(value);
            insert_str(map, &format!("{}_short", field), short);
        }
    }

    // Disks are either zonal or regional
    if let Some(scope) = map.get("zone_short").or_else(|| map.get("region_short")).cloned() {
        map.insert("scope_short".to_string(), scope);
    }

    if let Some(location) = map
        .get("name")
        .and_then(|v| v.as_str())
        .and_then(extract_location)
    {
        insert_str(map, "location_short", location);
    }

    // Count arrays
    for field in ["users", "subnetworks", "nats", "backends"] {
        if let Some(arr) = map.get(field).and_then(|v| v.as_array()) {
            let count = arr.len().to_string();
            insert_str(map, &format!("{}_count", field), count);
        }
    }

    // A disk with no users is not attached to any instance
    if kind == ResourceKind::ComputeDisks {
        let attached = map
            .get("users")
            .and_then(|v| v.as_array())
            .is_some_and(|users| !users.is_empty());
        insert_str(map, "attached_display", if attached { "yes" } else { "no" });
    }

    if let Some(auto_create) = map.get("autoCreateSubnetworks").and_then(|v| v.as_bool()) {
        let display = if auto_create { "Auto" } else { "Custom" };
        insert_str(map, "autoCreateSubnetworks_display", display);
    }

    // Firewalls and service accounts report `disabled` only when true
    if matches!(kind, ResourceKind::VpcFirewalls | ResourceKind::IamServiceAccounts) {
        let disabled = map.get("disabled").and_then(|v| v.as_bool()).unwrap_or(false);
        insert_str(map, "disabled_display", if disabled { "DISABLED" } else { "ENABLED" });
    }

    if map.contains_key("allowed") {
        insert_str(map, "action_display", "ALLOW");
    } else if map.contains_key("denied") {
        insert_str(map, "action_display", "DENY");
    }

    // Dates
    for field in ["timeCreated", "createTime", "expireTime"] {
        if let Some(value) = map.get(field).and_then(|v| v.as_str()) {
            let short = format_timestamp_short(value);
            insert_str(map, &format!("{}_short", field), short);
        }
    }

    if kind == ResourceKind::GkeClusters {
        let autopilot = map
            .get("autopilot")
            .and_then(|v| v.get("enabled"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        insert_str(map, "autopilot_display", if autopilot { "Autopilot" } else { "Standard" });
    }
}

/// Extract short name from GCP resource URL
/// e.g., "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-a" -> "us-central1-a"
fn extract_short_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// "projects/p/locations/us-central1/functions/f" -> "us-central1"
fn extract_location(name: &str) -> Option<String> {
    let mut segments = name.split('/');
    segments.find(|s| *s == "locations")?;
    segments.next().filter(|s| !s.is_empty()).map(str::to_string)
}

/// RFC 3339 timestamp to its date part
fn format_timestamp_short(timestamp: &str) -> String {
    timestamp.get(..10).unwrap_or(timestamp).to_string()
}

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value(item: &Value, path: &str) -> String {
    let mut current = item;

    for part in path.split('.') {
        // Handle array index
        let next = match part.parse::<usize>() {
            Ok(idx) => current.get(idx),
            Err(_) => current.get(part),
        };
        current = match next {
            Some(v) => v,
            None => return MISSING.to_string(),
        };
    }

    match current {
        Value::String(s) if s.is_empty() => MISSING.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => MISSING.to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => "[object]".to_string(),
    }
}

/// Build a record from a post-processed API item.
///
/// The id is `name (location)` when the definition has a location field and
/// the item carries one. Items without an identifier are skipped.
pub fn normalize_item(def: &ResourceDef, item: &Value) -> Option<ResourceRecord> {
    let name = extract_json_value(item, &def.id_field);
    if name == MISSING {
        return None;
    }

    let location = def
        .location_field
        .as_deref()
        .map(|field| extract_json_value(item, field))
        .filter(|loc| loc != MISSING);
    let id = match location {
        Some(loc) => format!("{} ({})", name, loc),
        None => name,
    };

    let extra = def
        .extra_fields
        .iter()
        .filter_map(|field| {
            let value = extract_json_value(item, &field.json_path);
            (value != MISSING).then(|| format!("{}: {}", field.label, value))
        })
        .collect::<Vec<_>>()
        .join(" | ");

    let status = def
        .status_field
        .as_deref()
        .map(|field| extract_json_value(item, field))
        .filter(|s| s != MISSING)
        .or_else(|| def.default_status.clone())
        .unwrap_or_default();

    Some(ResourceRecord::new(id, extra, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{compute_change_report, Snapshot};
    use serde_json::json;

    fn process(kind: ResourceKind, item: Value) -> Option<ResourceRecord> {
        let def = get_resource(kind).unwrap();
        normalize_item(def, &post_process_item(item, kind))
    }

    #[test]
    fn test_extract_json_value_paths() {
        let item = json!({
            "name": "vm-1",
            "networkInterfaces": [{ "networkIP": "10.0.0.2" }],
            "sizeGb": 10,
            "labels": {},
            "empty": ""
        });
        assert_eq!(extract_json_value(&item, "name"), "vm-1");
        assert_eq!(extract_json_value(&item, "networkInterfaces.0.networkIP"), "10.0.0.2");
        assert_eq!(extract_json_value(&item, "networkInterfaces.1.networkIP"), "-");
        assert_eq!(extract_json_value(&item, "sizeGb"), "10");
        assert_eq!(extract_json_value(&item, "labels"), "[object]");
        assert_eq!(extract_json_value(&item, "empty"), "-");
        assert_eq!(extract_json_value(&item, "missing.path"), "-");
    }

    #[test]
    fn test_instance_record() {
        let record = process(
            ResourceKind::ComputeInstances,
            json!({
                "name": "web-1",
                "zone": "https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-a",
                "machineType": "https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-a/machineTypes/e2-small",
                "status": "RUNNING",
                "networkInterfaces": [{ "networkIP": "10.128.0.2" }]
            }),
        )
        .unwrap();

        assert_eq!(record.id, "web-1 (us-central1-a)");
        assert_eq!(record.extra, "machine: e2-small | internal ip: 10.128.0.2");
        assert_eq!(record.status, "RUNNING");
    }

    #[test]
    fn test_disk_attachment() {
        let unattached = process(
            ResourceKind::ComputeDisks,
            json!({ "name": "scratch", "zone": "zones/us-east1-b", "sizeGb": "500", "status": "READY" }),
        )
        .unwrap();
        assert!(unattached.extra.ends_with("attached: no"));

        let attached = process(
            ResourceKind::ComputeDisks,
            json!({ "name": "boot", "zone": "zones/us-east1-b", "users": ["instances/vm"], "status": "READY" }),
        )
        .unwrap();
        assert!(attached.extra.ends_with("attached: yes"));
    }

    #[test]
    fn test_regional_disks_keep_their_region_in_the_id() {
        let central = process(
            ResourceKind::ComputeDisks,
            json!({ "name": "data", "region": "https://www.googleapis.com/compute/v1/projects/p/regions/us-central1", "status": "READY" }),
        )
        .unwrap();
        let europe = process(
            ResourceKind::ComputeDisks,
            json!({ "name": "data", "region": "https://www.googleapis.com/compute/v1/projects/p/regions/europe-west1", "status": "READY" }),
        )
        .unwrap();
        assert_eq!(central.id, "data (us-central1)");
        assert_eq!(europe.id, "data (europe-west1)");

        let previous = Snapshot::default().with(ResourceKind::ComputeDisks, vec![central.clone()]);
        let current = Snapshot::default().with(ResourceKind::ComputeDisks, vec![central, europe.clone()]);
        let report = compute_change_report(&current, &previous);
        assert_eq!(report.added.get(&ResourceKind::ComputeDisks), Some(&vec![europe]));
    }

    #[test]
    fn test_zonal_disk_prefers_zone() {
        let record = process(
            ResourceKind::ComputeDisks,
            json!({ "name": "boot", "zone": "zones/us-east1-b", "region": "regions/us-east1" }),
        )
        .unwrap();
        assert_eq!(record.id, "boot (us-east1-b)");
    }

    #[test]
    fn test_global_kind_has_plain_id_and_default_status() {
        let record = process(
            ResourceKind::StorageBuckets,
            json!({ "name": "my-bucket", "location": "US", "storageClass": "STANDARD", "timeCreated": "2024-03-01T12:00:00.000Z" }),
        )
        .unwrap();
        assert_eq!(record.id, "my-bucket");
        assert_eq!(record.extra, "location: US | class: STANDARD | created: 2024-03-01");
        assert_eq!(record.status, "active");
    }

    #[test]
    fn test_location_from_resource_name() {
        let record = process(
            ResourceKind::CloudFunctions,
            json!({ "name": "projects/p/locations/europe-west1/functions/resize", "status": "ACTIVE", "runtime": "python312" }),
        )
        .unwrap();
        assert_eq!(record.id, "resize (europe-west1)");
        assert_eq!(record.extra, "runtime: python312");
    }

    #[test]
    fn test_firewall_status_from_disabled_flag() {
        let record = process(
            ResourceKind::VpcFirewalls,
            json!({ "name": "allow-ssh", "network": "global/networks/default", "allowed": [{}], "direction": "INGRESS", "priority": 1000 }),
        )
        .unwrap();
        assert_eq!(record.status, "ENABLED");
        assert_eq!(record.extra, "network: default | direction: INGRESS | action: ALLOW | priority: 1000");
    }

    #[test]
    fn test_item_without_id_is_skipped() {
        assert!(process(ResourceKind::PubsubTopics, json!({ "kmsKeyName": "k" })).is_none());
    }

    #[test]
    fn test_extract_items_follows_response_path() {
        let response = json!({ "datasets": [{ "datasetReference": { "datasetId": "analytics" } }] });
        let items = extract_items(&response, "datasets", ResourceKind::BigqueryDatasets);
        assert_eq!(items.len(), 1);
        assert!(extract_items(&json!({}), "datasets", ResourceKind::BigqueryDatasets).is_empty());
    }

    #[test]
    fn test_extract_location() {
        assert_eq!(extract_location("projects/p/locations/us-central1/services/api").as_deref(), Some("us-central1"));
        assert_eq!(extract_location("projects/p/topics/t"), None);
    }
}
