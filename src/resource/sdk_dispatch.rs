//! SDK Dispatch
//!
//! Maps SDK method names from the registry to GCP REST API list calls.
//! Everything here is read-only.

use crate::gcp::client::GcpClient;
use anyhow::Result;
use serde_json::Value;

/// Invoke a GCP SDK method
pub async fn invoke_sdk(
    service: &str,
    method: &str,
    client: &GcpClient,
    params: &Value,
) -> Result<Value> {
    tracing::debug!("invoke_sdk: service={}, method={}", service, method);

    // Services with a single list method are routed by URL alone
    let (expected, url) = match service {
        "compute" => return invoke_compute(method, client, params).await,
        "storage" => return invoke_storage(method, client, params).await,
        "pubsub" => return invoke_pubsub(method, client, params).await,
        "sqladmin" => ("list_instances", client.sqladmin_url("instances")),
        "bigquery" => ("list_datasets", client.bigquery_url("datasets")),
        "container" => ("list_clusters", client.container_location_url("clusters")),
        "cloudfunctions" => ("list_functions", client.cloudfunctions_url("functions")),
        "run" => ("list_services", client.run_url("services")),
        "iam" => ("list_service_accounts", client.iam_url("serviceAccounts")),
        "secretmanager" => ("list_secrets", client.secretmanager_url("secrets")),
        "artifactregistry" => ("list_repositories", client.artifactregistry_url("repositories")),
        "dns" => ("list_managed_zones", client.dns_url("managedZones")),
        _ => return Err(anyhow::anyhow!("Unknown service: {}", service)),
    };

    if method != expected {
        return Err(anyhow::anyhow!("Unknown {} method: {}", service, method));
    }

    let url = add_query_params(&url, params);
    client.get(&url).await
}

// =============================================================================
// Compute Engine
// =============================================================================

async fn invoke_compute(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    let (resource, aggregated) = match method {
        "list_instances" => ("instances", true),
        "list_disks" => ("disks", true),
        "list_addresses" => ("addresses", true),
        "list_subnetworks" => ("subnetworks", true),
        "list_routers" => ("routers", true),
        "list_forwarding_rules" => ("forwardingRules", true),
        "list_networks" => ("networks", false),
        "list_firewalls" => ("firewalls", false),
        "list_backend_services" => ("backendServices", false),
        "list_ssl_certificates" => ("sslCertificates", false),
        _ => return Err(anyhow::anyhow!("Unknown compute method: {}", method)),
    };

    if aggregated {
        let url = client.compute_aggregated_url(resource);
        let url = add_query_params(&url, params);
        let response = client.get(&url).await?;
        Ok(flatten_aggregated_response(response, |scope| {
            client.scope_in_region(scope)
        }))
    } else {
        let url = client.compute_global_url(resource);
        let url = add_query_params(&url, params);
        client.get(&url).await
    }
}

// =============================================================================
// Cloud Storage
// =============================================================================

async fn invoke_storage(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    match method {
        "list_buckets" => {
            let url = format!(
                "{}?project={}",
                client.storage_url("b"),
                urlencoding::encode(&client.project_id)
            );
            let url = add_query_params(&url, params);
            client.get(&url).await
        }
        _ => Err(anyhow::anyhow!("Unknown storage method: {}", method)),
    }
}

// =============================================================================
// Pub/Sub
// =============================================================================

async fn invoke_pubsub(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    let resource = match method {
        "list_topics" => "topics",
        "list_subscriptions" => "subscriptions",
        _ => return Err(anyhow::anyhow!("Unknown pubsub method: {}", method)),
    };
    let url = add_query_params(&client.pubsub_url(resource), params);
    client.get(&url).await
}

// =============================================================================
// Helpers
// =============================================================================

fn add_query_params(url: &str, params: &Value) -> String {
    let Value::Object(map) = params else {
        return url.to_string();
    };

    let mut query_parts: Vec<String> = Vec::new();

    for (key, value) in map {
        match value {
            Value::String(s) => {
                query_parts.push(format!("{}={}", key, urlencoding::encode(s)));
            }
            Value::Number(n) => {
                query_parts.push(format!("{}={}", key, n));
            }
            Value::Bool(b) => {
                query_parts.push(format!("{}={}", key, b));
            }
            Value::Array(arr) => {
                for item in arr {
                    if let Value::String(s) = item {
                        query_parts.push(format!("{}={}", key, urlencoding::encode(s)));
                    }
                }
            }
            _ => {}
        }
    }

    if query_parts.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query_parts.join("&"))
    } else {
        format!("{}?{}", url, query_parts.join("&"))
    }
}

/// Flatten an aggregated API response into a standard list response.
/// Aggregated responses have format:
/// `{ "items": { "zones/us-central1-a": { "instances": [...] }, ... }, "nextPageToken": "..." }`
/// and are flattened to `{ "items": [...], "nextPageToken": "..." }`, keeping
/// only the scopes accepted by `keep_scope`.
pub fn flatten_aggregated_response(response: Value, keep_scope: impl Fn(&str) -> bool) -> Value {
    let mut flattened = serde_json::Map::new();

    let mut all_items: Vec<Value> = Vec::new();
    if let Some(items) = response.get("items").and_then(|v| v.as_object()) {
        for (scope_key, scope_data) in items {
            if !keep_scope(scope_key) {
                continue;
            }
            let Some(obj) = scope_data.as_object() else {
                continue;
            };
            for (key, value) in obj {
                // "warning" carries the "no results in this scope" notice
                if key == "warning" {
                    continue;
                }
                if let Some(arr) = value.as_array() {
                    all_items.extend(arr.iter().cloned());
                }
            }
        }
    }
    flattened.insert("items".to_string(), Value::Array(all_items));

    if let Some(token) = response.get("nextPageToken") {
        flattened.insert("nextPageToken".to_string(), token.clone());
    }

    Value::Object(flattened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_query_params() {
        let params = json!({ "pageToken": "a b", "maxResults": 500 });
        let url = add_query_params("https://x/y", &params);
        assert!(url.starts_with("https://x/y?"));
        assert!(url.contains("pageToken=a%20b"));
        assert!(url.contains("maxResults=500"));

        let url = add_query_params("https://x/y?project=p", &json!({ "pageToken": "t" }));
        assert_eq!(url, "https://x/y?project=p&pageToken=t");
    }

    #[test]
    fn test_flatten_aggregated_response_filters_scopes() {
        let response = json!({
            "items": {
                "zones/us-central1-a": { "instances": [{ "name": "a" }] },
                "zones/us-east1-b": { "instances": [{ "name": "b" }] },
                "zones/us-central1-f": { "warning": { "code": "NO_RESULTS_ON_PAGE" } }
            },
            "nextPageToken": "next"
        });

        let flattened = flatten_aggregated_response(response, |scope| scope.contains("us-central1"));
        let items = flattened["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "a");
        assert_eq!(flattened["nextPageToken"], "next");
    }

    #[test]
    fn test_flatten_aggregated_response_without_items() {
        let flattened = flatten_aggregated_response(json!({}), |_| true);
        assert_eq!(flattened, json!({ "items": [] }));
    }
}
