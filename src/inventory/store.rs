//! Snapshot persistence.
//!
//! File format:
//! `{ "timestamp": "<RFC 3339>", "total_resources": N, "resources": { "<kind>": [ { "id", "extra", "status" } ] } }`
//!
//! Loading also accepts older exports: a bare `{ "<kind>": [...] }` map with
//! no envelope, and records stored as `"id extra"` strings.

use super::record::{ResourceRecord, Snapshot};
use crate::resource::{ResourceKind, UnknownKind};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot {path} is not valid JSON: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("snapshot {path}: {source}")]
    UnknownKind {
        path: PathBuf,
        #[source]
        source: UnknownKind,
    },
}

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    timestamp: String,
    total_resources: usize,
    resources: &'a BTreeMap<ResourceKind, Vec<ResourceRecord>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Full(ResourceRecord),
    Legacy(String),
}

impl From<StoredRecord> for ResourceRecord {
    fn from(stored: StoredRecord) -> Self {
        match stored {
            StoredRecord::Full(record) => record,
            StoredRecord::Legacy(line) => split_legacy_record(&line),
        }
    }
}

/// `"id extra words"` -> id `id`, extra `extra words`
pub fn split_legacy_record(line: &str) -> ResourceRecord {
    let line = line.trim();
    match line.split_once(' ') {
        Some((id, extra)) => ResourceRecord::new(id, extra.trim(), ""),
        None => ResourceRecord::new(line, "", ""),
    }
}

/// Write a snapshot as a pretty-printed JSON envelope
pub fn save(snapshot: &Snapshot, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let timestamp = snapshot.captured_at.unwrap_or_else(Utc::now).to_rfc3339();
    let envelope = EnvelopeOut {
        timestamp,
        total_resources: snapshot.total_resources(),
        resources: &snapshot.resources,
    };

    let content = serde_json::to_string_pretty(&envelope)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

    tracing::info!(
        "Saved snapshot with {} resources to {}",
        envelope.total_resources,
        path.display()
    );
    Ok(())
}

/// Read a snapshot written by [`save`] or by an older export
pub fn load(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SnapshotError::NotFound(path.to_path_buf())
        } else {
            SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse(&content).map_err(|e| match e {
        ParseError::Malformed(reason) => SnapshotError::Malformed {
            path: path.to_path_buf(),
            reason,
        },
        ParseError::UnknownKind(source) => SnapshotError::UnknownKind {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Outcome of [`load_or_empty`]
#[derive(Debug)]
pub struct PreviousSnapshot {
    pub snapshot: Snapshot,
    /// Set when the file could not be used and `snapshot` is an empty stand-in
    pub fallback: Option<SnapshotError>,
}

/// Like [`load`], but a missing or unreadable file becomes an empty snapshot
/// and the reason is handed back in [`PreviousSnapshot::fallback`].
/// Unknown kind names are still an error.
pub fn load_or_empty(path: &Path) -> Result<PreviousSnapshot, SnapshotError> {
    match load(path) {
        Ok(snapshot) => Ok(PreviousSnapshot {
            snapshot,
            fallback: None,
        }),
        Err(e @ SnapshotError::UnknownKind { .. }) => Err(e),
        Err(e) => {
            tracing::warn!("{}; comparing against an empty snapshot", e);
            Ok(PreviousSnapshot {
                snapshot: Snapshot::default(),
                fallback: Some(e),
            })
        }
    }
}

#[derive(Debug)]
enum ParseError {
    Malformed(String),
    UnknownKind(UnknownKind),
}

fn parse(content: &str) -> Result<Snapshot, ParseError> {
    let document: Value =
        serde_json::from_str(content).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let Value::Object(mut top) = document else {
        return Err(ParseError::Malformed("top level is not an object".to_string()));
    };

    let (captured_at, resources) = match top.remove("resources") {
        Some(resources) => {
            let captured_at = top
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(parse_timestamp);
            (captured_at, resources)
        }
        // No envelope: the whole document is the kind map
        None => (None, Value::Object(top)),
    };

    let raw: BTreeMap<String, Vec<StoredRecord>> =
        serde_json::from_value(resources).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let mut snapshot = Snapshot {
        captured_at,
        resources: BTreeMap::new(),
    };
    for (key, records) in raw {
        let kind: ResourceKind = key.parse().map_err(ParseError::UnknownKind)?;
        snapshot
            .resources
            .entry(kind)
            .or_default()
            .extend(records.into_iter().map(ResourceRecord::from));
    }

    Ok(snapshot)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive ISO-8601 without offset, e.g. "2024-05-01T10:30:00.123456"
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
