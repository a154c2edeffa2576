//! Reporters and exporters
//!
//! - [`console`] - listing, summary, change and analysis text
//! - [`csv`] - CSV export in the standard or legacy layout
//! - [`html`] - standalone HTML report
//!
//! JSON exports are snapshot files, written by [`crate::inventory::store`].

pub mod console;
pub mod csv;
pub mod html;

use crate::inventory::{store, Snapshot};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

pub use self::csv::CsvLayout;

pub const EXPORT_PREFIX: &str = "gcp_inventory";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
    /// Shorthand for every format
    All,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Html => "html",
            Self::All => "",
        }
    }

    /// Expand `All` and drop duplicates, keeping json, csv, html order
    pub fn expand(formats: &[ExportFormat]) -> Vec<ExportFormat> {
        let mut expanded: Vec<ExportFormat> = formats
            .iter()
            .flat_map(|format| match format {
                Self::All => vec![Self::Json, Self::Csv, Self::Html],
                other => vec![*other],
            })
            .collect();
        expanded.sort();
        expanded.dedup();
        expanded
    }
}

/// `gcp_inventory_<YYYYmmdd_HHMMSS>.<ext>`
pub fn export_file_name(timestamp: DateTime<Utc>, format: ExportFormat) -> String {
    format!(
        "{}_{}.{}",
        EXPORT_PREFIX,
        timestamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

pub struct ExportOptions<'a> {
    pub formats: &'a [ExportFormat],
    pub output_dir: &'a Path,
    pub csv_layout: CsvLayout,
    pub project: &'a str,
}

/// Write the requested exports and return their paths
pub fn write_exports(snapshot: &Snapshot, options: &ExportOptions<'_>) -> Result<Vec<PathBuf>> {
    let formats = ExportFormat::expand(options.formats);
    if formats.is_empty() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    let timestamp = snapshot.captured_at.unwrap_or_else(Utc::now);
    let mut written = Vec::new();

    for format in formats {
        let path = options.output_dir.join(export_file_name(timestamp, format));
        match format {
            ExportFormat::Json => store::save(snapshot, &path)?,
            ExportFormat::Csv => write_file(&path, &csv::render_csv(snapshot, options.csv_layout))?,
            ExportFormat::Html => write_file(&path, &html::render_html(snapshot, options.project, timestamp))?,
            ExportFormat::All => continue,
        }
        tracing::info!("Exported {:?} to {}", format, path.display());
        written.push(path);
    }

    Ok(written)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
