//! Console rendering
//!
//! Every function returns the text instead of printing it, so `main` decides
//! where it goes and tests can look at it.

use crate::inventory::analysis::AnalysisReport;
use crate::inventory::diff::KindRecords;
use crate::inventory::{ChangeReport, Snapshot};
use crate::resource::{status_glyph, ResourceKind};
use crate::scan::ScanResult;
use crossterm::style::Stylize;
use std::fmt::Write;

/// How many ids the change report prints per kind
const CHANGE_PREVIEW: usize = 3;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn banner(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", rule());
    let _ = writeln!(out, "{}", title.bold());
    let _ = writeln!(out, "{}", rule());
}

fn icon(use_emojis: bool, emoji: &'static str, ascii: &'static str) -> &'static str {
    if use_emojis {
        emoji
    } else {
        ascii
    }
}

/// Per-kind listing of every record. Empty kinds are skipped.
pub fn render_listing(snapshot: &Snapshot, use_emojis: bool) -> String {
    let mut out = String::new();

    for (kind, records) in snapshot.non_empty() {
        let _ = writeln!(
            out,
            "\n{} {}",
            format!("{} [{}]", kind.display_name(), kind).bold().cyan(),
            format!("({})", records.len()).dark_grey()
        );
        for record in records {
            let mut line = format!("  {} {}", status_glyph(&record.status, use_emojis), record.id);
            if !record.extra.is_empty() {
                let _ = write!(line, " | {}", record.extra);
            }
            if !record.status.is_empty() {
                let _ = write!(line, " [{}]", record.status);
            }
            let _ = writeln!(out, "{}", line);
        }
    }

    out
}

/// Totals, per-kind counts, failures and timing for one scan
pub fn render_summary(result: &ScanResult, project: &str, scope: &str, use_emojis: bool) -> String {
    let mut out = String::new();
    let snapshot = &result.snapshot;

    banner(&mut out, &format!("{} EXECUTIVE SUMMARY", icon(use_emojis, "📊", "==")));
    let _ = writeln!(out, "Project: {}", project);
    let _ = writeln!(out, "Scope: {}", scope);
    let _ = writeln!(out, "Total resources: {}", snapshot.total_resources());

    for (kind, records) in snapshot.non_empty() {
        let _ = writeln!(out, "  • {}: {}", kind.display_name(), records.len());
    }

    let empty: Vec<&str> = snapshot
        .resources
        .iter()
        .filter(|(_, records)| records.is_empty())
        .map(|(kind, _)| kind.as_str())
        .collect();
    if !empty.is_empty() {
        let _ = writeln!(out, "Kinds with no resources: {}", empty.join(", "));
    }

    if !result.failures.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            format!(
                "{} {} kind(s) could not be listed:",
                icon(use_emojis, "⚠️ ", "[!]"),
                result.failures.len()
            )
            .yellow()
        );
        for failure in &result.failures {
            let _ = writeln!(
                out,
                "  • {}: {}. {}",
                failure.kind,
                failure.error,
                failure.error.hint()
            );
        }
    }

    let _ = writeln!(
        out,
        "Scan duration: {:.1}s",
        result.duration_ms as f64 / 1000.0
    );
    out
}

fn render_change_section(out: &mut String, heading: String, changes: &KindRecords) {
    let _ = writeln!(out, "\n{}", heading);
    for (kind, records) in changes {
        let _ = writeln!(out, "  • {}: {} resources", kind, records.len());
        for record in records.iter().take(CHANGE_PREVIEW) {
            let _ = writeln!(out, "    - {}", record.id);
        }
        if records.len() > CHANGE_PREVIEW {
            let _ = writeln!(out, "    ... and {} more", records.len() - CHANGE_PREVIEW);
        }
    }
}

pub fn render_changes(report: &ChangeReport, use_emojis: bool) -> String {
    let mut out = String::new();

    banner(&mut out, &format!("{} CHANGE REPORT", icon(use_emojis, "🔄", "<>")));
    if let Some(previous) = report.previous_captured_at {
        let _ = writeln!(
            out,
            "Previous scan: {}",
            previous.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    render_change_section(
        &mut out,
        format!(
            "{} Resources added: {}",
            icon(use_emojis, "✅", "[+]"),
            report.total_added()
        ),
        &report.added,
    );
    render_change_section(
        &mut out,
        format!(
            "{} Resources removed: {}",
            icon(use_emojis, "❌", "[-]"),
            report.total_removed()
        ),
        &report.removed,
    );

    if report.is_empty() {
        let _ = writeln!(out, "\nNo changes detected since the previous scan.");
    }
    out
}

pub fn render_analysis(report: &AnalysisReport, use_emojis: bool) -> String {
    let mut out = String::new();

    banner(&mut out, &format!("{} RESOURCE ANALYSIS", icon(use_emojis, "📈", "##")));

    let _ = writeln!(
        out,
        "\n{} Cost-generating resources: {}",
        icon(use_emojis, "💰", "$"),
        report.total_cost_resources()
    );
    for (kind, count) in &report.cost_resources {
        let _ = writeln!(out, "  • {}: {} resources", kind.display_name(), count);
    }

    let _ = writeln!(
        out,
        "\n{} Potentially unused resources: {}",
        icon(use_emojis, "🗑️ ", "?"),
        report.total_unused()
    );
    for (category, records) in report.unused.iter().filter(|(_, r)| !r.is_empty()) {
        let _ = writeln!(out, "  • {}: {}", category.label(), records.len());
        for record in records {
            let _ = writeln!(out, "    - {}", record.id);
        }
    }
    out
}

/// Every known kind with an enabled/disabled marker, grouped by category
pub fn render_service_list(enabled: impl Fn(ResourceKind) -> bool, use_emojis: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available services:");

    let mut current_category = None;
    let mut kinds = ResourceKind::ALL;
    kinds.sort_by_key(|kind| kind.category());

    for kind in kinds {
        let category = kind.category();
        if current_category != Some(category) {
            let _ = writeln!(out, "\n{}", category.label().bold());
            current_category = Some(category);
        }
        let marker = if enabled(kind) {
            icon(use_emojis, "✅", "[x]")
        } else {
            icon(use_emojis, "❌", "[ ]")
        };
        let _ = writeln!(out, "  {} {:<24} {}", marker, kind.as_str(), kind.display_name());
    }
    out
}
