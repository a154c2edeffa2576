//! Self-contained HTML report

use crate::inventory::Snapshot;
use chrono::{DateTime, Utc};
use std::fmt::Write;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 20px; background-color: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        h1 { color: #202124; text-align: center; }
        h2 { color: #1a73e8; border-bottom: 2px solid #1a73e8; padding-bottom: 5px; }
        .summary { background: #e8f0fe; padding: 15px; border-radius: 5px; margin-bottom: 20px; }
        .resource-group { margin-bottom: 30px; }
        .resource-item { background: #f9f9f9; margin: 5px 0; padding: 10px; border-left: 4px solid #1a73e8; }
        .status-running, .status-ready, .status-active, .status-in_use { border-left-color: #28a745; }
        .status-terminated, .status-error, .status-failed { border-left-color: #dc3545; }
        .status-stopped, .status-reserved, .status-disabled { border-left-color: #ffc107; }
        .resource-id { font-weight: bold; color: #202124; }
        .resource-details { color: #666; font-size: 0.9em; margin-top: 5px; }
        .timestamp { text-align: center; color: #666; margin-top: 20px; }
"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// CSS class for a status; statuses are provider words, but escape anyway
fn status_class(status: &str) -> String {
    if status.is_empty() {
        return String::new();
    }
    let class: String = status
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    format!(" status-{}", class)
}

pub fn render_html(snapshot: &Snapshot, project: &str, generated_at: DateTime<Utc>) -> String {
    let mut html = String::new();
    let project = escape_html(project);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>GCP Resources Report - {project} - {date}</title>
    <style>{STYLE}    </style>
</head>
<body>
    <div class="container">
        <h1>GCP Resources Report</h1>

        <div class="summary">
            <h2>Executive Summary</h2>
            <p><strong>Project:</strong> {project}</p>
            <p><strong>Total resources found:</strong> {total}</p>
            <ul>
"#,
        date = generated_at.format("%Y-%m-%d %H:%M"),
        total = snapshot.total_resources(),
    );

    for (kind, records) in snapshot.non_empty() {
        let _ = writeln!(
            html,
            "                <li><strong>{}:</strong> {} resources</li>",
            escape_html(kind.display_name()),
            records.len()
        );
    }

    html.push_str(
        r#"            </ul>
        </div>

        <h2>Resources by Service</h2>
"#,
    );

    for (kind, records) in snapshot.non_empty() {
        let _ = writeln!(
            html,
            "        <div class=\"resource-group\">\n            <h3>{} <code>{}</code> ({} resources)</h3>",
            escape_html(kind.display_name()),
            kind,
            records.len()
        );

        for record in records {
            let _ = writeln!(
                html,
                "            <div class=\"resource-item{}\">",
                status_class(&record.status)
            );
            let _ = writeln!(
                html,
                "                <div class=\"resource-id\">{}</div>",
                escape_html(&record.id)
            );
            if !record.extra.is_empty() {
                let _ = writeln!(
                    html,
                    "                <div class=\"resource-details\">{}</div>",
                    escape_html(&record.extra)
                );
            }
            if !record.status.is_empty() && !record.status.eq_ignore_ascii_case("active") {
                let _ = writeln!(
                    html,
                    "                <div class=\"resource-details\"><strong>Status:</strong> {}</div>",
                    escape_html(&record.status)
                );
            }
            html.push_str("            </div>\n");
        }

        html.push_str("        </div>\n");
    }

    let _ = write!(
        html,
        r#"
        <div class="timestamp">
            <p>Report generated at {}</p>
        </div>
    </div>
</body>
</html>
"#,
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    html
}
