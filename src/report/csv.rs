//! CSV export (RFC 4180)

use crate::inventory::Snapshot;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CsvLayout {
    /// Service,Resource_ID,Details,Status
    #[default]
    Standard,
    /// servico,id,extra (the layout of the first exports)
    Legacy,
}

impl CsvLayout {
    fn header(&self) -> &'static [&'static str] {
        match self {
            Self::Standard => &["Service", "Resource_ID", "Details", "Status"],
            Self::Legacy => &["servico", "id", "extra"],
        }
    }
}

/// Quote a field when it contains a separator, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[&str]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

pub fn render_csv(snapshot: &Snapshot, layout: CsvLayout) -> String {
    let mut out = String::new();
    push_row(&mut out, layout.header());

    for (kind, records) in &snapshot.resources {
        for record in records {
            match layout {
                CsvLayout::Standard => push_row(
                    &mut out,
                    &[kind.as_str(), &record.id, &record.extra, &record.status],
                ),
                CsvLayout::Legacy => push_row(&mut out, &[kind.as_str(), &record.id, &record.extra]),
            }
        }
    }

    out
}
