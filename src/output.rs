//! Report rendering.
//!
//! Supports three interchangeable formats:
//! - Table (default, four sections plus a summary line)
//! - CSV (one row per plugin)
//! - JSON (`plugins` array and `summary` object)

use crate::registry::Provenance;
use crate::report::{AuditResult, PluginFinding, UpdateStatus};
use anyhow::{Context, Result};
use std::io::Write;
use tabled::settings::{Padding, Style};
use tabled::{Table, Tabled};

const CSV_HEADER: [&str; 9] = [
    "plugin_id",
    "name",
    "installed_version",
    "latest_version",
    "update_available",
    "status",
    "type",
    "source",
    "marketplace_url",
];

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Sectioned tables (human-readable)
    #[default]
    Table,
    /// Comma-separated records
    Csv,
    /// JSON document (machine-readable)
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("error: invalid format {:?}. Use table, csv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Writes `result` to `w` in the requested format.
pub fn format_output<W: Write>(
    w: &mut W,
    result: &AuditResult,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => format_table(w, result),
        OutputFormat::Csv => format_csv(w, result),
        OutputFormat::Json => format_json(w, result),
    }
}

#[derive(Tabled)]
struct MarketplaceRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "INSTALLED")]
    installed: String,
    #[tabled(rename = "LATEST")]
    latest: String,
    #[tabled(rename = "UPDATE?")]
    update: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct PluginRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "INSTALLED")]
    installed: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

/// Text shown in the UPDATE? column.
pub fn update_indicator(finding: &PluginFinding) -> &'static str {
    if finding.update_available == UpdateStatus::Available {
        "YES ⚠"
    } else {
        "No"
    }
}

fn section_table(provenance: Provenance, findings: &[&PluginFinding]) -> String {
    let mut table = if provenance == Provenance::Marketplace {
        Table::new(findings.iter().map(|p| MarketplaceRow {
            name: p.name.clone(),
            installed: p.installed_version.clone(),
            latest: p.latest_version.clone(),
            update: update_indicator(p).to_string(),
            status: p.status.label().to_string(),
        }))
    } else {
        Table::new(findings.iter().map(|p| PluginRow {
            name: p.name.clone(),
            installed: p.installed_version.clone(),
            status: p.status.label().to_string(),
        }))
    };
    table.with(Style::empty()).with(Padding::new(0, 2, 0, 0));
    // no padding after the last column
    table
        .to_string()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_table<W: Write>(w: &mut W, result: &AuditResult) -> Result<()> {
    for provenance in Provenance::ALL {
        let findings: Vec<&PluginFinding> = result.by_provenance(provenance).collect();

        writeln!(w, "=== {} ({}) ===", provenance.title(), findings.len())?;
        if findings.is_empty() {
            writeln!(w, "(none)")?;
        } else {
            writeln!(w, "{}", section_table(provenance, &findings))?;
        }
        writeln!(w)?;
    }

    let s = &result.summary;
    writeln!(
        w,
        "Summary: {} plugin(s) total — {} marketplace ({} outdated, {} up to date), {} mattermost, {} bundled, {} third-party/custom — {} enabled, {} disabled",
        s.total,
        s.marketplace,
        s.outdated,
        s.up_to_date,
        s.mattermost_plugin,
        s.bundled,
        s.third_party,
        s.enabled,
        s.disabled,
    )?;

    Ok(())
}

/// Same quoting rule as Go's `encoding/csv` writer, including leading
/// whitespace and the lone `\.` marker.
fn needs_quotes(value: &str) -> bool {
    value == r"\."
        || value.contains([',', '"', '\n', '\r'])
        || value.starts_with(char::is_whitespace)
}

fn escape_csv_value(value: &str) -> String {
    if needs_quotes(value) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_csv_record<W: Write>(w: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape_csv_value(f)).collect();
    writeln!(w, "{}", line.join(","))
}

fn format_csv<W: Write>(w: &mut W, result: &AuditResult) -> Result<()> {
    write_csv_record(w, &CSV_HEADER)?;

    for p in &result.plugins {
        write_csv_record(
            w,
            &[
                p.id.as_str(),
                p.name.as_str(),
                p.installed_version.as_str(),
                p.latest_version.as_str(),
                p.update_available.as_str(),
                p.status.as_str(),
                p.component_type.as_str(),
                p.provenance.as_str(),
                p.marketplace_url.as_str(),
            ],
        )?;
    }

    w.flush()?;
    Ok(())
}

fn format_json<W: Write>(w: &mut W, result: &AuditResult) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, result).context("failed to serialize audit report")?;
    writeln!(w)?;
    Ok(())
}
