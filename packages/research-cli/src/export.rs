//! Report export.
//!
//! Writes a finished batch report to CSV (one row per record, list
//! fields joined with "; ") or pretty-printed JSON.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use research::BatchReport;

/// Write the report as CSV, one row per record.
pub fn write_csv(report: &BatchReport, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv_to(report, file)
}

fn write_csv_to<W: Write>(report: &BatchReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "entity",
        "status",
        "search_query",
        "summary",
        "key_findings",
        "source_quality",
        "confidence",
        "notes",
        "sources",
        "error_detail",
        "completed_at",
    ])?;

    for record in report {
        let row = [
            record.entity.clone(),
            record.status.to_string(),
            record.search_query.clone(),
            record.summary.clone(),
            record.key_findings.join("; "),
            record.source_quality.clone().unwrap_or_default(),
            record.confidence.to_string(),
            record.notes.clone().unwrap_or_default(),
            record.sources.join("; "),
            record.error_detail.clone().unwrap_or_default(),
            record.completed_at.to_rfc3339(),
        ];
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the report as a pretty-printed JSON array.
pub fn write_json(report: &BatchReport, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_json_to(report, file)
}

fn write_json_to<W: Write>(report: &BatchReport, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, report.records()).context("Failed to serialize report")
}
