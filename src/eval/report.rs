//! Markdown report rendering.

use super::results::{ResultsAccumulator, StrategySummary};
use crate::error::{BenchError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Column headers, in output order.
pub const REPORT_HEADERS: [&str; 8] = [
    "Strategy",
    "Latency (ms)",
    "Tokens Used",
    "Sequence Number",
    "Query",
    "Predicted Answer",
    "Reference Answer",
    "Grade",
];

/// Render every record as a pipe-delimited markdown table.
///
/// Rows follow accumulator order: strategies first-seen, records by
/// sequence. Unknown tokens (0) and ungraded records render as empty cells.
pub fn render(accumulator: &ResultsAccumulator) -> String {
    let mut table = table_row(REPORT_HEADERS.iter().map(|h| h.to_string()));
    table.push_str(&table_row(REPORT_HEADERS.iter().map(|_| "---".to_string())));

    for entry in accumulator.entries() {
        for record in entry.records() {
            let tokens = if record.tokens_used > 0 {
                record.tokens_used.to_string()
            } else {
                String::new()
            };

            table.push_str(&table_row(
                [
                    entry.strategy().to_string(),
                    format!("{:.3}", record.latency_ms),
                    tokens,
                    record.sequence_number.to_string(),
                    escape_cell(&record.query),
                    escape_cell(&record.predicted_answer),
                    escape_cell(&record.reference_answer),
                    record.grade.as_cell().to_string(),
                ]
                .into_iter(),
            ));
        }
    }

    table
}

fn table_row(cells: impl Iterator<Item = String>) -> String {
    format!("| {} |\n", cells.collect::<Vec<_>>().join(" | "))
}

/// Keep free text inside one table cell.
fn escape_cell(text: &str) -> String {
    text.trim()
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

/// Write a report artifact (markdown or JSON), replacing any existing file.
pub fn write_report(path: &Path, report: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| BenchError::io(parent, e))?;
        }
    }

    fs::write(path, report).map_err(|e| BenchError::io(path, e))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summaries: Vec<StrategySummary>,
    results: &'a ResultsAccumulator,
}

/// Summaries plus every record, as pretty JSON.
pub fn summary_json(accumulator: &ResultsAccumulator) -> Result<String> {
    let report = JsonReport {
        summaries: accumulator.summaries(),
        results: accumulator,
    };
    serde_json::to_string_pretty(&report).map_err(|e| BenchError::Serialization(e.to_string()))
}
