//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::codec::escape_line_breaks;
use crate::error::Error;
use crate::export::ExportFormat;
use crate::render::TableRow;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Summary of a replayed capture.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    /// Retained chunks.
    pub chunks: usize,
    /// Bytes sent.
    pub sent_bytes: usize,
    /// Bytes received.
    pub received_bytes: usize,
    /// First retained timestamp.
    pub first_timestamp: Option<f64>,
    /// Last retained timestamp.
    pub last_timestamp: Option<f64>,
}

/// Formats session statistics.
#[must_use]
pub fn format_stats(stats: &SessionStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("UART Session\n");
            output.push_str("============\n\n");
            let _ = writeln!(output, "  Chunks:    {}", stats.chunks);
            let _ = writeln!(output, "  Sent:      {} bytes", stats.sent_bytes);
            let _ = writeln!(output, "  Received:  {} bytes", stats.received_bytes);
            if let (Some(first), Some(last)) = (stats.first_timestamp, stats.last_timestamp) {
                let _ = writeln!(output, "  Span:      {:.3} s", last - first);
            }
            output
        }
        OutputFormat::Json => format_json(stats),
    }
}

#[derive(Serialize)]
struct RowJson<'a> {
    index: usize,
    time: &'a str,
    direction: &'static str,
    data: String,
}

/// Formats table rows.
#[must_use]
pub fn format_table(rows: &[TableRow], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if rows.is_empty() {
                return "No data.\n".to_string();
            }
            let mut output = String::new();
            for (index, row) in rows.iter().enumerate() {
                let _ = writeln!(
                    output,
                    "{:>5}  {:<11}  {}",
                    index,
                    row.label(),
                    escape_line_breaks(&row.data.plain_text())
                );
            }
            output
        }
        OutputFormat::Json => {
            let rows: Vec<_> = rows
                .iter()
                .enumerate()
                .map(|(index, row)| RowJson {
                    index,
                    time: &row.timestamp_label,
                    direction: row.direction.label(),
                    data: row.data.plain_text(),
                })
                .collect();
            format_json(&rows)
        }
    }
}

/// Formats the export format list.
#[must_use]
pub fn format_export_formats(format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::from("Export formats:\n");
            for export_format in ExportFormat::ALL {
                let note = if export_format.is_implemented() {
                    ""
                } else {
                    " (not implemented)"
                };
                let _ = writeln!(output, "  {export_format}{note}");
            }
            output
        }
        OutputFormat::Json => {
            let names: Vec<_> = ExportFormat::available()
                .into_iter()
                .map(ExportFormat::name)
                .collect();
            format_json(&names)
        }
    }
}

/// Formats an error.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorJson {
                error: String,
            }
            format_json(&ErrorJson {
                error: error.to_string(),
            })
        }
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
