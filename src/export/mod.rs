//! Export of chunk history.
//!
//! Serializes chunks into plain text, CSV, or JSON. XML is listed as a
//! format but not implemented; requesting it fails with
//! [`ExportError::InvalidFormat`] instead of producing empty output.

use crate::codec::{self, escape_line_breaks};
use crate::core::{DataMode, UartDataChunk};
use crate::error::{ExportError, Result};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// CSV header row.
pub const CSV_HEADER: &str = "Timestamp,Direction,Data";

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// One `"<direction> <data>"` line per chunk.
    PlainText,
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array of objects.
    Json,
    /// Reserved, not implemented.
    Xml,
}

impl ExportFormat {
    /// Every format, including reserved ones.
    pub const ALL: [Self; 4] = [Self::PlainText, Self::Csv, Self::Json, Self::Xml];

    /// Formats that can actually be exported.
    #[must_use]
    pub fn available() -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|format| format.is_implemented())
            .collect()
    }

    /// Returns true if [`export`] supports this format.
    #[must_use]
    pub const fn is_implemented(self) -> bool {
        !matches!(self, Self::Xml)
    }

    /// Short name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        self.name()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" | "plain" => Ok(Self::PlainText),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(ExportError::InvalidFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Serializes `chunks` in `format`, rendering payloads per `data_mode`.
///
/// # Errors
///
/// - [`ExportError::NoData`] if `chunks` is empty (checked first)
/// - [`ExportError::InvalidTimestamp`] if a chunk's timestamp is NaN or
///   infinite
/// - [`ExportError::InvalidFormat`] for formats that are not implemented
///
/// # Examples
///
/// ```
/// use uart_log::core::{DataMode, Direction, UartDataChunk};
/// use uart_log::export::{ExportFormat, export};
///
/// let chunks = vec![UartDataChunk::new(1.0, Direction::Sent, b"AB".to_vec())];
/// let csv = export(&chunks, ExportFormat::Csv, DataMode::Hex).unwrap();
/// assert_eq!(csv, "Timestamp,Direction,Data\n1.0,TX,41 42");
///
/// assert!(export(&[], ExportFormat::Csv, DataMode::Hex).is_err());
/// ```
pub fn export(
    chunks: &[UartDataChunk],
    format: ExportFormat,
    data_mode: DataMode,
) -> Result<String> {
    if chunks.is_empty() {
        warn!(%format, "export requested with no data");
        return Err(ExportError::NoData.into());
    }
    if let Some(index) = chunks.iter().position(|c| !c.timestamp().is_finite()) {
        warn!(%format, index, "export rejected a non-finite timestamp");
        return Err(ExportError::InvalidTimestamp { index }.into());
    }
    let output = match format {
        ExportFormat::PlainText => data_as_text(chunks, data_mode),
        ExportFormat::Csv => data_as_csv(chunks, data_mode),
        ExportFormat::Json => data_as_json(chunks, data_mode)?,
        ExportFormat::Xml => {
            warn!(%format, "export format not implemented");
            return Err(ExportError::InvalidFormat {
                format: format.name().to_string(),
            }
            .into());
        }
    };
    debug!(%format, chunks = chunks.len(), bytes = output.len(), "export complete");
    Ok(output)
}

/// Plain-text serializer.
///
/// Line breaks inside an ASCII payload are escaped so each chunk stays on
/// one line. Backslashes are doubled so the escapes stay unambiguous.
#[must_use]
pub fn data_as_text(chunks: &[UartDataChunk], data_mode: DataMode) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "{} {}",
                chunk.direction().label(),
                escape_line_breaks(&codec::to_text(chunk.payload(), data_mode))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// CSV serializer.
#[must_use]
pub fn data_as_csv(chunks: &[UartDataChunk], data_mode: DataMode) -> String {
    let mut lines = Vec::with_capacity(chunks.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for chunk in chunks {
        let data = codec::to_text(chunk.payload(), data_mode);
        lines.push(format!(
            "{},{},{}",
            format_timestamp(chunk.timestamp()),
            chunk.direction().label(),
            csv_field(&data)
        ));
    }
    lines.join("\n")
}

#[derive(Serialize)]
struct JsonRecord {
    timestamp: f64,
    direction: &'static str,
    data: String,
}

/// JSON serializer. An empty slice yields `[]`.
///
/// # Errors
///
/// Returns [`ExportError::Serialization`] if serde fails.
pub fn data_as_json(chunks: &[UartDataChunk], data_mode: DataMode) -> Result<String> {
    let records: Vec<JsonRecord> = chunks
        .iter()
        .map(|chunk| JsonRecord {
            timestamp: chunk.timestamp(),
            direction: chunk.direction().label(),
            data: codec::to_text(chunk.payload(), data_mode),
        })
        .collect();
    serde_json::to_string_pretty(&records).map_err(|e| ExportError::from(e).into())
}

/// Formats a finite timestamp with at least one decimal place (`1.0`,
/// `2.5`, `1000000000000000.0`).
#[must_use]
pub fn format_timestamp(timestamp: f64) -> String {
    if timestamp.fract() == 0.0 {
        format!("{timestamp:.1}")
    } else {
        format!("{timestamp}")
    }
}

/// Quotes a CSV field if it contains a comma, quote, or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
