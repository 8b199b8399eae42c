//! Capture files: recorded transfers to replay through the coordinator.
//!
//! A capture is either a JSON array or newline-delimited JSON of records
//! shaped like a hex-mode JSON export:
//!
//! ```text
//! {"timestamp": 1.0, "direction": "TX", "data": "41 54 0D 0A"}
//! ```
//!
//! In NDJSON form, blank lines and lines starting with `#` are skipped.

use crate::codec::decode_hex;
use crate::core::{Direction, UartDataChunk};
use crate::error::{Error, IoError, Result};
use crate::io::reader::FileReader;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CaptureRecord {
    timestamp: f64,
    direction: Direction,
    #[serde(default)]
    data: String,
}

impl CaptureRecord {
    fn into_chunk(self, line: usize) -> Result<UartDataChunk> {
        let payload = decode_hex(&self.data).map_err(|e| invalid(line, &e))?;
        Ok(UartDataChunk::new(self.timestamp, self.direction, payload))
    }
}

fn invalid(line: usize, reason: &dyn std::fmt::Display) -> Error {
    IoError::InvalidCapture {
        line,
        reason: reason.to_string(),
    }
    .into()
}

/// Parses capture text into chunks, in file order.
///
/// # Errors
///
/// Returns [`IoError::InvalidCapture`] naming the first bad record.
///
/// # Examples
///
/// ```
/// use uart_log::io::parse_capture;
///
/// let chunks = parse_capture(r#"{"timestamp":1.0,"direction":"RX","data":"4F 4B"}"#).unwrap();
/// assert_eq!(chunks[0].payload(), b"OK");
/// ```
pub fn parse_capture(text: &str) -> Result<Vec<UartDataChunk>> {
    if text.trim_start().starts_with('[') {
        let records: Vec<CaptureRecord> =
            serde_json::from_str(text).map_err(|e| invalid(e.line(), &e))?;
        return records
            .into_iter()
            .enumerate()
            .map(|(i, record)| record.into_chunk(i + 1))
            .collect();
    }

    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            let record: CaptureRecord =
                serde_json::from_str(line).map_err(|e| invalid(number, &e))?;
            record.into_chunk(number)
        })
        .collect()
}

/// Reads and parses a capture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a record is malformed.
pub fn read_capture<P: AsRef<Path>>(path: P) -> Result<Vec<UartDataChunk>> {
    let reader = FileReader::open(path)?;
    let chunks = reader.with_text(parse_capture)??;
    debug!(path = reader.path(), chunks = chunks.len(), "capture loaded");
    Ok(chunks)
}
