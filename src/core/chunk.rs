//! Directioned, timestamped byte chunks.
//!
//! A chunk is one unit of bytes moved across the UART link, either sent to
//! the peripheral or received from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a transfer relative to this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Outbound (TX).
    #[serde(rename = "TX", alias = "tx", alias = "sent")]
    Sent,
    /// Inbound (RX).
    #[serde(rename = "RX", alias = "rx", alias = "received")]
    Received,
}

impl Direction {
    /// Returns the short label token used in tables and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sent => "TX",
            Self::Received => "RX",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tx" | "sent" => Ok(Self::Sent),
            "rx" | "received" => Ok(Self::Received),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// One timestamped, directioned unit of transferred bytes.
///
/// Chunks are immutable to everyone but the owning store, which may grow
/// the newest chunk's payload when coalescing.
///
/// # Examples
///
/// ```
/// use uart_log::core::{Direction, UartDataChunk};
///
/// let chunk = UartDataChunk::new(1.5, Direction::Received, b"OK\r\n".to_vec());
/// assert_eq!(chunk.len(), 4);
/// assert_eq!(chunk.direction(), Direction::Received);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UartDataChunk {
    timestamp: f64,
    direction: Direction,
    payload: Vec<u8>,
}

impl UartDataChunk {
    /// Creates a new chunk.
    ///
    /// # Arguments
    ///
    /// * `timestamp` - Seconds (monotonic or wall clock) supplied by the caller.
    /// * `direction` - Transfer direction.
    /// * `payload` - Raw bytes; may be empty.
    #[must_use]
    pub const fn new(timestamp: f64, direction: Direction, payload: Vec<u8>) -> Self {
        Self {
            timestamp,
            direction,
            payload,
        }
    }

    /// Timestamp in seconds.
    #[must_use]
    pub const fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Transfer direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Appends `more` to the payload, keeping timestamp and direction.
    pub(crate) fn extend_payload(&mut self, more: &[u8]) {
        self.payload.extend_from_slice(more);
    }
}
