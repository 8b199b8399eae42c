//! Row-per-chunk layout.

use crate::codec::{self, StyledText};
use crate::core::{ChunkFilter, DataMode, Direction, TextStyle, UartDataChunk, ViewConfig};
use chrono::{DateTime, Local, Utc};

/// Label used when a timestamp cannot be represented as a clock time.
pub const INVALID_TIME_LABEL: &str = "--:--:--";

/// Formats chunk timestamps for table rows.
pub trait TimestampFormatter {
    /// Formats seconds as a label.
    fn format(&self, timestamp: f64) -> String;
}

impl<F> TimestampFormatter for F
where
    F: Fn(f64) -> String,
{
    fn format(&self, timestamp: f64) -> String {
        self(timestamp)
    }
}

/// Time zone used by [`ClockFormatter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockZone {
    /// Coordinated universal time.
    #[default]
    Utc,
    /// The host's local zone.
    Local,
}

/// Formats seconds since the Unix epoch as `HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use uart_log::render::{ClockFormatter, TimestampFormatter};
///
/// let formatter = ClockFormatter::utc();
/// assert_eq!(formatter.format(3_723.9), "01:02:03");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockFormatter {
    zone: ClockZone,
}

impl ClockFormatter {
    /// Formatter using UTC.
    #[must_use]
    pub const fn utc() -> Self {
        Self {
            zone: ClockZone::Utc,
        }
    }

    /// Formatter using the local zone.
    #[must_use]
    pub const fn local() -> Self {
        Self {
            zone: ClockZone::Local,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn to_datetime(timestamp: f64) -> Option<DateTime<Utc>> {
        if !timestamp.is_finite() {
            return None;
        }
        let secs = timestamp.floor();
        let nanos = ((timestamp - secs) * 1e9).clamp(0.0, 999_999_999.0) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    }
}

impl TimestampFormatter for ClockFormatter {
    fn format(&self, timestamp: f64) -> String {
        Self::to_datetime(timestamp).map_or_else(
            || INVALID_TIME_LABEL.to_string(),
            |utc| match self.zone {
                ClockZone::Utc => utc.format("%H:%M:%S").to_string(),
                ClockZone::Local => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
            },
        )
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Formatted timestamp.
    pub timestamp_label: String,
    /// Direction; label text is left to the display.
    pub direction: Direction,
    /// Rendered payload.
    pub data: StyledText,
}

impl TableRow {
    /// Combined `"<time> <TX|RX>"` label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.timestamp_label, self.direction.label())
    }
}

/// Renders one chunk as a table row.
#[must_use]
pub fn render_table_row(
    chunk: &UartDataChunk,
    data_mode: DataMode,
    tx_style: TextStyle,
    rx_style: TextStyle,
    formatter: &dyn TimestampFormatter,
) -> TableRow {
    let style = match chunk.direction() {
        Direction::Sent => tx_style,
        Direction::Received => rx_style,
    };
    TableRow {
        timestamp_label: formatter.format(chunk.timestamp()),
        direction: chunk.direction(),
        data: codec::encode(chunk.payload(), data_mode, style),
    }
}

/// Renders the visible chunks as rows.
///
/// Row `i` of the result is row `i` of the display; hidden sent chunks
/// leave no gaps.
#[must_use]
pub fn render_table(
    chunks: &[UartDataChunk],
    view: &ViewConfig,
    formatter: &dyn TimestampFormatter,
) -> Vec<TableRow> {
    let filter = ChunkFilter::for_echo(view.show_echo);
    chunks
        .iter()
        .filter(|chunk| filter.matches(chunk))
        .map(|chunk| {
            render_table_row(
                chunk,
                view.data_mode,
                view.tx_style,
                view.rx_style,
                formatter,
            )
        })
        .collect()
}
