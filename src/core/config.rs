//! Explicit configuration passed into the buffer, renderer, and exporter.
//!
//! Display preferences live with the caller; every render or export call
//! receives them as a [`ViewConfig`] value.

use crate::core::chunk::Direction;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How byte payloads are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Printable characters, placeholder for the rest.
    #[default]
    Ascii,
    /// Two uppercase hex digits per byte.
    Hex,
}

/// How the chunk history is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// One row per chunk with a timestamp label.
    Table,
    /// Concatenated stream.
    #[default]
    Text,
}

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Builds a color from a `0xRRGGBB` value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_hex(value: u32) -> Self {
        Self(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Regular,
    /// Bold weight.
    Bold,
}

/// Color and font applied to a rendered fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    /// Foreground color.
    pub color: Rgb,
    /// Font weight.
    #[serde(default)]
    pub weight: FontWeight,
}

impl TextStyle {
    /// Creates a regular-weight style.
    #[must_use]
    pub const fn new(color: Rgb) -> Self {
        Self {
            color,
            weight: FontWeight::Regular,
        }
    }

    /// Default style for sent data.
    #[must_use]
    pub const fn default_tx() -> Self {
        Self::new(Rgb::from_hex(0x3B_6E_C4))
    }

    /// Default style for received data.
    #[must_use]
    pub const fn default_rx() -> Self {
        Self::new(Rgb::from_hex(0xC4_3B_3B))
    }
}

/// Display preferences for rendering and exporting.
///
/// # Examples
///
/// ```
/// use uart_log::core::{DataMode, ViewConfig};
///
/// let view = ViewConfig::default().with_data_mode(DataMode::Hex).with_echo(false);
/// assert_eq!(view.data_mode, DataMode::Hex);
/// assert!(!view.show_echo);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Table or text layout.
    pub display_mode: DisplayMode,
    /// ASCII or hex payloads.
    pub data_mode: DataMode,
    /// Whether sent chunks are shown alongside received ones.
    pub show_echo: bool,
    /// Style for sent data.
    pub tx_style: TextStyle,
    /// Style for received data.
    pub rx_style: TextStyle,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::default(),
            data_mode: DataMode::default(),
            show_echo: true,
            tx_style: TextStyle::default_tx(),
            rx_style: TextStyle::default_rx(),
        }
    }
}

impl ViewConfig {
    /// Sets the data mode.
    #[must_use]
    pub const fn with_data_mode(mut self, data_mode: DataMode) -> Self {
        self.data_mode = data_mode;
        self
    }

    /// Sets the display mode.
    #[must_use]
    pub const fn with_display_mode(mut self, display_mode: DisplayMode) -> Self {
        self.display_mode = display_mode;
        self
    }

    /// Sets the echo flag.
    #[must_use]
    pub const fn with_echo(mut self, show_echo: bool) -> Self {
        self.show_echo = show_echo;
        self
    }

    /// Returns the style for a direction.
    #[must_use]
    pub const fn style_for(&self, direction: Direction) -> TextStyle {
        match direction {
            Direction::Sent => self.tx_style,
            Direction::Received => self.rx_style,
        }
    }

    /// Returns true if chunks of this direction are shown.
    #[must_use]
    pub fn shows(&self, direction: Direction) -> bool {
        self.show_echo || direction == Direction::Received
    }
}

/// Retention and coalescing policy for the chunk store.
///
/// Everything is disabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Merge consecutive same-direction chunks arriving within this many
    /// seconds of the previous one.
    pub coalesce_window: Option<f64>,
    /// Maximum retained chunks.
    pub max_chunks: Option<usize>,
    /// Maximum retained payload bytes.
    pub max_bytes: Option<usize>,
}

impl StoreConfig {
    /// Sets the coalescing window in seconds.
    #[must_use]
    pub const fn with_coalesce_window(mut self, seconds: f64) -> Self {
        self.coalesce_window = Some(seconds);
        self
    }

    /// Sets the chunk cap.
    #[must_use]
    pub const fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = Some(max_chunks);
        self
    }

    /// Sets the byte budget.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a negative or non-finite window or a
    /// zero capacity.
    pub fn validate(&self) -> Result<()> {
        if let Some(window) = self.coalesce_window
            && (!window.is_finite() || window < 0.0)
        {
            return Err(Error::Config {
                message: format!(
                    "coalesce window must be a finite, non-negative number, got {window}"
                ),
            });
        }
        if self.max_chunks == Some(0) {
            return Err(Error::Config {
                message: "max_chunks must be > 0".to_string(),
            });
        }
        if self.max_bytes == Some(0) {
            return Err(Error::Config {
                message: "max_bytes must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
