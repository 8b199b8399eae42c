//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::core::{DataMode, DisplayMode, StoreConfig, ViewConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// UART log: replay, render and export UART captures.
///
/// Captures are JSON or NDJSON records of `timestamp`, `direction`
/// (TX/RX) and hex `data`, the same shape a hex-mode JSON export writes.
#[derive(Parser, Debug)]
#[command(name = "uart-log")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that replay a capture.
#[derive(Args, Debug, Clone, Default)]
pub struct ReplayArgs {
    /// Path to the capture file.
    pub capture: PathBuf,

    /// Show payloads as hex instead of ASCII.
    #[arg(long, env = "UART_LOG_HEX")]
    pub hex: bool,

    /// Hide sent data (show received only).
    #[arg(long, env = "UART_LOG_NO_ECHO")]
    pub no_echo: bool,

    /// Merge same-direction transfers arriving within this many milliseconds.
    #[arg(long, env = "UART_LOG_COALESCE_MS")]
    pub coalesce_ms: Option<u64>,

    /// Keep at most this many chunks.
    #[arg(long)]
    pub max_chunks: Option<usize>,

    /// Keep at most this many payload bytes.
    #[arg(long)]
    pub max_bytes: Option<usize>,
}

impl ReplayArgs {
    /// Store policy selected by the flags.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            coalesce_window: self.coalesce_ms.map(|ms| ms as f64 / 1000.0),
            max_chunks: self.max_chunks,
            max_bytes: self.max_bytes,
        }
    }

    /// Display preferences selected by the flags.
    #[must_use]
    pub fn view_config(&self, display_mode: DisplayMode) -> ViewConfig {
        let data_mode = if self.hex {
            DataMode::Hex
        } else {
            DataMode::Ascii
        };
        ViewConfig::default()
            .with_display_mode(display_mode)
            .with_data_mode(data_mode)
            .with_echo(!self.no_echo)
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a capture and print it as a text stream or table.
    Render {
        /// Capture and view options.
        #[command(flatten)]
        replay: ReplayArgs,

        /// One row per chunk with a timestamp label.
        #[arg(long)]
        table: bool,

        /// Format table timestamps in UTC instead of local time.
        #[arg(long)]
        utc: bool,
    },

    /// Replay a capture and export its history.
    Export {
        /// Capture and view options.
        #[command(flatten)]
        replay: ReplayArgs,

        /// Export format (txt, csv, json, xml).
        #[arg(short = 't', long = "to", default_value = "txt")]
        to: String,

        /// Output file path (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show chunk and byte counts for a capture.
    Stats {
        /// Capture and store options.
        #[command(flatten)]
        replay: ReplayArgs,
    },

    /// Render text as it would be sent over the link.
    Encode {
        /// Text to encode.
        text: String,

        /// Show hex instead of ASCII.
        #[arg(long)]
        hex: bool,

        /// Append a line feed, as the send box does with auto-EOL on.
        #[arg(long)]
        eol: bool,

        /// Show a side-by-side hex/ASCII dump.
        #[arg(long)]
        dump: bool,
    },

    /// Decode hex bytes and show them as ASCII.
    Decode {
        /// Whitespace-separated hex bytes.
        hex: String,
    },

    /// List export formats.
    Formats,
}
