//! # UART log
//!
//! Data log for a serial (UART) link: every transfer in either direction
//! is recorded with a timestamp, shown as ASCII or hex in a text stream or
//! a table, and exported as plain text, CSV, or JSON.
//!
//! ## Features
//!
//! - **Chunk store**: Ordered history with byte counters, optional
//!   coalescing, and capacity limits
//! - **Codec**: ASCII and hex renderings of arbitrary bytes
//! - **Incremental rendering**: Text stream kept in step with the store
//! - **Export**: Plain text, CSV, and JSON snapshots of the history
//! - **Capture replay**: JSON/NDJSON captures, memory-mapped when large

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod cli;
pub mod codec;
pub mod core;
pub mod error;
pub mod export;
pub mod ingest;
pub mod io;
pub mod render;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use crate::core::{
    ByteCounters, ChunkFilter, ChunkStore, DataMode, Direction, DisplayMode, SharedChunkStore,
    StoreConfig, TextStyle, UartDataChunk, ViewConfig,
};

// Re-export codec and rendering types
pub use codec::{StyledText, decode_hex, encode, to_text};
pub use render::{ClockFormatter, TableRow, TextRenderer, render_full, render_incremental};

// Re-export export and ingest types
pub use export::{ExportFormat, export};
pub use ingest::{DisplaySink, IngestCoordinator, LoggingSink};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
