//! Core domain models for the UART log.
//!
//! This module contains the chunk type, the chunk store, and the explicit
//! configuration values. These are pure domain models with no I/O
//! dependencies.

pub mod chunk;
pub mod config;
pub mod store;

pub use chunk::{Direction, UartDataChunk};
pub use config::{DataMode, DisplayMode, FontWeight, Rgb, StoreConfig, TextStyle, ViewConfig};
pub use store::{AppendOutcome, ByteCounters, ChunkFilter, ChunkStore, SharedChunkStore};
