//! CLI layer for the UART log.
//!
//! Replays capture files through the ingest coordinator and prints the
//! text stream, the table view, statistics, or an export.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, ReplayArgs};
