//! I/O utilities for the UART log.
//!
//! Provides capture-file reading (with memory mapping for large files) and
//! export file writing.

pub mod capture;
pub mod reader;

pub use capture::{parse_capture, read_capture};
pub use reader::{FileReader, read_file, write_file};
