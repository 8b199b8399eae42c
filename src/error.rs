//! Error types for UART log operations.
//!
//! This module provides the error hierarchy using `thiserror` for the
//! codec, export, capture I/O, and CLI layers. Buffer and render operations
//! are total and have no error type of their own.

use thiserror::Error;

/// Result type alias for UART log operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Export-related errors.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Byte/text codec errors.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O errors (capture files, output files).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Errors raised while serializing chunk history.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Export attempted with no chunks.
    #[error("no data to export")]
    NoData,

    /// Export requested in a format that is not implemented.
    #[error("export format not implemented: {format}")]
    InvalidFormat {
        /// Name of the rejected format.
        format: String,
    },

    /// A chunk carries a NaN or infinite timestamp.
    #[error("chunk {index} has a non-finite timestamp")]
    InvalidTimestamp {
        /// Zero-based position of the chunk in the export input.
        index: usize,
    },

    /// Serializer failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while decoding text back into bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A token that is not exactly two hex digits.
    #[error("invalid hex byte {token:?} at token {position}")]
    InvalidHex {
        /// The offending token.
        token: String,
        /// Zero-based token index.
        position: usize,
    },
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// A capture record could not be parsed.
    #[error("invalid capture record at line {line}: {reason}")]
    InvalidCapture {
        /// One-based line (or array element) number.
        line: usize,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
