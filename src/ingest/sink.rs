//! Display sink interface.
//!
//! The coordinator calls the sink synchronously from the ingest context;
//! marshalling to a display thread is up to the implementation.

use crate::codec::StyledText;
use crate::core::{ByteCounters, UartDataChunk};
use tracing::debug;

/// Receives buffer change notifications.
pub trait DisplaySink: Send {
    /// Called after each stored transfer.
    ///
    /// # Arguments
    ///
    /// * `chunk` - The transfer as received (not the coalesced chunk).
    /// * `counters` - Running byte counters after the append.
    /// * `text` - The text-mode rendering after the append.
    fn on_chunk_appended(
        &mut self,
        chunk: &UartDataChunk,
        counters: ByteCounters,
        text: &StyledText,
    );

    /// Called after the buffer is cleared.
    fn on_buffer_cleared(&mut self);
}

/// Sink that only logs events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl DisplaySink for LoggingSink {
    fn on_chunk_appended(
        &mut self,
        chunk: &UartDataChunk,
        counters: ByteCounters,
        text: &StyledText,
    ) {
        debug!(
            direction = %chunk.direction(),
            bytes = chunk.len(),
            sent = counters.sent,
            received = counters.received,
            rendered = text.len(),
            "chunk appended"
        );
    }

    fn on_buffer_cleared(&mut self) {
        debug!("buffer cleared");
    }
}
