//! Ingest coordination.
//!
//! The [`IngestCoordinator`] is the single entry point for bytes moving
//! over the link. It writes to the shared chunk store, keeps the text-mode
//! rendering current, and notifies the attached [`DisplaySink`].

pub mod sink;

pub use sink::{DisplaySink, LoggingSink};

use crate::codec::StyledText;
use crate::core::{
    AppendOutcome, ByteCounters, ChunkFilter, ChunkStore, DisplayMode, Direction,
    SharedChunkStore, StoreConfig, ViewConfig,
};
use crate::error::Result;
use crate::export::{ExportFormat, export};
use crate::render::{TableRow, TextRenderer, TimestampFormatter, render_table};
use tracing::{debug, trace, warn};

/// Line terminator appended by [`IngestCoordinator::send_text`].
pub const EOL: &str = "\n";

/// Routes transfers into the store and out to the display.
///
/// # Examples
///
/// ```
/// use uart_log::core::{Direction, StoreConfig, ViewConfig};
/// use uart_log::ingest::{IngestCoordinator, LoggingSink};
///
/// let mut coordinator =
///     IngestCoordinator::new(StoreConfig::default(), ViewConfig::default()).unwrap();
/// coordinator.attach_sink(Box::new(LoggingSink));
///
/// coordinator.send_text("AT", true, 1.0);
/// coordinator.on_bytes_transferred(Direction::Received, b"OK\n", 1.1);
///
/// assert_eq!(coordinator.rendered_text().plain_text(), "AT\nOK\n");
/// assert_eq!(coordinator.counters().total(), 6);
/// ```
pub struct IngestCoordinator {
    store: SharedChunkStore,
    renderer: TextRenderer,
    sink: Option<Box<dyn DisplaySink>>,
    buffering_enabled: bool,
}

impl IngestCoordinator {
    /// Creates a coordinator over a new store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store configuration is invalid.
    pub fn new(store_config: StoreConfig, view: ViewConfig) -> Result<Self> {
        let store = SharedChunkStore::new(ChunkStore::new(store_config)?);
        Ok(Self::with_store(store, view))
    }

    /// Creates a coordinator over an existing shared store.
    #[must_use]
    pub fn with_store(store: SharedChunkStore, view: ViewConfig) -> Self {
        Self {
            store,
            renderer: TextRenderer::new(view),
            sink: None,
            buffering_enabled: true,
        }
    }

    /// Handle to the shared store, for readers on other threads.
    #[must_use]
    pub const fn store(&self) -> &SharedChunkStore {
        &self.store
    }

    /// Active display preferences.
    #[must_use]
    pub const fn view(&self) -> &ViewConfig {
        self.renderer.view()
    }

    /// Replaces the display preferences, re-rendering if a sink is attached.
    pub fn set_view(&mut self, view: ViewConfig) {
        let chunks = if self.sink.is_some() {
            self.store.snapshot(ChunkFilter::All)
        } else {
            Vec::new()
        };
        self.renderer.set_view(view, &chunks);
    }

    /// Attaches a display sink and renders the current history for it.
    pub fn attach_sink(&mut self, sink: Box<dyn DisplaySink>) {
        self.sink = Some(sink);
        let chunks = self.store.snapshot(ChunkFilter::All);
        self.renderer.rebuild(&chunks);
    }

    /// Detaches the display sink. Rendering stops until a sink is attached.
    pub fn detach_sink(&mut self) -> Option<Box<dyn DisplaySink>> {
        self.renderer.clear();
        self.sink.take()
    }

    /// Returns true if a sink is attached.
    #[must_use]
    pub const fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Enables or disables buffering. While disabled, transfers are dropped.
    pub fn set_buffering_enabled(&mut self, enabled: bool) {
        debug!(enabled, "buffering toggled");
        self.buffering_enabled = enabled;
    }

    /// Returns true if transfers are being stored.
    #[must_use]
    pub const fn is_buffering_enabled(&self) -> bool {
        self.buffering_enabled
    }

    /// Records a transfer reported by the transport.
    ///
    /// Returns `None` when buffering is disabled or the timestamp is not
    /// finite; nothing is stored or queued in that case.
    pub fn on_bytes_transferred(
        &mut self,
        direction: Direction,
        bytes: &[u8],
        timestamp: f64,
    ) -> Option<AppendOutcome> {
        if !self.buffering_enabled {
            trace!(%direction, bytes = bytes.len(), "buffering disabled, transfer dropped");
            return None;
        }
        if !timestamp.is_finite() {
            warn!(
                %direction,
                bytes = bytes.len(),
                timestamp,
                "non-finite timestamp, transfer dropped"
            );
            return None;
        }

        let outcome = self.store.append(direction, bytes, timestamp);

        if let Some(sink) = self.sink.as_mut() {
            if outcome.evicted > 0 {
                // Evicted chunks may still be in the accumulator.
                let chunks = self.store.snapshot(ChunkFilter::All);
                self.renderer.rebuild(&chunks);
            } else if self.renderer.view().display_mode == DisplayMode::Text {
                self.renderer.append(&outcome.delta);
            }
            sink.on_chunk_appended(&outcome.delta, outcome.counters, self.renderer.text());
        }
        Some(outcome)
    }

    /// Records text typed by the user as a sent transfer.
    ///
    /// Appends [`EOL`] when `add_eol` is set and returns the bytes the
    /// transport should write.
    pub fn send_text(&mut self, text: &str, add_eol: bool, timestamp: f64) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        if add_eol {
            bytes.extend_from_slice(EOL.as_bytes());
        }
        self.on_bytes_transferred(Direction::Sent, &bytes, timestamp);
        bytes
    }

    /// Clears the store and the rendering, then notifies the sink.
    pub fn clear(&mut self) {
        self.store.clear();
        self.renderer.clear();
        if let Some(sink) = self.sink.as_mut() {
            sink.on_buffer_cleared();
        }
    }

    /// Running byte counters.
    #[must_use]
    pub fn counters(&self) -> ByteCounters {
        self.store.counters()
    }

    /// Current text-mode rendering. Empty while no sink is attached.
    #[must_use]
    pub const fn rendered_text(&self) -> &StyledText {
        self.renderer.text()
    }

    /// Table rows for the current history and preferences.
    #[must_use]
    pub fn table_rows(&self, formatter: &dyn TimestampFormatter) -> Vec<TableRow> {
        let chunks = self.store.snapshot(ChunkFilter::All);
        render_table(&chunks, self.view(), formatter)
    }

    /// Exports the history passing `filter`.
    ///
    /// # Errors
    ///
    /// See [`export`].
    pub fn export(&self, format: ExportFormat, filter: ChunkFilter) -> Result<String> {
        let chunks = self.store.snapshot(filter);
        export(&chunks, format, self.view().data_mode)
    }
}
