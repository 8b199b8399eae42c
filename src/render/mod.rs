//! Rendering of stored chunks for display.
//!
//! Two layouts are supported:
//!
//! - **Text**: all visible chunks concatenated into one styled stream,
//!   built either in full or one chunk at a time
//! - **Table**: one row per visible chunk with a timestamp label (see
//!   [`table`])
//!
//! Sent chunks are hidden when echo is off. In hex mode consecutive chunks
//! in the stream are separated by a single space, styled like the chunk
//! that follows it.

pub mod table;

pub use table::{
    ClockFormatter, ClockZone, TableRow, TimestampFormatter, render_table, render_table_row,
};

use crate::codec::{self, StyledText};
use crate::core::{DataMode, UartDataChunk, ViewConfig};
use tracing::debug;

/// Renders every visible chunk into a new styled stream.
///
/// # Examples
///
/// ```
/// use uart_log::core::{DataMode, Direction, UartDataChunk, ViewConfig};
/// use uart_log::render::render_full;
///
/// let chunks = vec![
///     UartDataChunk::new(1.0, Direction::Sent, b"AB".to_vec()),
///     UartDataChunk::new(2.0, Direction::Received, vec![0x00, 0xFF]),
/// ];
/// let view = ViewConfig::default().with_data_mode(DataMode::Hex);
/// assert_eq!(render_full(&chunks, &view).plain_text(), "41 42 00 FF");
/// ```
#[must_use]
pub fn render_full(chunks: &[UartDataChunk], view: &ViewConfig) -> StyledText {
    chunks
        .iter()
        .fold(StyledText::new(), |text, chunk| render_incremental(text, chunk, view))
}

/// Appends one chunk's rendering to `existing` and returns it.
///
/// Cost is proportional to the chunk's payload only; earlier content is
/// never re-rendered.
#[must_use]
pub fn render_incremental(
    mut existing: StyledText,
    chunk: &UartDataChunk,
    view: &ViewConfig,
) -> StyledText {
    append_chunk(&mut existing, chunk, view);
    existing
}

/// Appends a chunk in place. Returns false if the chunk is hidden.
fn append_chunk(text: &mut StyledText, chunk: &UartDataChunk, view: &ViewConfig) -> bool {
    if !view.shows(chunk.direction()) {
        return false;
    }
    let style = view.style_for(chunk.direction());
    if view.data_mode == DataMode::Hex && !text.is_empty() && !chunk.is_empty() {
        text.push(" ", style);
    }
    text.append(codec::encode(chunk.payload(), view.data_mode, style));
    true
}

/// Owner of the text-mode accumulator.
///
/// The accumulator is only modified through [`rebuild`](Self::rebuild),
/// [`append`](Self::append) and [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    text: StyledText,
    view: ViewConfig,
}

impl TextRenderer {
    /// Creates an empty renderer for the given preferences.
    #[must_use]
    pub const fn new(view: ViewConfig) -> Self {
        Self {
            text: StyledText::new(),
            view,
        }
    }

    /// Active preferences.
    #[must_use]
    pub const fn view(&self) -> &ViewConfig {
        &self.view
    }

    /// Replaces the preferences and re-renders `chunks` with them.
    pub fn set_view(&mut self, view: ViewConfig, chunks: &[UartDataChunk]) {
        self.view = view;
        self.rebuild(chunks);
    }

    /// Discards the accumulator and renders `chunks` from scratch.
    pub fn rebuild(&mut self, chunks: &[UartDataChunk]) {
        self.text = render_full(chunks, &self.view);
        debug!(chunks = chunks.len(), bytes = self.text.len(), "text view rebuilt");
    }

    /// Appends one chunk. Returns false if the chunk is hidden by the echo
    /// preference.
    pub fn append(&mut self, chunk: &UartDataChunk) -> bool {
        append_chunk(&mut self.text, chunk, &self.view)
    }

    /// Empties the accumulator.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Rendered text.
    #[must_use]
    pub const fn text(&self) -> &StyledText {
        &self.text
    }
}
