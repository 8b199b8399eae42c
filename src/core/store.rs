//! Append-only chunk log with running byte counters.
//!
//! The store keeps chunks in insertion order, optionally merges
//! fragmented transfers of the same direction, and optionally caps the
//! retained history (oldest chunks are evicted first).

use crate::core::chunk::{Direction, UartDataChunk};
use crate::core::config::StoreConfig;
use crate::error::Result;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Running byte totals per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ByteCounters {
    /// Bytes sent to the peripheral.
    pub sent: usize,
    /// Bytes received from the peripheral.
    pub received: usize,
}

impl ByteCounters {
    /// Total bytes in both directions.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.sent + self.received
    }

    /// Bytes counted for a direction.
    #[must_use]
    pub const fn for_direction(&self, direction: Direction) -> usize {
        match direction {
            Direction::Sent => self.sent,
            Direction::Received => self.received,
        }
    }

    const fn add(&mut self, direction: Direction, bytes: usize) {
        match direction {
            Direction::Sent => self.sent += bytes,
            Direction::Received => self.received += bytes,
        }
    }

    const fn remove(&mut self, direction: Direction, bytes: usize) {
        match direction {
            Direction::Sent => self.sent = self.sent.saturating_sub(bytes),
            Direction::Received => self.received = self.received.saturating_sub(bytes),
        }
    }
}

impl fmt::Display for ByteCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sent: {} bytes     Received: {} bytes",
            self.sent, self.received
        )
    }
}

/// Selects which chunks a snapshot returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkFilter {
    /// Every chunk.
    #[default]
    All,
    /// Only chunks of one direction.
    Only(Direction),
}

impl ChunkFilter {
    /// Filter matching the echo preference: everything when echo is on,
    /// received chunks only when it is off.
    #[must_use]
    pub const fn for_echo(show_echo: bool) -> Self {
        if show_echo {
            Self::All
        } else {
            Self::Only(Direction::Received)
        }
    }

    /// Returns true if the chunk passes the filter.
    #[must_use]
    pub fn matches(self, chunk: &UartDataChunk) -> bool {
        match self {
            Self::All => true,
            Self::Only(direction) => chunk.direction() == direction,
        }
    }
}

/// What happened on a single append.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    /// The transfer as received: its own timestamp, direction and bytes.
    pub delta: UartDataChunk,
    /// Whether the bytes were merged into the previous chunk.
    pub merged: bool,
    /// Number of chunks evicted by the capacity policy.
    pub evicted: usize,
    /// Counters after the append.
    pub counters: ByteCounters,
}

/// Ordered log of directioned byte chunks.
///
/// # Examples
///
/// ```
/// use uart_log::core::{ChunkFilter, ChunkStore, Direction};
///
/// let mut store = ChunkStore::default();
/// store.append(Direction::Sent, b"AT\r\n", 1.0);
/// store.append(Direction::Received, b"OK\r\n", 1.2);
///
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.counters().total(), 8);
/// assert_eq!(store.snapshot(ChunkFilter::Only(Direction::Received)).len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: VecDeque<UartDataChunk>,
    counters: ByteCounters,
    config: StoreConfig,
    last_arrival: Option<f64>,
}

impl ChunkStore {
    /// Creates an empty store with the given policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Replaces the policy and applies the new capacity immediately.
    ///
    /// Returns the number of chunks evicted.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid; the store is left
    /// unchanged in that case.
    pub fn set_config(&mut self, config: StoreConfig) -> Result<usize> {
        config.validate()?;
        self.config = config;
        Ok(self.enforce_capacity())
    }

    /// Appends a transfer.
    ///
    /// When coalescing is enabled and the previous chunk has the same
    /// direction and arrived no more than the window earlier, the bytes are
    /// appended to that chunk, which keeps its original timestamp. A merge
    /// that would grow the chunk past `max_bytes` starts a new chunk instead.
    pub fn append(
        &mut self,
        direction: Direction,
        payload: &[u8],
        timestamp: f64,
    ) -> AppendOutcome {
        let merged = self.should_coalesce(direction, payload.len(), timestamp);

        if merged && let Some(last) = self.chunks.back_mut() {
            last.extend_payload(payload);
        } else {
            self.chunks
                .push_back(UartDataChunk::new(timestamp, direction, payload.to_vec()));
        }
        self.counters.add(direction, payload.len());
        self.last_arrival = Some(timestamp);

        let evicted = self.enforce_capacity();
        trace!(
            %direction,
            bytes = payload.len(),
            merged,
            chunks = self.chunks.len(),
            "chunk appended"
        );

        AppendOutcome {
            delta: UartDataChunk::new(timestamp, direction, payload.to_vec()),
            merged,
            evicted,
            counters: self.counters,
        }
    }

    /// Returns a copy of the chunks passing `filter`, in insertion order.
    #[must_use]
    pub fn snapshot(&self, filter: ChunkFilter) -> Vec<UartDataChunk> {
        self.chunks
            .iter()
            .filter(|chunk| filter.matches(chunk))
            .cloned()
            .collect()
    }

    /// Removes every chunk and zeroes the counters.
    pub fn clear(&mut self) {
        debug!(chunks = self.chunks.len(), "clearing chunk store");
        self.chunks.clear();
        self.counters = ByteCounters::default();
        self.last_arrival = None;
    }

    /// Running byte counters.
    #[must_use]
    pub const fn counters(&self) -> ByteCounters {
        self.counters
    }

    /// Number of stored chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if no chunks are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn should_coalesce(&self, direction: Direction, bytes: usize, timestamp: f64) -> bool {
        let (Some(window), Some(previous), Some(last)) =
            (self.config.coalesce_window, self.last_arrival, self.chunks.back())
        else {
            return false;
        };
        let gap = timestamp - previous;
        let fits = self
            .config
            .max_bytes
            .is_none_or(|max| last.len() + bytes <= max);
        last.direction() == direction && gap >= 0.0 && gap <= window && fits
    }

    /// Evicts oldest chunks until the policy holds. The newest chunk is
    /// always kept, even if it alone exceeds the byte budget.
    fn enforce_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.chunks.len() > 1 && self.over_capacity() {
            if let Some(oldest) = self.chunks.pop_front() {
                self.counters.remove(oldest.direction(), oldest.len());
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, retained = self.chunks.len(), "evicted oldest chunks");
        }
        evicted
    }

    fn over_capacity(&self) -> bool {
        let too_many = self
            .config
            .max_chunks
            .is_some_and(|max| self.chunks.len() > max);
        let too_big = self
            .config
            .max_bytes
            .is_some_and(|max| self.counters.total() > max);
        too_many || too_big
    }
}

/// Thread-safe handle to a [`ChunkStore`].
///
/// One lock guards append, snapshot and clear, so readers never observe a
/// partially appended chunk.
#[derive(Debug, Clone, Default)]
pub struct SharedChunkStore {
    inner: Arc<Mutex<ChunkStore>>,
}

impl SharedChunkStore {
    /// Wraps a store.
    #[must_use]
    pub fn new(store: ChunkStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Locks the store.
    ///
    /// A poisoned lock is recovered: every store operation restores its
    /// invariants before returning.
    pub fn lock(&self) -> MutexGuard<'_, ChunkStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends under the lock.
    pub fn append(&self, direction: Direction, payload: &[u8], timestamp: f64) -> AppendOutcome {
        self.lock().append(direction, payload, timestamp)
    }

    /// Snapshot under the lock.
    #[must_use]
    pub fn snapshot(&self, filter: ChunkFilter) -> Vec<UartDataChunk> {
        self.lock().snapshot(filter)
    }

    /// Clears under the lock.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Counters under the lock.
    #[must_use]
    pub fn counters(&self) -> ByteCounters {
        self.lock().counters()
    }

    /// Chunk count under the lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_of_payloads(store: &ChunkStore) -> usize {
        store.snapshot(ChunkFilter::All).iter().map(UartDataChunk::len).sum()
    }

    #[test]
    fn test_append_updates_counters() {
        let mut store = ChunkStore::default();
        store.append(Direction::Sent, b"hello", 1.0);
        store.append(Direction::Received, b"hi", 2.0);
        store.append(Direction::Sent, b"", 3.0);

        let counters = store.counters();
        assert_eq!(counters.sent, 5);
        assert_eq!(counters.received, 2);
        assert_eq!(counters.total(), sum_of_payloads(&store));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_snapshot_preserves_insertion_order_on_tied_timestamps() {
        let mut store = ChunkStore::default();
        store.append(Direction::Received, b"a", 1.0);
        store.append(Direction::Received, b"b", 1.0);
        store.append(Direction::Sent, b"c", 1.0);

        let payloads: Vec<_> = store
            .snapshot(ChunkFilter::All)
            .iter()
            .map(|c| c.payload().to_vec())
            .collect();
        assert_eq!(payloads, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_snapshot_filter() {
        let mut store = ChunkStore::default();
        for i in 0..5u8 {
            let direction = if i % 2 == 0 {
                Direction::Sent
            } else {
                Direction::Received
            };
            store.append(direction, &[i], f64::from(i));
        }

        let rx = store.snapshot(ChunkFilter::for_echo(false));
        assert_eq!(rx.len(), 2);
        assert_eq!(rx[0].payload(), &[1]);
        assert_eq!(rx[1].payload(), &[3]);
        assert_eq!(store.snapshot(ChunkFilter::for_echo(true)).len(), 5);
        assert_eq!(store.snapshot(ChunkFilter::Only(Direction::Sent)).len(), 3);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = ChunkStore::default();
        store.append(Direction::Received, b"one", 1.0);
        let before = store.snapshot(ChunkFilter::All);
        store.append(Direction::Received, b"two", 2.0);
        assert_eq!(before.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut store = ChunkStore::new(StoreConfig::default().with_coalesce_window(1.0)).unwrap();
        store.append(Direction::Received, b"abc", 1.0);
        store.clear();

        assert!(store.is_empty());
        assert!(store.snapshot(ChunkFilter::All).is_empty());
        assert_eq!(store.counters(), ByteCounters::default());

        // No merge into a chunk from before the clear
        let outcome = store.append(Direction::Received, b"d", 1.1);
        assert!(!outcome.merged);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_coalescing_merges_within_window() {
        let config = StoreConfig::default().with_coalesce_window(0.1);
        let mut store = ChunkStore::new(config).unwrap();

        store.append(Direction::Received, b"he", 1.00);
        let outcome = store.append(Direction::Received, b"llo", 1.05);
        assert!(outcome.merged);
        assert_eq!(outcome.delta.payload(), b"llo");
        // Gap measured from the previous arrival, not the chunk start
        assert!(store.append(Direction::Received, b"!", 1.14).merged);

        let chunks = store.snapshot(ChunkFilter::All);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].payload(), b"hello!");
        assert!((chunks[0].timestamp() - 1.0).abs() < f64::EPSILON);
        assert_eq!(store.counters().received, 6);
    }

    #[test]
    fn test_coalescing_respects_direction_and_window() {
        let config = StoreConfig::default().with_coalesce_window(0.1);
        let mut store = ChunkStore::new(config).unwrap();

        store.append(Direction::Received, b"a", 1.0);
        assert!(!store.append(Direction::Sent, b"b", 1.01).merged);
        assert!(!store.append(Direction::Received, b"c", 1.02).merged);
        assert!(!store.append(Direction::Received, b"d", 5.0).merged);
        // Out-of-order timestamps never merge
        assert!(!store.append(Direction::Received, b"e", 4.99).merged);

        let directions: Vec<_> = store
            .snapshot(ChunkFilter::All)
            .iter()
            .map(UartDataChunk::direction)
            .collect();
        assert_eq!(
            directions,
            vec![
                Direction::Received,
                Direction::Sent,
                Direction::Received,
                Direction::Received,
                Direction::Received,
            ]
        );
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = ChunkStore::new(StoreConfig::default().with_max_chunks(3)).unwrap();
        for i in 1..=4u8 {
            store.append(Direction::Received, &[i; 2], f64::from(i));
        }

        let chunks = store.snapshot(ChunkFilter::All);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].payload(), &[2, 2]);
        assert_eq!(chunks[2].payload(), &[4, 4]);
        assert_eq!(store.counters().received, 6);
    }

    #[test]
    fn test_byte_budget_keeps_newest() {
        let mut store = ChunkStore::new(StoreConfig::default().with_max_bytes(4)).unwrap();
        store.append(Direction::Sent, b"ab", 1.0);
        store.append(Direction::Received, b"cd", 2.0);
        let outcome = store.append(Direction::Received, b"efghij", 3.0);

        assert_eq!(outcome.evicted, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.counters(), ByteCounters { sent: 0, received: 6 });
    }

    #[test]
    fn test_coalescing_stays_within_byte_budget() {
        let config = StoreConfig::default()
            .with_coalesce_window(1.0)
            .with_max_bytes(8);
        let mut store = ChunkStore::new(config).unwrap();

        for i in 0..100u8 {
            store.append(Direction::Received, b"x", f64::from(i) * 0.01);
            assert!(store.counters().total() <= 8);
        }

        // 100 = 12 full chunks of 8 plus a 4-byte tail; each full chunk is
        // evicted once the next byte starts a new one.
        assert_eq!(store.len(), 1);
        assert_eq!(store.counters().total(), 4);
        assert_eq!(store.counters().total(), sum_of_payloads(&store));
    }

    #[test]
    fn test_set_config_applies_capacity() {
        let mut store = ChunkStore::default();
        for i in 0..10u8 {
            store.append(Direction::Received, &[i], f64::from(i));
        }
        let evicted = store
            .set_config(StoreConfig::default().with_max_chunks(4))
            .unwrap();
        assert_eq!(evicted, 6);
        assert_eq!(store.len(), 4);
        assert_eq!(store.counters().total(), sum_of_payloads(&store));

        assert!(store.set_config(StoreConfig::default().with_max_chunks(0)).is_err());
        assert_eq!(store.config().max_chunks, Some(4));
    }

    #[test]
    fn test_counters_display() {
        let counters = ByteCounters {
            sent: 12,
            received: 345,
        };
        assert_eq!(counters.to_string(), "Sent: 12 bytes     Received: 345 bytes");
        assert_eq!(counters.for_direction(Direction::Received), 345);
    }

    #[test]
    fn test_shared_store_across_threads() {
        let shared = SharedChunkStore::default();
        let writer = shared.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..100u8 {
                writer.append(Direction::Received, &[i, i], f64::from(i));
            }
        });
        for _ in 0..50 {
            let snapshot = shared.snapshot(ChunkFilter::All);
            assert!(snapshot.iter().all(|chunk| chunk.len() == 2));
        }
        handle.join().unwrap();

        assert_eq!(shared.len(), 100);
        assert_eq!(shared.counters().received, 200);
        shared.clear();
        assert!(shared.is_empty());
    }
}
