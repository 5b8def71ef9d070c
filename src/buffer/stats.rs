//! Buffer pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the buffer pool.
///
/// All fields are atomic so the pool can bump them without extra locking.
/// `Ordering::Relaxed` is enough: counters are independent and only need to
/// be eventually consistent.
///
/// # Example
/// ```
/// use blockpool::BufferPoolStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = BufferPoolStats::new();
/// stats.hits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Pins satisfied by a buffer already holding the block.
    pub hits: AtomicU64,

    /// Pins that had to load the block into an evicted buffer.
    pub misses: AtomicU64,

    /// Buffers reassigned from one block to another.
    pub evictions: AtomicU64,

    /// Blocks read from the block store.
    pub blocks_read: AtomicU64,

    /// Dirty buffers written to the block store.
    pub blocks_written: AtomicU64,

    /// Times a pin had to wait for an unpin.
    pub pin_waits: AtomicU64,

    /// Pins that gave up at the deadline.
    pub pin_timeouts: AtomicU64,
}

impl BufferPoolStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// Non-atomic copy for display and assertions.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            blocks_read: self.blocks_read.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            pin_waits: self.pin_waits.load(Ordering::Relaxed),
            pin_timeouts: self.pin_timeouts.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.evictions,
            &self.blocks_read,
            &self.blocks_written,
            &self.pin_waits,
            &self.pin_timeouts,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub blocks_read: u64,
    pub blocks_written: u64,
    pub pin_waits: u64,
    pub pin_timeouts: u64,
}

impl StatsSnapshot {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, waits: {}, timeouts: {}, hit_rate: {:.2}% }}",
            self.hits,
            self.misses,
            self.evictions,
            self.blocks_read,
            self.blocks_written,
            self.pin_waits,
            self.pin_timeouts,
            self.hit_rate() * 100.0
        )
    }
}
