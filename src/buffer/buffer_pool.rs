//! Buffer Pool - multiplexes a fixed set of buffers over disk blocks.
//!
//! The [`BufferPool`] provides:
//! - At most one in-memory buffer per block
//! - Pin-based reservation with bounded waiting
//! - LRU eviction of unpinned buffers, flushing dirty ones first
//! - Per-transaction flush for commit

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, trace, warn};
use parking_lot::{Condvar, Mutex};

use crate::buffer::replacer::LruReplacer;
use crate::buffer::{Buffer, BufferPoolStats, PinnedBuffer, PoolStatus};
use crate::common::{BlockId, BufferId, BufferPoolConfig, Error, Result, TxnId};
use crate::recovery::WriteAheadLog;
use crate::storage::BlockStore;

/// Manages a fixed pool of buffers for caching disk blocks.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                        BufferPool                           │
/// │  ┌────────────────── Mutex<PoolState> ─────────────────┐    │
/// │  │ ┌───────────────┐        ┌───────────────────────┐  │    │
/// │  │ │   resident    │        │  replacer (LRU queue) │  │    │
/// │  │ │BlockId → BufId│        │  unpinned buffers     │  │    │
/// │  │ └───────┬───────┘        └───────────┬───────────┘  │    │
/// │  └─────────┼────────────────────────────┼──────────────┘    │
/// │            ▼                            ▼                   │
/// │        buffers: Vec<Buffer>  [Buf0] [Buf1] [Buf2] ...       │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
/// │  │  unpinned    │  │ block store  │  │     log      │       │
/// │  │   Condvar    │  │ dyn BlockSt. │  │ dyn WAL      │       │
/// │  └──────────────┘  └──────────────┘  └──────────────┘       │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// One pool-wide `Mutex` guards `resident`, the LRU queue and every pin count
/// change. `pin`, `unpin`, `available` and `status` hold it for their whole
/// duration, so choosing a victim, removing it from the queue and pinning it
/// happen as one step. `flush_all` and `flush_dirty` hold it only while
/// collecting dirty buffers. `pin` waits on the `unpinned` condition,
/// which every unpin that frees a buffer broadcasts.
///
/// # Known Limitations
/// - Waiters are not served in arrival order. A fresh `pin` can take a buffer
///   that was just freed ahead of a caller that has been waiting longer.
/// - A block is pinned by one holder at a time. Pinning a block you already
///   hold blocks until the timeout.
/// - Do not hold an image guard from a [`PinnedBuffer`] while calling
///   `flush_all` or `flush_dirty` on the same thread: they may need that image.
///
/// # Usage
/// ```
/// use std::sync::Arc;
/// use blockpool::{BlockId, BufferPool, BufferPoolConfig, MemoryBlockStore, MemoryLog, TxnId};
///
/// let config = BufferPoolConfig::default().with_pool_size(4).with_block_size(400);
/// let store = Arc::new(MemoryBlockStore::new(400));
/// let pool = BufferPool::new(config, store, Arc::new(MemoryLog::new()));
///
/// let block = BlockId::new("students.tbl", 0);
/// let pinned = pool.pin(&block).unwrap();
/// pinned.image_mut().write_int(80, 42).unwrap();
/// pinned.set_modified(TxnId(1), None);
/// pool.unpin(pinned);
///
/// pool.flush_all(TxnId(1)).unwrap();
/// assert_eq!(pool.available(), 4);
/// ```
pub struct BufferPool {
    /// Fixed pool of buffers allocated at startup.
    buffers: Vec<Buffer>,

    /// Residency map and eviction queue.
    state: Mutex<PoolState>,

    /// Signalled whenever a buffer's pin count drops to 0.
    unpinned: Condvar,

    store: Arc<dyn BlockStore>,

    log: Arc<dyn WriteAheadLog>,

    config: BufferPoolConfig,

    stats: BufferPoolStats,
}

struct PoolState {
    /// Block → buffer currently holding it. At most one entry per block.
    resident: HashMap<BlockId, BufferId>,

    /// Exactly the buffers with pin count 0.
    replacer: LruReplacer,
}

impl BufferPool {
    /// Create a new buffer pool.
    ///
    /// All buffers start empty and unpinned.
    ///
    /// # Panics
    /// Panics if `config.pool_size` is 0 or if `store` uses a different
    /// block size than `config.block_size`.
    pub fn new(
        config: BufferPoolConfig,
        store: Arc<dyn BlockStore>,
        log: Arc<dyn WriteAheadLog>,
    ) -> Self {
        assert!(config.pool_size > 0, "pool_size must be > 0");
        assert_eq!(
            store.block_size(),
            config.block_size,
            "block store and pool disagree on block size"
        );

        let buffers: Vec<Buffer> = (0..config.pool_size)
            .map(|i| Buffer::new(BufferId::new(i), config.block_size))
            .collect();

        info!(
            "buffer pool: {} buffers of {} bytes, pin timeout {:?}",
            config.pool_size, config.block_size, config.pin_timeout
        );

        Self {
            buffers,
            state: Mutex::new(PoolState {
                resident: HashMap::with_capacity(config.pool_size),
                replacer: LruReplacer::with_buffers(config.pool_size),
            }),
            unpinned: Condvar::new(),
            store,
            log,
            config,
            stats: BufferPoolStats::new(),
        }
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a buffer to `block`, waiting up to the configured timeout.
    ///
    /// If the block is resident and unpinned, its buffer is reused without
    /// touching the block store. Otherwise the least recently unpinned buffer
    /// is flushed if dirty and loaded with `block`. If neither is possible
    /// (every buffer pinned, or `block` itself pinned by someone else) the
    /// call waits for an unpin and retries.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if nothing became available before the deadline
    /// - I/O errors from flushing the victim or reading `block`
    pub fn pin(&self, block: &BlockId) -> Result<PinnedBuffer<'_>> {
        let start = Instant::now();
        // A timeout too large to represent as an Instant means wait forever.
        let deadline = start.checked_add(self.config.pin_timeout);
        let mut waited = false;

        let mut state = self.state.lock();
        loop {
            if let Some(buffer) = self.try_to_pin(&mut state, block)? {
                return Ok(PinnedBuffer::new(self, buffer, block.clone()));
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break;
            }

            if !waited {
                waited = true;
                self.stats.pin_waits.fetch_add(1, Ordering::Relaxed);
                debug!("no buffer free for {}, waiting", block);
            }

            // Deadline is absolute, so spurious wakeups don't extend it.
            match deadline {
                Some(deadline) => {
                    self.unpinned.wait_until(&mut state, deadline);
                }
                None => self.unpinned.wait(&mut state),
            }
        }

        let waited = start.elapsed();
        self.stats.pin_timeouts.fetch_add(1, Ordering::Relaxed);
        warn!("gave up pinning {} after {:?}", block, waited);

        Err(Error::PoolExhausted {
            block: block.clone(),
            waited,
        })
    }

    /// Release a pin. Same as dropping the handle.
    ///
    /// When the pin count reaches 0 the buffer joins the back of the LRU queue
    /// and every waiting `pin` is woken.
    pub fn unpin(&self, pinned: PinnedBuffer<'_>) {
        drop(pinned);
    }

    // ========================================================================
    // Public API: Flush
    // ========================================================================

    /// Flush every buffer whose pending modification belongs to `txn`.
    ///
    /// Buffers dirtied by other transactions are left alone. The pool lock is
    /// released before any buffer is written, so pins and unpins on other
    /// threads proceed while the flush waits on a busy image.
    ///
    /// The calling thread must not hold an image guard of a buffer dirtied by
    /// `txn`: the flush takes that image's read lock and would wait on itself.
    ///
    /// # Errors
    /// I/O errors from the log or the block store. Buffers flushed before the
    /// error stay flushed.
    pub fn flush_all(&self, txn: TxnId) -> Result<()> {
        for buffer in self.dirty_buffers() {
            if buffer.flush_if_modified_by(txn, self.store.as_ref(), self.log.as_ref())? {
                self.stats.blocks_written.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Flush every dirty buffer regardless of transaction.
    ///
    /// Same locking rules as [`flush_all`](Self::flush_all).
    pub fn flush_dirty(&self) -> Result<()> {
        for buffer in self.dirty_buffers() {
            self.flush_buffer(buffer)?;
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Number of unpinned buffers.
    pub fn available(&self) -> usize {
        self.state.lock().replacer.len()
    }

    /// Pin count of the buffer holding `block`, or None if not resident.
    pub fn pin_count(&self, block: &BlockId) -> Option<u32> {
        let state = self.state.lock();
        state
            .resident
            .get(block)
            .map(|id| self.buffers[id.0].pin_count())
    }

    /// Number of blocks currently held in buffers.
    pub fn resident_count(&self) -> usize {
        self.state.lock().resident.len()
    }

    pub fn pool_size(&self) -> usize {
        self.buffers.len()
    }

    pub fn config(&self) -> &BufferPoolConfig {
        &self.config
    }

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Snapshot resident blocks and the LRU order, for diagnostics.
    ///
    /// Does not change any state.
    pub fn status(&self) -> PoolStatus {
        let state = self.state.lock();

        let mut resident: Vec<_> = state
            .resident
            .iter()
            .map(|(block, &id)| (id, block.clone(), self.buffers[id.0].pin_count()))
            .collect();
        resident.sort_by_key(|(id, _, _)| *id);

        let lru = state
            .replacer
            .iter()
            .map(|id| (id, self.buffers[id.0].block()))
            .collect();

        PoolStatus {
            resident,
            lru,
            stats: self.stats.snapshot(),
        }
    }

    // ========================================================================
    // Internal: Called by PinnedBuffer on drop
    // ========================================================================

    pub(crate) fn unpin_internal(&self, buffer: &Buffer) {
        let mut state = self.state.lock();
        if buffer.unpin() == 0 {
            state.replacer.unpinned(buffer.id());
            self.unpinned.notify_all();
        }
    }

    // ========================================================================
    // Internal: Pin attempt
    // ========================================================================

    /// One pin attempt under the pool lock. `Ok(None)` means "wait and retry".
    fn try_to_pin(&self, state: &mut PoolState, block: &BlockId) -> Result<Option<&Buffer>> {
        if let Some(&id) = state.resident.get(block) {
            let buffer = &self.buffers[id.0];
            if buffer.is_pinned() {
                trace!("{} holding {} is pinned", id, block);
                return Ok(None);
            }

            state.replacer.remove(id);
            buffer.pin();
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            trace!("hit {} in {}", block, id);
            return Ok(Some(buffer));
        }

        let Some(id) = state.replacer.evict() else {
            return Ok(None);
        };
        self.load_into(state, id, block)?;

        let buffer = &self.buffers[id.0];
        buffer.pin();
        Ok(Some(buffer))
    }

    /// Reassign victim `id` to `block`, keeping `resident` in step.
    fn load_into(&self, state: &mut PoolState, id: BufferId, block: &BlockId) -> Result<()> {
        let buffer = &self.buffers[id.0];
        let old = buffer.block();
        let was_dirty = buffer.is_dirty();

        let result = buffer.assign_to_block(block.clone(), self.store.as_ref(), self.log.as_ref());
        if was_dirty && !buffer.is_dirty() {
            self.stats.blocks_written.fetch_add(1, Ordering::Relaxed);
        }

        if let Err(e) = result {
            // A failed flush leaves the old block loaded; a failed read empties the buffer.
            if let (Some(old), None) = (&old, buffer.block()) {
                state.resident.remove(old);
            }
            state.replacer.reinstate(id);
            warn!("could not load {} into {}: {}", block, id, e);
            return Err(e);
        }

        if let Some(old) = old {
            state.resident.remove(&old);
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            debug!("evicted {} from {} for {}", old, id, block);
        }
        state.resident.insert(block.clone(), id);

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        self.stats.blocks_read.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Resident buffers that were dirty when the pool lock was held.
    ///
    /// A buffer may be flushed or reassigned once the lock is dropped, so
    /// callers flush through `Buffer`, which rechecks under its own locks.
    fn dirty_buffers(&self) -> Vec<&Buffer> {
        let state = self.state.lock();
        state
            .resident
            .values()
            .map(|id| &self.buffers[id.0])
            .filter(|buffer| buffer.is_dirty())
            .collect()
    }

    fn flush_buffer(&self, buffer: &Buffer) -> Result<()> {
        if buffer.flush(self.store.as_ref(), self.log.as_ref())? {
            self.stats.blocks_written.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}
