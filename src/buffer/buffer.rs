//! Buffer - a slot in the buffer pool.
//!
//! A [`Buffer`] owns one [`BlockImage`] for its whole life plus the metadata
//! the pool needs to manage it:
//! - Which block is loaded (if any)
//! - Pin count
//! - Modifying transaction and LSN, which together make it dirty

use log::debug;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{BlockId, BufferId, Lsn, Result, TxnId};
use crate::recovery::WriteAheadLog;
use crate::storage::{BlockImage, BlockStore};

/// A buffer in the pool.
///
/// Buffers are created once, when the pool starts, with an empty image and no
/// block. The pool reassigns them to different blocks many times; a buffer is
/// only reassigned while its pin count is zero.
///
/// # Thread Safety
/// - `image`: `RwLock` so the pinning caller can read and write it directly
/// - `state`: `Mutex` around the metadata
///
/// When both are needed, `image` is locked before `state`.
pub struct Buffer {
    id: BufferId,

    /// The block contents.
    image: RwLock<BlockImage>,

    state: Mutex<BufferState>,
}

#[derive(Debug, Default)]
struct BufferState {
    /// Block currently loaded, or None before first use.
    block: Option<BlockId>,

    pin_count: u32,

    /// Transaction that dirtied the image. `Some` means dirty.
    modified_by: Option<TxnId>,

    /// Highest LSN of a log record covering the pending modification.
    lsn: Option<Lsn>,
}

impl Buffer {
    /// Create an empty buffer with a zeroed image of `block_size` bytes.
    pub fn new(id: BufferId, block_size: usize) -> Self {
        Self {
            id,
            image: RwLock::new(BlockImage::new(block_size)),
            state: Mutex::new(BufferState::default()),
        }
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    // ========================================================================
    // Image access (RwLock)
    // ========================================================================

    /// Acquire read lock on the image.
    #[inline]
    pub fn image(&self) -> RwLockReadGuard<'_, BlockImage> {
        self.image.read()
    }

    /// Acquire write lock on the image.
    ///
    /// Writing does not mark the buffer dirty; call [`set_modified`](Self::set_modified).
    #[inline]
    pub fn image_mut(&self) -> RwLockWriteGuard<'_, BlockImage> {
        self.image.write()
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Block currently loaded into this buffer.
    pub fn block(&self) -> Option<BlockId> {
        self.state.lock().block.clone()
    }

    pub fn pin_count(&self) -> u32 {
        self.state.lock().pin_count
    }

    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    /// Record that `txn` modified the image.
    ///
    /// `lsn` is the log record describing the change, or `None` when the
    /// change was not logged. The buffer keeps the highest LSN it has seen.
    pub fn set_modified(&self, txn: TxnId, lsn: Option<Lsn>) {
        let mut state = self.state.lock();
        state.modified_by = Some(txn);
        if let Some(lsn) = lsn {
            state.lsn = state.lsn.max(Some(lsn));
        }
    }

    /// Transaction whose modification has not yet been flushed.
    pub fn modifying_txn(&self) -> Option<TxnId> {
        self.state.lock().modified_by
    }

    /// LSN the log must reach before this buffer may be written.
    pub fn lsn(&self) -> Option<Lsn> {
        self.state.lock().lsn
    }

    pub fn is_dirty(&self) -> bool {
        self.modifying_txn().is_some()
    }

    // ========================================================================
    // Pin count (pool only)
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    pub(crate) fn pin(&self) -> u32 {
        let mut state = self.state.lock();
        state.pin_count += 1;
        state.pin_count
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    pub(crate) fn unpin(&self) -> u32 {
        let mut state = self.state.lock();
        assert!(state.pin_count > 0, "pin count underflow on {}", self.id);
        state.pin_count -= 1;
        state.pin_count
    }

    // ========================================================================
    // Disk transfer
    // ========================================================================

    /// Write the image to its block if dirty. Returns whether a write happened.
    ///
    /// The log is forced up to the buffer's LSN before the block is written.
    pub(crate) fn flush(&self, store: &dyn BlockStore, log: &dyn WriteAheadLog) -> Result<bool> {
        let image = self.image.read();
        let mut state = self.state.lock();
        Self::write_back(&image, &mut state, store, log)
    }

    /// Like [`flush`](Self::flush), but only if the pending modification
    /// belongs to `txn`.
    pub(crate) fn flush_if_modified_by(
        &self,
        txn: TxnId,
        store: &dyn BlockStore,
        log: &dyn WriteAheadLog,
    ) -> Result<bool> {
        let image = self.image.read();
        let mut state = self.state.lock();
        if state.modified_by != Some(txn) {
            return Ok(false);
        }
        Self::write_back(&image, &mut state, store, log)
    }

    /// Load `block` into this buffer, flushing the current contents first.
    ///
    /// If the flush fails the buffer is unchanged. If the read fails the
    /// buffer is left empty with a zeroed image.
    ///
    /// # Panics
    /// Panics if the buffer is pinned.
    pub(crate) fn assign_to_block(
        &self,
        block: BlockId,
        store: &dyn BlockStore,
        log: &dyn WriteAheadLog,
    ) -> Result<()> {
        let mut image = self.image.write();
        let mut state = self.state.lock();
        assert_eq!(state.pin_count, 0, "cannot reassign pinned {}", self.id);

        Self::write_back(&image, &mut state, store, log)?;

        state.block = None;
        if let Err(e) = store.read_block(&block, &mut image) {
            image.reset();
            return Err(e);
        }
        state.block = Some(block);
        Ok(())
    }

    fn write_back(
        image: &BlockImage,
        state: &mut BufferState,
        store: &dyn BlockStore,
        log: &dyn WriteAheadLog,
    ) -> Result<bool> {
        let (Some(txn), Some(block)) = (state.modified_by, state.block.as_ref()) else {
            return Ok(false);
        };

        if let Some(lsn) = state.lsn {
            log.flush(lsn)?;
        }
        store.write_block(block, image)?;
        debug!("flushed {} modified by {}", block, txn);

        state.modified_by = None;
        state.lsn = None;
        Ok(true)
    }
}
