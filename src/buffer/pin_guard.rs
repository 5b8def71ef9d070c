//! RAII handle for a pinned buffer.
//!
//! A [`PinnedBuffer`] is what [`BufferPool::pin`] hands out. It derefs to the
//! underlying [`Buffer`], so callers read and write the block image through
//! it, and it unpins the buffer when dropped. Because unpinning consumes the
//! handle, a buffer can never be touched after its pin is released.

use std::fmt;
use std::ops::Deref;

use crate::common::{BlockId, BufferId};

use super::buffer::Buffer;
use super::buffer_pool::BufferPool;

/// A pin on one buffer, released on drop.
///
/// # Example
/// ```ignore
/// let pinned = pool.pin(&block)?;
/// pinned.image_mut().write_int(0, 42)?;
/// pinned.set_modified(txn, Some(lsn));
/// // pinned drops here, buffer unpinned
/// ```
pub struct PinnedBuffer<'a> {
    /// Reference back to the pool for unpin on drop.
    pool: &'a BufferPool,
    buffer: &'a Buffer,
    block: BlockId,
}

impl<'a> PinnedBuffer<'a> {
    /// Called by `BufferPool::pin()` after the pin count was incremented.
    pub(crate) fn new(pool: &'a BufferPool, buffer: &'a Buffer, block: BlockId) -> Self {
        Self {
            pool,
            buffer,
            block,
        }
    }

    /// Block this buffer holds for as long as the pin lasts.
    #[inline]
    pub fn block_id(&self) -> &BlockId {
        &self.block
    }

    #[inline]
    pub fn buffer_id(&self) -> BufferId {
        self.buffer.id()
    }
}

impl Deref for PinnedBuffer<'_> {
    type Target = Buffer;

    #[inline]
    fn deref(&self) -> &Buffer {
        self.buffer
    }
}

impl fmt::Debug for PinnedBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedBuffer")
            .field("buffer", &self.buffer.id())
            .field("block", &self.block)
            .finish()
    }
}

impl Drop for PinnedBuffer<'_> {
    fn drop(&mut self) {
        self.pool.unpin_internal(self.buffer);
    }
}
