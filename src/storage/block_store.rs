//! The block store seam.
//!
//! The buffer pool never touches files directly. It reads and writes whole
//! blocks through a [`BlockStore`], which owns the persistent layout.

use crate::common::{BlockId, Result};
use crate::storage::BlockImage;

/// Synchronous, fixed-block-size persistent storage.
///
/// # Contract
/// - Every block of every unit is exactly [`block_size`](Self::block_size) bytes.
/// - Reading a block that was never written fills the image with zeros.
/// - `write_block` is durable when it returns.
///
/// Implementations serialize their own internal state, so a store is shared
/// between threads behind an `Arc` and every method takes `&self`.
pub trait BlockStore: Send + Sync {
    /// Size in bytes of every block this store holds.
    fn block_size(&self) -> usize;

    /// Read `block` into `image`, replacing its contents.
    fn read_block(&self, block: &BlockId, image: &mut BlockImage) -> Result<()>;

    /// Write `image` as the new contents of `block`.
    fn write_block(&self, block: &BlockId, image: &BlockImage) -> Result<()>;

    /// Number of blocks currently in `unit`.
    fn block_count(&self, unit: &str) -> Result<u64>;

    /// Extend `unit` by one zeroed block and return its id.
    fn append_block(&self, unit: &str) -> Result<BlockId>;
}
