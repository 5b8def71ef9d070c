//! In-memory block store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::{BlockId, Error, Result};
use crate::storage::{BlockImage, BlockStore};

/// Keeps blocks in a `HashMap` and counts every read and write.
///
/// Not persistent. Useful for tests that need to know whether the pool hit
/// the store at all.
pub struct MemoryBlockStore {
    block_size: usize,
    state: Mutex<MemoryState>,
    reads: AtomicU64,
    writes: AtomicU64,
}

#[derive(Default)]
struct MemoryState {
    blocks: HashMap<BlockId, Box<[u8]>>,
    /// Block count per unit.
    lengths: HashMap<String, u64>,
}

impl MemoryBlockStore {
    /// # Panics
    /// Panics if `block_size` is 0.
    pub fn new(block_size: usize) -> Self {
        assert!(block_size > 0, "block_size must be > 0");
        Self {
            block_size,
            state: Mutex::new(MemoryState::default()),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of `read_block` calls served.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of `write_block` calls served.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Copy of the stored bytes for `block`, if it was ever written.
    pub fn block_data(&self, block: &BlockId) -> Option<Vec<u8>> {
        self.state.lock().blocks.get(block).map(|data| data.to_vec())
    }

    fn check_size(&self, image: &BlockImage) -> Result<()> {
        if image.capacity() != self.block_size {
            return Err(Error::BlockSizeMismatch {
                expected: self.block_size,
                actual: image.capacity(),
            });
        }
        Ok(())
    }
}

impl BlockStore for MemoryBlockStore {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read_block(&self, block: &BlockId, image: &mut BlockImage) -> Result<()> {
        self.check_size(image)?;
        self.reads.fetch_add(1, Ordering::Relaxed);

        let state = self.state.lock();
        match state.blocks.get(block) {
            Some(data) => image.as_mut_slice().copy_from_slice(data),
            None => image.reset(),
        }
        Ok(())
    }

    fn write_block(&self, block: &BlockId, image: &BlockImage) -> Result<()> {
        self.check_size(image)?;
        self.writes.fetch_add(1, Ordering::Relaxed);

        let mut state = self.state.lock();
        state
            .blocks
            .insert(block.clone(), image.as_slice().to_vec().into_boxed_slice());

        let len = state.lengths.entry(block.unit().to_string()).or_insert(0);
        *len = (*len).max(block.index().saturating_add(1));
        Ok(())
    }

    fn block_count(&self, unit: &str) -> Result<u64> {
        Ok(self.state.lock().lengths.get(unit).copied().unwrap_or(0))
    }

    fn append_block(&self, unit: &str) -> Result<BlockId> {
        let mut state = self.state.lock();
        let len = state.lengths.entry(unit.to_string()).or_insert(0);
        let block = BlockId::new(unit, *len);
        *len += 1;

        state
            .blocks
            .insert(block.clone(), vec![0u8; self.block_size].into_boxed_slice());
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_block_reads_zeros() {
        let store = MemoryBlockStore::new(64);
        let mut image = BlockImage::new(64);
        image.write_int(0, 5).unwrap();

        store.read_block(&BlockId::new("f", 3), &mut image).unwrap();
        assert_eq!(image.read_int(0).unwrap(), 0);
        assert_eq!(store.reads(), 1);
    }

    #[test]
    fn test_write_then_read() {
        let store = MemoryBlockStore::new(64);
        let block = BlockId::new("f", 1);

        let mut image = BlockImage::new(64);
        image.write_text(0, "mem").unwrap();
        store.write_block(&block, &image).unwrap();

        let mut read = BlockImage::new(64);
        store.read_block(&block, &mut read).unwrap();
        assert_eq!(read.read_text(0).unwrap(), "mem");
        assert_eq!(store.writes(), 1);
        assert_eq!(store.block_count("f").unwrap(), 2);
        assert_eq!(store.block_data(&block).unwrap(), image.as_slice());
    }

    #[test]
    fn test_append() {
        let store = MemoryBlockStore::new(64);
        assert_eq!(store.append_block("f").unwrap(), BlockId::new("f", 0));
        assert_eq!(store.append_block("f").unwrap(), BlockId::new("f", 1));
        assert_eq!(store.block_count("f").unwrap(), 2);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_size_mismatch() {
        let store = MemoryBlockStore::new(64);
        let mut image = BlockImage::new(32);
        assert!(store.read_block(&BlockId::new("f", 0), &mut image).is_err());
        assert_eq!(store.reads(), 0);
    }

    #[test]
    fn test_write_at_last_index() {
        let store = MemoryBlockStore::new(64);
        let image = BlockImage::new(64);
        store.write_block(&BlockId::new("f", u64::MAX), &image).unwrap();
        assert_eq!(store.block_count("f").unwrap(), u64::MAX);
    }
}
