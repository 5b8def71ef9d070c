//! Block identifier type.

use std::fmt;

/// Identifies a block on disk: a storage unit (file) name plus the block's
/// index within that unit.
///
/// Used as the buffer pool's residency key, so it is cheap to compare and
/// hash and is never mutated after creation.
///
/// # Example
/// ```
/// use blockpool::BlockId;
///
/// let block = BlockId::new("students.tbl", 7);
/// assert_eq!(block.unit(), "students.tbl");
/// assert_eq!(block.index(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    unit: String,
    index: u64,
}

impl BlockId {
    /// Create a new BlockId.
    pub fn new(unit: impl Into<String>, index: u64) -> Self {
        Self {
            unit: unit.into(),
            index,
        }
    }

    /// Name of the storage unit holding this block.
    #[inline]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Position of the block within its storage unit.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[file {}, block {}]", self.unit, self.index)
    }
}
