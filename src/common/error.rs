//! Error types for blockpool.

use std::time::Duration;

use thiserror::Error;

use super::BlockId;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All recoverable errors surfaced by the pool and block images.
///
/// Protocol violations (unpinning an unpinned buffer, reassigning a pinned
/// one) are not represented here: they panic.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the block store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A write would run past the end of the block image.
    ///
    /// Nothing was written.
    #[error("write of {needed} bytes at offset {offset} overflows block of {capacity} bytes")]
    BlockOverflow {
        offset: usize,
        needed: usize,
        capacity: usize,
    },

    /// A read touched bytes outside the block image.
    #[error("offset {offset} is out of range for block of {capacity} bytes")]
    OffsetOutOfRange { offset: usize, capacity: usize },

    /// Text containing U+0000 collides with the NUL terminator.
    #[error("text written at offset {offset} contains a NUL character")]
    InteriorNul { offset: usize },

    /// An image of the wrong size was handed to a block store.
    #[error("block size mismatch: expected {expected}, got {actual}")]
    BlockSizeMismatch { expected: usize, actual: usize },

    /// The block's byte offset does not fit in a file offset.
    #[error("{block} lies beyond the largest addressable offset")]
    BlockIndexOutOfRange { block: BlockId },

    /// A unit name that is not a plain relative path inside the store.
    #[error("invalid storage unit name {unit:?}")]
    InvalidUnit { unit: String },

    /// No buffer became available for `block` before the pin deadline.
    #[error("no buffer available for {block} after {waited:?}")]
    PoolExhausted { block: BlockId, waited: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BlockOverflow {
            offset: 398,
            needed: 4,
            capacity: 400,
        };
        assert_eq!(
            err.to_string(),
            "write of 4 bytes at offset 398 overflows block of 400 bytes"
        );

        let err = Error::PoolExhausted {
            block: BlockId::new("data.tbl", 3),
            waited: Duration::from_millis(10),
        };
        assert_eq!(
            err.to_string(),
            "no buffer available for [file data.tbl, block 3] after 10ms"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = Error::InvalidUnit {
            unit: "../x.tbl".to_string(),
        };
        assert_eq!(err.to_string(), "invalid storage unit name \"../x.tbl\"");

        let err = Error::BlockIndexOutOfRange {
            block: BlockId::new("t", 9),
        };
        assert_eq!(
            err.to_string(),
            "[file t, block 9] lies beyond the largest addressable offset"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }
}
