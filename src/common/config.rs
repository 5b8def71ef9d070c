//! Configuration for the buffer pool and block layout.

use std::time::Duration;

/// Default size of a block in bytes (4KB).
///
/// Matches the OS page size on most systems. Any size works as long as the
/// block store and the pool agree on it.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Default number of buffers in a pool.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Default upper bound on how long `pin` waits for a buffer.
pub const DEFAULT_PIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Encoded width of an integer field.
pub const INT_SIZE: usize = 4;

/// Encoded width of one text character (a UTF-16 code unit).
pub const CHAR_SIZE: usize = 2;

/// Settings fixed at pool construction.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use blockpool::BufferPoolConfig;
///
/// let config = BufferPoolConfig::default()
///     .with_pool_size(8)
///     .with_block_size(400)
///     .with_pin_timeout(Duration::from_millis(250));
/// assert_eq!(config.pool_size, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of buffers allocated at startup.
    pub pool_size: usize,

    /// Size of every block image in bytes.
    pub block_size: usize,

    /// Deadline for a single `pin` call, measured from its first attempt.
    pub pin_timeout: Duration,
}

impl BufferPoolConfig {
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_pin_timeout(mut self, pin_timeout: Duration) -> Self {
        self.pin_timeout = pin_timeout;
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            pin_timeout: DEFAULT_PIN_TIMEOUT,
        }
    }
}
