//! Buffer pool management.
//!
//! The buffer pool is the in-memory layer between callers and the block
//! store. It manages a fixed set of buffers, each holding one block.
//!
//! # Components
//! - [`BufferPool`] - Pin/unpin with bounded waiting and LRU eviction
//! - [`Buffer`] - A slot holding a block image + pin/dirty metadata
//! - [`PinnedBuffer`] - RAII pin handle
//! - [`BufferPoolStats`] - Performance counters
//! - [`PoolStatus`] - Diagnostic snapshot
//! - [`replacer`] - Eviction queue

#[allow(clippy::module_inception)]
mod buffer;
mod buffer_pool;
mod pin_guard;
pub mod replacer;
mod stats;
mod status;

pub use buffer::Buffer;
pub use buffer_pool::BufferPool;
pub use pin_guard::PinnedBuffer;
pub use stats::{BufferPoolStats, StatsSnapshot};
pub use status::PoolStatus;
