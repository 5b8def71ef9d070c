//! blockpool - a fixed-size buffer pool over typed block images.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           blockpool                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Buffer Pool (buffer/)                     │   │
//! │  │   pin / unpin (bounded wait) · LRU eviction · flush_all  │   │
//! │  │         BufferPool + Buffer + PinnedBuffer + Stats       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                 ↓                              ↓                │
//! │  ┌───────────────────────────────┐  ┌─────────────────────┐    │
//! │  │      Storage (storage/)       │  │ Recovery (recovery/)│    │
//! │  │ BlockImage · BlockStore trait │  │ WriteAheadLog trait │    │
//! │  │ FileBlockStore · MemoryStore  │  │ MemoryLog           │    │
//! │  └───────────────────────────────┘  └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, BufferId, TxnId, Lsn, Error, config)
//! - [`buffer`] - Buffer pool management and eviction
//! - [`storage`] - Block images and block stores
//! - [`recovery`] - Write-ahead log seam
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use blockpool::{BlockId, BufferPool, BufferPoolConfig, FileBlockStore, MemoryLog, TxnId};
//!
//! let config = BufferPoolConfig::default();
//! let store = Arc::new(FileBlockStore::open("data", config.block_size).unwrap());
//! let pool = BufferPool::new(config, store, Arc::new(MemoryLog::new()));
//!
//! let pinned = pool.pin(&BlockId::new("accounts.tbl", 0)).unwrap();
//! pinned.image_mut().write_text(0, "hello").unwrap();
//! pinned.set_modified(TxnId(1), None);
//! pool.unpin(pinned);
//! pool.flush_all(TxnId(1)).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod recovery;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::{BlockId, BufferId, BufferPoolConfig, Error, Lsn, Result, TxnId};

pub use buffer::{Buffer, BufferPool, BufferPoolStats, PinnedBuffer, PoolStatus, StatsSnapshot};
pub use recovery::{MemoryLog, WriteAheadLog};
pub use storage::{BlockImage, BlockStore, FileBlockStore, MemoryBlockStore};
