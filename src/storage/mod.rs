//! Storage layer - block images and block stores.
//!
//! - [`BlockImage`] - One block's bytes with typed accessors
//! - [`BlockStore`] - Persistent block I/O seam
//! - [`FileBlockStore`] - One file per storage unit
//! - [`MemoryBlockStore`] - In-process store for tests

mod block_image;
mod block_store;
mod file_store;
mod memory_store;

pub use block_image::BlockImage;
pub use block_store::BlockStore;
pub use file_store::FileBlockStore;
pub use memory_store::MemoryBlockStore;
