//! Eviction policy implementations (replacers).
//!
//! - [`LruReplacer`] - Least-recently-unpinned first

mod lru;

pub use lru::LruReplacer;
