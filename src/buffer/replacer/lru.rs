//! LRU (Least-Recently-Used) replacement policy.
//!
//! The queue holds exactly the unpinned buffers, ordered by when they were
//! last unpinned. The front is the next eviction candidate.

use std::collections::VecDeque;

use crate::common::BufferId;

/// Eviction queue of unpinned buffers, least recently unpinned first.
#[derive(Debug, Default)]
pub struct LruReplacer {
    /// front = least recently unpinned.
    queue: VecDeque<BufferId>,
}

impl LruReplacer {
    /// Create an empty replacer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a replacer holding buffers `0..count`, in id order.
    pub fn with_buffers(count: usize) -> Self {
        Self {
            queue: (0..count).map(BufferId::new).collect(),
        }
    }

    /// Record that a buffer's pin count dropped to 0.
    ///
    /// It becomes the most recently used entry.
    pub fn unpinned(&mut self, buffer_id: BufferId) {
        debug_assert!(!self.contains(buffer_id), "{} already queued", buffer_id);
        self.queue.push_back(buffer_id);
    }

    /// Take a buffer out of the queue because it is being pinned again.
    ///
    /// Returns false if it was not queued.
    pub fn remove(&mut self, buffer_id: BufferId) -> bool {
        match self.queue.iter().position(|&id| id == buffer_id) {
            Some(pos) => {
                self.queue.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Select a victim: the least recently unpinned buffer.
    ///
    /// Returns None if every buffer is pinned.
    pub fn evict(&mut self) -> Option<BufferId> {
        self.queue.pop_front()
    }

    /// Put back a victim whose eviction failed, keeping it first in line.
    pub fn reinstate(&mut self, buffer_id: BufferId) {
        self.queue.push_front(buffer_id);
    }

    pub fn contains(&self, buffer_id: BufferId) -> bool {
        self.queue.contains(&buffer_id)
    }

    /// Number of evictable buffers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued buffers, next victim first.
    pub fn iter(&self) -> impl Iterator<Item = BufferId> + '_ {
        self.queue.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(replacer: &LruReplacer) -> Vec<usize> {
        replacer.iter().map(|id| id.0).collect()
    }

    #[test]
    fn test_lru_initial_order() {
        let mut replacer = LruReplacer::with_buffers(3);
        assert_eq!(replacer.len(), 3);

        assert_eq!(replacer.evict(), Some(BufferId::new(0)));
        assert_eq!(replacer.evict(), Some(BufferId::new(1)));
        assert_eq!(replacer.evict(), Some(BufferId::new(2)));
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_lru_evicts_least_recently_unpinned() {
        let mut replacer = LruReplacer::new();

        replacer.unpinned(BufferId::new(2));
        replacer.unpinned(BufferId::new(0));
        replacer.unpinned(BufferId::new(1));

        assert_eq!(replacer.evict(), Some(BufferId::new(2)));
        assert_eq!(replacer.evict(), Some(BufferId::new(0)));
        assert_eq!(replacer.evict(), Some(BufferId::new(1)));
    }

    #[test]
    fn test_lru_reuse_moves_to_back() {
        let mut replacer = LruReplacer::with_buffers(3);

        // Buffer 0 is pinned again, then released: now most recent.
        assert!(replacer.remove(BufferId::new(0)));
        replacer.unpinned(BufferId::new(0));

        assert_eq!(ids(&replacer), vec![1, 2, 0]);
        assert_eq!(replacer.evict(), Some(BufferId::new(1)));
    }

    #[test]
    fn test_lru_remove_missing() {
        let mut replacer = LruReplacer::with_buffers(1);
        assert!(!replacer.remove(BufferId::new(5)));
        assert_eq!(replacer.len(), 1);
    }

    #[test]
    fn test_lru_reinstate_goes_first() {
        let mut replacer = LruReplacer::with_buffers(2);
        let victim = replacer.evict().unwrap();
        replacer.reinstate(victim);

        assert_eq!(ids(&replacer), vec![0, 1]);
        assert!(replacer.contains(BufferId::new(0)));
        assert!(!replacer.is_empty());
    }
}
