//! Diagnostic snapshot of the pool.

use std::fmt;

use crate::common::{BlockId, BufferId};

use super::StatsSnapshot;

/// What the pool looked like at one instant.
///
/// Human-readable via `Display`; the layout is not a stable format.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolStatus {
    /// Resident blocks with their buffer and pin count, by buffer id.
    pub resident: Vec<(BufferId, BlockId, u32)>,

    /// Unpinned buffers, next eviction victim first.
    pub lru: Vec<(BufferId, Option<BlockId>)>,

    pub stats: StatsSnapshot,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Allocated Buffers:")?;
        for (id, block, pins) in &self.resident {
            let state = if *pins > 0 { "pinned" } else { "unpinned" };
            writeln!(f, "  {}: {} {} (pins: {})", id, block, state, pins)?;
        }

        writeln!(f, "Unpinned Buffers in LRU order:")?;
        for (id, block) in &self.lru {
            match block {
                Some(block) => writeln!(f, "  {} {}", id, block)?,
                None => writeln!(f, "  {} (empty)", id)?,
            }
        }

        write!(f, "{}", self.stats)
    }
}
