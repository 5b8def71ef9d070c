//! Write-ahead log seam.
//!
//! The buffer pool does not write log records. It only needs to force the log
//! up to a buffer's LSN before that buffer's image goes to its block, which is
//! the single operation [`WriteAheadLog`] exposes.

use parking_lot::Mutex;

use crate::common::{Lsn, Result};

/// A log that can be forced to durable storage up to a given LSN.
pub trait WriteAheadLog: Send + Sync {
    /// Make every record with an LSN at or below `lsn` durable.
    fn flush(&self, lsn: Lsn) -> Result<()>;
}

/// In-process log that only remembers the highest LSN it was asked to flush.
///
/// Stands in for a real log when none is wired up, and lets tests observe the
/// write-ahead ordering.
#[derive(Debug, Default)]
pub struct MemoryLog {
    flushed: Mutex<Option<Lsn>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest LSN made durable so far.
    pub fn flushed_lsn(&self) -> Option<Lsn> {
        *self.flushed.lock()
    }
}

impl WriteAheadLog for MemoryLog {
    fn flush(&self, lsn: Lsn) -> Result<()> {
        let mut flushed = self.flushed.lock();
        *flushed = (*flushed).max(Some(lsn));
        Ok(())
    }
}
