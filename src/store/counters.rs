//! Process-level engine counters
//!
//! - Counters only, monotonic, reset on process start
//! - Thread-safe but lock-minimal
//!
//! Open read transactions are derived as `begun - released`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters the store handle bumps as transactions and scans run.
///
/// Relaxed ordering: values are sampled for observation only.
#[derive(Debug, Default)]
pub struct EngineCounters {
    read_txns_begun: AtomicU64,
    read_txns_released: AtomicU64,
    write_txns_committed: AtomicU64,
    write_txns_aborted: AtomicU64,
    scans_opened: AtomicU64,
    entries_visited: AtomicU64,
}

impl EngineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_read_txns_begun(&self) {
        self.read_txns_begun.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_read_txns_released(&self) {
        self.read_txns_released.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_write_txns_committed(&self) {
        self.write_txns_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_write_txns_aborted(&self) {
        self.write_txns_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_scans_opened(&self) {
        self.scans_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_entries_visited(&self) {
        self.entries_visited.fetch_add(1, Ordering::Relaxed);
    }

    /// Read transactions currently held open.
    pub fn open_read_txns(&self) -> u64 {
        let begun = self.read_txns_begun.load(Ordering::Relaxed);
        let released = self.read_txns_released.load(Ordering::Relaxed);
        begun.saturating_sub(released)
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            read_txns_begun: self.read_txns_begun.load(Ordering::Relaxed),
            read_txns_released: self.read_txns_released.load(Ordering::Relaxed),
            write_txns_committed: self.write_txns_committed.load(Ordering::Relaxed),
            write_txns_aborted: self.write_txns_aborted.load(Ordering::Relaxed),
            scans_opened: self.scans_opened.load(Ordering::Relaxed),
            entries_visited: self.entries_visited.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of all counters at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub read_txns_begun: u64,
    pub read_txns_released: u64,
    pub write_txns_committed: u64,
    pub write_txns_aborted: u64,
    pub scans_opened: u64,
    pub entries_visited: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counters_are_zero() {
        let counters = EngineCounters::new();
        assert_eq!(counters.snapshot(), CountersSnapshot::default());
        assert_eq!(counters.open_read_txns(), 0);
    }

    #[test]
    fn test_open_read_txns_tracks_release() {
        let counters = EngineCounters::new();
        counters.increment_read_txns_begun();
        counters.increment_read_txns_begun();
        assert_eq!(counters.open_read_txns(), 2);

        counters.increment_read_txns_released();
        assert_eq!(counters.open_read_txns(), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let counters = EngineCounters::new();
        counters.increment_scans_opened();
        let before = counters.snapshot();

        counters.increment_scans_opened();
        counters.increment_entries_visited();

        assert_eq!(before.scans_opened, 1);
        assert_eq!(before.entries_visited, 0);
        assert_eq!(counters.snapshot().scans_opened, 2);
    }
}
