//! Statistics snapshots and their differences
//!
//! A `StatsSample` is an immutable snapshot taken at one instant. A
//! `StatsDelta` is the field-wise difference between two consecutive
//! samples from the same store instance.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::counters::CountersSnapshot;

/// Size of the store as seen by one read snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreFootprint {
    pub partitions: u64,
    /// Entries across every partition
    pub entries: u64,
    /// Length of the database file on disk
    pub file_bytes: u64,
}

/// Point-in-time snapshot of store statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSample {
    pub taken_at: DateTime<Utc>,

    // Process-level transaction and scan counters
    pub read_txns_begun: u64,
    pub read_txns_released: u64,
    pub open_read_txns: u64,
    pub write_txns_committed: u64,
    pub write_txns_aborted: u64,
    pub scans_opened: u64,
    pub entries_visited: u64,

    // Store footprint
    pub partitions: u64,
    pub entries: u64,
    pub file_bytes: u64,
}

impl StatsSample {
    /// An all-zero sample stamped with `taken_at`.
    pub fn empty(taken_at: DateTime<Utc>) -> Self {
        Self::from_parts(taken_at, CountersSnapshot::default(), StoreFootprint::default())
    }

    pub fn from_parts(
        taken_at: DateTime<Utc>,
        counters: CountersSnapshot,
        footprint: StoreFootprint,
    ) -> Self {
        Self {
            taken_at,
            read_txns_begun: counters.read_txns_begun,
            read_txns_released: counters.read_txns_released,
            open_read_txns: counters
                .read_txns_begun
                .saturating_sub(counters.read_txns_released),
            write_txns_committed: counters.write_txns_committed,
            write_txns_aborted: counters.write_txns_aborted,
            scans_opened: counters.scans_opened,
            entries_visited: counters.entries_visited,
            partitions: footprint.partitions,
            entries: footprint.entries,
            file_bytes: footprint.file_bytes,
        }
    }

    /// `self - prev`, field by field.
    ///
    /// Gauges such as `open_read_txns` and `entries` can shrink,
    /// so every field of the delta is signed.
    pub fn delta(&self, prev: &StatsSample) -> StatsDelta {
        StatsDelta {
            taken_at: self.taken_at,
            interval_ms: (self.taken_at - prev.taken_at).num_milliseconds(),
            read_txns_begun: diff(self.read_txns_begun, prev.read_txns_begun),
            read_txns_released: diff(self.read_txns_released, prev.read_txns_released),
            open_read_txns: diff(self.open_read_txns, prev.open_read_txns),
            write_txns_committed: diff(self.write_txns_committed, prev.write_txns_committed),
            write_txns_aborted: diff(self.write_txns_aborted, prev.write_txns_aborted),
            scans_opened: diff(self.scans_opened, prev.scans_opened),
            entries_visited: diff(self.entries_visited, prev.entries_visited),
            partitions: diff(self.partitions, prev.partitions),
            entries: diff(self.entries, prev.entries),
            file_bytes: diff(self.file_bytes, prev.file_bytes),
        }
    }
}

/// Difference between two consecutive samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsDelta {
    /// Timestamp of the later sample
    pub taken_at: DateTime<Utc>,
    pub interval_ms: i64,
    pub read_txns_begun: i64,
    pub read_txns_released: i64,
    pub open_read_txns: i64,
    pub write_txns_committed: i64,
    pub write_txns_aborted: i64,
    pub scans_opened: i64,
    pub entries_visited: i64,
    pub partitions: i64,
    pub entries: i64,
    pub file_bytes: i64,
}

fn diff(current: u64, previous: u64) -> i64 {
    (i128::from(current) - i128::from(previous)).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_at(ms: i64) -> StatsSample {
        let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        StatsSample::empty(base + Duration::milliseconds(ms))
    }

    #[test]
    fn test_delta_is_field_wise() {
        let prev = StatsSample {
            read_txns_begun: 4,
            entries: 10,
            file_bytes: 4096,
            ..sample_at(0)
        };
        let next = StatsSample {
            read_txns_begun: 9,
            entries: 12,
            file_bytes: 8192,
            ..sample_at(2000)
        };

        let delta = next.delta(&prev);
        assert_eq!(delta.interval_ms, 2000);
        assert_eq!(delta.read_txns_begun, 5);
        assert_eq!(delta.entries, 2);
        assert_eq!(delta.file_bytes, 4096);
        assert_eq!(delta.write_txns_committed, 0);
        assert_eq!(delta.taken_at, next.taken_at);
    }

    #[test]
    fn test_delta_can_be_negative() {
        let prev = StatsSample {
            open_read_txns: 3,
            entries: 512,
            ..sample_at(0)
        };
        let next = StatsSample {
            open_read_txns: 1,
            ..sample_at(10)
        };

        let delta = next.delta(&prev);
        assert_eq!(delta.open_read_txns, -2);
        assert_eq!(delta.entries, -512);
    }

    #[test]
    fn test_delta_of_identical_samples_is_zero() {
        let s = StatsSample {
            partitions: 7,
            ..sample_at(0)
        };
        let delta = s.delta(&s);
        assert_eq!(delta.interval_ms, 0);
        assert_eq!(delta.partitions, 0);
    }

    #[test]
    fn test_from_parts_derives_open_txns() {
        let counters = CountersSnapshot {
            read_txns_begun: 5,
            read_txns_released: 3,
            ..CountersSnapshot::default()
        };
        let s = StatsSample::from_parts(Utc::now(), counters, StoreFootprint::default());
        assert_eq!(s.open_read_txns, 2);
    }

    #[test]
    fn test_delta_serializes_as_flat_object() {
        let delta = sample_at(100).delta(&sample_at(0));
        let value = serde_json::to_value(&delta).unwrap();
        assert_eq!(value["interval_ms"], 100);
        assert!(value["taken_at"].is_string());
    }

    #[test]
    fn test_diff_saturates() {
        assert_eq!(diff(u64::MAX, 0), i64::MAX);
        assert_eq!(diff(0, u64::MAX), i64::MIN);
    }
}
