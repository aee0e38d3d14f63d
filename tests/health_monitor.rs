//! Health Monitor Tests
//!
//! Tests for the statistics monitor over a real chain store:
//! - Deltas reflect the scan and write activity between two samples
//! - The tick bound stops the monitor with the expected counts
//! - Cancellation stops a monitor that would otherwise run forever
//! - A store that closes under the monitor ends it with SampleFailed

use std::sync::Arc;
use std::time::Duration;

use chaindb_inspect::monitor::{HealthMonitor, MonitorConfig, MonitorExit};
use chaindb_inspect::observability::{record_type, MemorySink};
use chaindb_inspect::record::types::SignedBeaconBlock;
use chaindb_inspect::record::{encode_record, RecordDecoder, RecordKind};
use chaindb_inspect::store::{partition, ChainStore, RangeReader, StoreError};
use tempfile::TempDir;
use tokio::sync::watch;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_store() -> (TempDir, Arc<ChainStore>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ChainStore::open(dir.path().join("beaconchain.db")).unwrap();
    (dir, Arc::new(store))
}

fn seed_blocks(store: &ChainStore, count: u64) {
    store
        .update(|w| {
            for slot in 1..=count {
                let raw = encode_record(&SignedBeaconBlock::sample(slot).into()).unwrap();
                w.put(partition::BLOCKS, &slot.to_be_bytes(), &raw)?;
            }
            Ok(())
        })
        .unwrap();
}

fn config(interval_ms: u64, max_ticks: Option<u64>) -> MonitorConfig {
    MonitorConfig {
        interval: Duration::from_millis(interval_ms),
        max_ticks,
    }
}

// =============================================================================
// Deltas
// =============================================================================

/// Activity between two samples shows up in the delta between them.
#[tokio::test]
async fn test_delta_reflects_scan_activity() {
    let (_dir, store) = create_store();
    seed_blocks(&store, 4);

    let sink = Arc::new(MemorySink::new());
    let mut monitor = HealthMonitor::new(Arc::clone(&store), sink.clone(), config(5, None));
    let (_tx, mut rx) = watch::channel(false);

    assert!(monitor.tick(&mut rx).await.is_none());

    let reader = RangeReader::new(&store, RecordDecoder::default());
    let visited = reader
        .scan(partition::BLOCKS, RecordKind::SignedBeaconBlock, 3)
        .unwrap()
        .count();
    assert_eq!(visited, 3);

    assert!(monitor.tick(&mut rx).await.is_none());

    let deltas = sink.records_of(record_type::STATS_DELTA);
    assert_eq!(deltas.len(), 1);
    let delta = &deltas[0].fields;
    assert_eq!(delta["tick"], 2);
    assert_eq!(delta["scans_opened"], 1);
    assert_eq!(delta["entries_visited"], 3);
    assert_eq!(delta["read_txns_begun"], 1);
    assert_eq!(delta["open_read_txns"], 0);
    assert_eq!(delta["write_txns_committed"], 0);
    assert!(delta["interval_ms"].as_i64().unwrap() >= 0);
}

/// Commits between samples are counted; the footprint grows with them.
#[tokio::test]
async fn test_delta_reflects_writes() {
    let (_dir, store) = create_store();
    let sink = Arc::new(MemorySink::new());
    let mut monitor = HealthMonitor::new(Arc::clone(&store), sink.clone(), config(5, None));
    let (_tx, mut rx) = watch::channel(false);

    monitor.tick(&mut rx).await;
    seed_blocks(&store, 8);
    monitor.tick(&mut rx).await;

    let deltas = sink.records_of(record_type::STATS_DELTA);
    assert_eq!(deltas[0].fields["write_txns_committed"], 1);
    assert_eq!(deltas[0].fields["entries"], 8);
    assert_eq!(deltas[0].fields["partitions"], 1);
    assert!(deltas[0].fields["file_bytes"].as_i64().unwrap() >= 0);
}

// =============================================================================
// Lifecycle
// =============================================================================

/// The standard bound of two ticks yields exactly one delta.
#[tokio::test]
async fn test_bounded_monitor_completes() {
    let (_dir, store) = create_store();
    let sink = Arc::new(MemorySink::new());
    let (_tx, rx) = watch::channel(false);

    let exit = HealthMonitor::new(store, sink.clone(), config(10, Some(2)))
        .run(rx)
        .await;

    assert_eq!(exit, MonitorExit::TickBoundReached { ticks: 3, deltas: 1 });
    assert_eq!(sink.records_of(record_type::STATS_DELTA).len(), 1);
}

/// An unbounded monitor runs until cancelled, and its task returns.
#[tokio::test]
async fn test_unbounded_monitor_cancels() {
    let (_dir, store) = create_store();
    let sink = Arc::new(MemorySink::new());
    let (tx, rx) = watch::channel(false);

    let handle = HealthMonitor::new(store, sink.clone(), config(5, None)).spawn(rx);
    tokio::time::sleep(Duration::from_millis(40)).await;
    tx.send(true).unwrap();

    let exit = handle.wait().await.unwrap();
    assert!(matches!(exit, MonitorExit::Cancelled { .. }));
    assert_eq!(
        exit.deltas(),
        Some(sink.records_of(record_type::STATS_DELTA).len() as u64)
    );
}

/// Closing the store under a running monitor ends it with SampleFailed.
#[tokio::test]
async fn test_closed_store_fails_sample() {
    let (_dir, store) = create_store();
    let sink = Arc::new(MemorySink::new());
    let mut monitor = HealthMonitor::new(Arc::clone(&store), sink.clone(), config(5, None));
    let (_tx, mut rx) = watch::channel(false);

    assert!(monitor.tick(&mut rx).await.is_none());
    store.close();

    let exit = monitor.tick(&mut rx).await.unwrap();
    assert_eq!(
        exit,
        MonitorExit::SampleFailed {
            tick: 2,
            error: StoreError::TransactionClosed,
        }
    );
    assert!(exit.is_failure());
    assert!(sink.is_empty());
}
