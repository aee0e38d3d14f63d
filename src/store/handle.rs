//! Store handle over a single `redb` file
//!
//! Partitions are `redb` tables keyed and valued by raw bytes. Every
//! transaction is scoped: `ReadScope` releases its read transaction on
//! drop, and `update` commits on `Ok` and aborts on `Err`.

use std::fs::{self, OpenOptions};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use redb::{
    Database, ReadTransaction, ReadableTable, TableDefinition, TableHandle, WriteTransaction,
};

use super::counters::EngineCounters;
use super::errors::{StoreError, StoreResult};
use super::stats::{StatsSample, StoreFootprint};
use crate::observability::{log_event_with_fields, Event};

/// Raw (key, value) pair copied out of a partition.
pub type RawEntry = (Vec<u8>, Vec<u8>);

fn partition_def(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// Handle to the chain database file.
///
/// Shared read-only between the foreground scan and the health monitor,
/// typically as `Arc<ChainStore>`.
pub struct ChainStore {
    path: PathBuf,
    db: Database,
    closed: AtomicBool,
    counters: EngineCounters,
}

impl ChainStore {
    /// Open the store at `path`, creating it with owner-only permissions
    /// if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            create_owner_only(&path)?;
        }
        let db = Database::create(&path)?;

        let shown = path.display().to_string();
        log_event_with_fields(Event::StoreOpen, &[("path", shown.as_str())]);

        Ok(Self {
            path,
            db,
            closed: AtomicBool::new(false),
            counters: EngineCounters::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn counters(&self) -> &EngineCounters {
        &self.counters
    }

    /// Mark the handle closed. Every later transaction or stats sample
    /// fails with `TransactionClosed`. Scopes already open stay valid
    /// until dropped.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let shown = self.path.display().to_string();
            log_event_with_fields(Event::StoreClosed, &[("path", shown.as_str())]);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_closed() {
            Err(StoreError::TransactionClosed)
        } else {
            Ok(())
        }
    }

    /// Begin a read transaction, released when the returned scope drops.
    pub fn begin_read(&self) -> StoreResult<ReadScope<'_>> {
        self.ensure_open()?;
        let txn = self.db.begin_read()?;
        self.counters.increment_read_txns_begun();
        Ok(ReadScope {
            txn,
            counters: &self.counters,
        })
    }

    /// Run `f` inside one read transaction.
    pub fn view<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&ReadScope<'_>) -> StoreResult<T>,
    {
        let scope = self.begin_read()?;
        f(&scope)
    }

    /// Run `f` inside one write transaction; commit on `Ok`, abort on `Err`.
    pub fn update<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&WriteScope<'_>) -> StoreResult<T>,
    {
        self.ensure_open()?;
        let scope = WriteScope {
            txn: self.db.begin_write()?,
        };
        match f(&scope) {
            Ok(value) => {
                scope.txn.commit()?;
                self.counters.increment_write_txns_committed();
                Ok(value)
            }
            Err(err) => {
                scope.txn.abort()?;
                self.counters.increment_write_txns_aborted();
                Err(err)
            }
        }
    }

    /// Insert one entry, creating the partition if needed.
    pub fn put(&self, partition: &str, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.update(|w| w.put(partition, key, value))
    }

    /// Partition names in the store's enumeration order.
    pub fn list_partitions(&self) -> StoreResult<Vec<String>> {
        self.view(|r| r.partitions())
    }

    /// Up to `limit` raw entries from the start of `partition`.
    pub fn raw_entries(&self, partition: &str, limit: usize) -> StoreResult<Vec<RawEntry>> {
        self.view(|r| r.entries(partition, limit))
    }

    /// Take a statistics snapshot.
    ///
    /// The footprint is measured under its own read transaction, so a
    /// sample never waits on a writer and never shows up in the
    /// transaction counters it reports.
    pub fn stats(&self) -> StoreResult<StatsSample> {
        self.ensure_open()?;
        let footprint = self.footprint()?;
        Ok(StatsSample::from_parts(Utc::now(), self.counters.snapshot(), footprint))
    }

    fn footprint(&self) -> StoreResult<StoreFootprint> {
        let txn = self.db.begin_read()?;
        let mut footprint = StoreFootprint {
            file_bytes: fs::metadata(&self.path)?.len(),
            ..StoreFootprint::default()
        };
        for handle in txn.list_tables()? {
            let table = txn.open_table(partition_def(handle.name()))?;
            footprint.partitions += 1;
            footprint.entries += table.len()?;
        }
        Ok(footprint)
    }
}

#[cfg(unix)]
fn create_owner_only(path: &Path) -> StoreResult<()> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_owner_only(path: &Path) -> StoreResult<()> {
    OpenOptions::new().write(true).create_new(true).open(path)?;
    Ok(())
}

/// A read transaction held for the lifetime of the scope.
///
/// Every read through one scope sees the same snapshot of the store.
pub struct ReadScope<'a> {
    txn: ReadTransaction<'a>,
    counters: &'a EngineCounters,
}

impl<'a> ReadScope<'a> {
    pub(crate) fn counters(&self) -> &'a EngineCounters {
        self.counters
    }

    /// Fails with `NotFound` if `partition` does not exist.
    pub fn ensure_partition(&self, partition: &str) -> StoreResult<()> {
        self.txn.open_table(partition_def(partition))?;
        Ok(())
    }

    /// First entry of `partition` strictly after `after`, or the very first
    /// entry when `after` is `None`.
    pub fn next_entry(&self, partition: &str, after: Option<&[u8]>) -> StoreResult<Option<RawEntry>> {
        let table = self.txn.open_table(partition_def(partition))?;
        let mut range = match after {
            Some(key) => table.range::<&[u8]>((Bound::Excluded(key), Bound::Unbounded))?,
            None => table.iter()?,
        };
        let next = match range.next() {
            Some(entry) => {
                let (k, v) = entry?;
                Some((k.value().to_vec(), v.value().to_vec()))
            }
            None => None,
        };
        Ok(next)
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, partition: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let table = self.txn.open_table(partition_def(partition))?;
        let value = table.get(key)?.map(|v| v.value().to_vec());
        Ok(value)
    }

    /// Greatest key in `partition`, or `None` when it is empty.
    pub fn last_key(&self, partition: &str) -> StoreResult<Option<Vec<u8>>> {
        let table = self.txn.open_table(partition_def(partition))?;
        let last = match table.iter()?.next_back() {
            Some(entry) => Some(entry?.0.value().to_vec()),
            None => None,
        };
        Ok(last)
    }

    /// Up to `limit` entries from the start of `partition`, in key order.
    pub fn entries(&self, partition: &str, limit: usize) -> StoreResult<Vec<RawEntry>> {
        let table = self.txn.open_table(partition_def(partition))?;
        let mut out = Vec::new();
        for entry in table.iter()?.take(limit) {
            let (k, v) = entry?;
            out.push((k.value().to_vec(), v.value().to_vec()));
        }
        Ok(out)
    }

    /// Number of entries in `partition`.
    pub fn entry_count(&self, partition: &str) -> StoreResult<u64> {
        let table = self.txn.open_table(partition_def(partition))?;
        Ok(table.len()?)
    }

    /// Partition names, in the store's enumeration order.
    pub fn partitions(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .txn
            .list_tables()?
            .map(|handle| handle.name().to_string())
            .collect())
    }
}

impl Drop for ReadScope<'_> {
    fn drop(&mut self) {
        self.counters.increment_read_txns_released();
    }
}

/// A write transaction inside `ChainStore::update`.
pub struct WriteScope<'a> {
    txn: WriteTransaction<'a>,
}

impl WriteScope<'_> {
    /// Create `partition` if absent. Returns whether it was newly created.
    pub fn create_partition(&self, partition: &str) -> StoreResult<bool> {
        let existed = self
            .txn
            .list_tables()?
            .any(|handle| handle.name() == partition);
        if !existed {
            self.txn.open_table(partition_def(partition))?;
        }
        Ok(!existed)
    }

    /// Insert one entry, creating the partition if needed.
    pub fn put(&self, partition: &str, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut table = self.txn.open_table(partition_def(partition))?;
        table.insert(key, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, ChainStore) {
        let dir = TempDir::new().unwrap();
        let store = ChainStore::open(dir.path().join("beaconchain.db")).unwrap();
        (dir, store)
    }

    #[cfg(unix)]
    #[test]
    fn test_open_creates_owner_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = open_temp();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_reopen_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("beaconchain.db");
        {
            let store = ChainStore::open(&path).unwrap();
            store.put("blocks", &[1], b"one").unwrap();
        }
        let store = ChainStore::open(&path).unwrap();
        let entries = store.raw_entries("blocks", 10).unwrap();
        assert_eq!(entries, vec![(vec![1], b"one".to_vec())]);
    }

    #[test]
    fn test_entries_come_back_in_key_order() {
        let (_dir, store) = open_temp();
        for k in [5u8, 1, 3, 2, 4] {
            store.put("blocks", &[k], &[k * 10]).unwrap();
        }
        let keys: Vec<Vec<u8>> = store
            .raw_entries("blocks", 10)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![vec![1], vec![2], vec![3], vec![4], vec![5]]);
    }

    #[test]
    fn test_next_entry_walks_forward() {
        let (_dir, store) = open_temp();
        store.put("blocks", &[1], b"a").unwrap();
        store.put("blocks", &[2], b"b").unwrap();

        let scope = store.begin_read().unwrap();
        let first = scope.next_entry("blocks", None).unwrap().unwrap();
        assert_eq!(first.0, vec![1]);
        let second = scope.next_entry("blocks", Some(&first.0)).unwrap().unwrap();
        assert_eq!(second.0, vec![2]);
        assert!(scope.next_entry("blocks", Some(&second.0)).unwrap().is_none());
    }

    #[test]
    fn test_last_key_is_greatest_not_latest() {
        let (_dir, store) = open_temp();
        store.put("blocks", &[9], b"nine").unwrap();
        store.put("blocks", &[3], b"three").unwrap();

        let scope = store.begin_read().unwrap();
        assert_eq!(scope.last_key("blocks").unwrap(), Some(vec![9]));
        assert_eq!(scope.get("blocks", &[3]).unwrap(), Some(b"three".to_vec()));
        assert_eq!(scope.get("blocks", &[4]).unwrap(), None);
    }

    #[test]
    fn test_last_key_of_empty_partition() {
        let (_dir, store) = open_temp();
        store.update(|w| w.create_partition("blocks")).unwrap();
        assert_eq!(store.view(|r| r.last_key("blocks")).unwrap(), None);
    }

    #[test]
    fn test_missing_partition_is_not_found() {
        let (_dir, store) = open_temp();
        let err = store.raw_entries("blocks", 1).unwrap_err();
        assert_eq!(err, StoreError::NotFound("blocks".to_string()));
    }

    #[test]
    fn test_update_aborts_on_error() {
        let (_dir, store) = open_temp();
        let result: StoreResult<()> = store.update(|w| {
            w.put("blocks", &[1], b"x")?;
            Err(StoreError::IoFailure("forced".into()))
        });
        assert!(result.is_err());
        assert!(store.list_partitions().unwrap().is_empty());
        assert_eq!(store.counters().snapshot().write_txns_aborted, 1);
    }

    #[test]
    fn test_create_partition_reports_new() {
        let (_dir, store) = open_temp();
        assert!(store.update(|w| w.create_partition("state")).unwrap());
        assert!(!store.update(|w| w.create_partition("state")).unwrap());
    }

    #[test]
    fn test_read_scope_released_on_drop() {
        let (_dir, store) = open_temp();
        {
            let _scope = store.begin_read().unwrap();
            assert_eq!(store.counters().open_read_txns(), 1);
        }
        assert_eq!(store.counters().open_read_txns(), 0);
    }

    #[test]
    fn test_view_releases_on_error() {
        let (_dir, store) = open_temp();
        let result = store.view(|r| r.ensure_partition("missing"));
        assert!(result.is_err());
        assert_eq!(store.counters().open_read_txns(), 0);
    }

    #[test]
    fn test_close_fails_later_transactions() {
        let (_dir, store) = open_temp();
        store.close();
        assert!(store.is_closed());
        assert_eq!(store.begin_read().err(), Some(StoreError::TransactionClosed));
        assert_eq!(store.stats().err(), Some(StoreError::TransactionClosed));
        assert_eq!(
            store.put("blocks", &[1], b"x").err(),
            Some(StoreError::TransactionClosed)
        );
    }

    #[test]
    fn test_stats_does_not_commit() {
        let (_dir, store) = open_temp();
        let before = store.counters().snapshot().write_txns_committed;
        let sample = store.stats().unwrap();
        assert_eq!(sample.write_txns_committed, before);
        assert_eq!(sample.read_txns_begun, 0);
        assert!(sample.file_bytes > 0);
        assert_eq!(store.counters().snapshot().write_txns_committed, before);
        assert_eq!(store.counters().snapshot().read_txns_begun, 0);
    }

    #[test]
    fn test_stats_reflect_writes() {
        let (_dir, store) = open_temp();
        let s0 = store.stats().unwrap();
        store.put("blocks", &[1], &[0u8; 512]).unwrap();
        store.put("state", &[1], &[0u8; 64]).unwrap();
        store.put("state", &[2], &[0u8; 64]).unwrap();
        let s1 = store.stats().unwrap();
        let delta = s1.delta(&s0);
        assert_eq!(delta.write_txns_committed, 3);
        assert_eq!(s1.partitions, 2);
        assert_eq!(s1.entries, 3);
        assert_eq!(delta.entries, 3);
    }

    #[test]
    fn test_stats_not_blocked_by_open_writer() {
        use std::sync::mpsc;
        use std::time::{Duration, Instant};

        let (_dir, store) = open_temp();
        store.put("blocks", &[1], b"one").unwrap();

        let (held_tx, held_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let shared = &store;
        std::thread::scope(|s| {
            let writer = s.spawn(move || {
                shared.update(|w| {
                    w.put("blocks", &[2], b"two")?;
                    held_tx.send(()).ok();
                    release_rx.recv_timeout(Duration::from_secs(10)).ok();
                    Ok(())
                })
            });
            held_rx.recv_timeout(Duration::from_secs(5)).unwrap();

            let started = Instant::now();
            let sample = store.stats().unwrap();
            assert!(started.elapsed() < Duration::from_secs(1));
            // the uncommitted entry is not visible yet
            assert_eq!(sample.entries, 1);

            release_tx.send(()).unwrap();
            writer.join().unwrap().unwrap();
        });
        assert_eq!(store.stats().unwrap().entries, 2);
    }
}
