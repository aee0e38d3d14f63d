//! Range Reader
//!
//! Walks one partition from its first key in ascending key order, decoding
//! each value, and stops after `limit` entries. A scan holds a single read
//! transaction from creation until it is dropped, so every entry it yields
//! comes from the same snapshot. Dropping the scan early releases it.
//!
//! A value that fails to decode is yielded as a failed outcome and the
//! walk continues. Only a store failure ends the walk early.

use std::iter::FusedIterator;

use serde::Serialize;
use serde_json::{json, Value};

use super::errors::StoreResult;
use super::handle::{ChainStore, ReadScope};
use crate::observability::{log_event_with_fields, Event, Timer};
use crate::record::{select_decoder, DecodeOutcome, RecordDecoder, RecordKind};

/// Render a store key: 8-byte keys as a big-endian integer, anything else
/// as hex.
pub fn render_key(key: &[u8]) -> String {
    match <[u8; 8]>::try_from(key) {
        Ok(bytes) => u64::from_be_bytes(bytes).to_string(),
        Err(_) => hex::encode(key),
    }
}

/// One yielded entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    pub key: Vec<u8>,
    pub outcome: DecodeOutcome,
}

impl ScanEntry {
    /// Structured form for an emission sink.
    pub fn to_fields(&self) -> Value {
        match &self.outcome {
            Ok(record) => json!({
                "key": render_key(&self.key),
                "kind": record.kind().as_str(),
                "ok": true,
                "value": serde_json::to_value(record).unwrap_or(Value::Null),
            }),
            Err(err) => json!({
                "key": render_key(&self.key),
                "kind": err.kind.to_string(),
                "ok": false,
                "error": err.code(),
                "reason": err.to_string(),
                "byte_len": err.byte_len,
            }),
        }
    }
}

/// Count of entries visited and of those that failed to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub visited: usize,
    pub failed: usize,
}

impl ScanSummary {
    pub fn succeeded(&self) -> usize {
        self.visited - self.failed
    }
}

/// Opens decode scans over a store.
pub struct RangeReader<'s> {
    store: &'s ChainStore,
    decoder: RecordDecoder,
}

impl<'s> RangeReader<'s> {
    pub fn new(store: &'s ChainStore, decoder: RecordDecoder) -> Self {
        Self { store, decoder }
    }

    /// Begin a scan of at most `limit` entries of `partition`, decoded as
    /// `kind`.
    ///
    /// Fails with `NotFound` if the partition does not exist and with
    /// `TransactionClosed` if the store has been closed.
    pub fn scan(&self, partition: &str, kind: RecordKind, limit: usize) -> StoreResult<Scan<'s>> {
        let scope = self.store.begin_read()?;
        scope.ensure_partition(partition)?;
        scope.counters().increment_scans_opened();

        let strategy = self.decoder.strategy(kind);
        if !kind.is_known() || strategy != select_decoder(kind) {
            log_event_with_fields(
                Event::UnexpectedKind,
                &[("kind", kind.to_string().as_str()), ("strategy", strategy.as_str())],
            );
        }

        let limit_str = limit.to_string();
        let kind_str = kind.to_string();
        log_event_with_fields(
            Event::ScanBegin,
            &[
                ("partition", partition),
                ("kind", kind_str.as_str()),
                ("limit", limit_str.as_str()),
                ("strategy", strategy.as_str()),
            ],
        );

        Ok(Scan {
            scope,
            decoder: self.decoder.clone(),
            partition: partition.to_string(),
            kind,
            limit,
            last_key: None,
            finished: false,
            summary: ScanSummary::default(),
            timer: Timer::new(),
        })
    }
}

/// A lazy, finite, not restartable walk over one partition.
pub struct Scan<'a> {
    scope: ReadScope<'a>,
    decoder: RecordDecoder,
    partition: String,
    kind: RecordKind,
    limit: usize,
    last_key: Option<Vec<u8>>,
    finished: bool,
    summary: ScanSummary,
    timer: Timer,
}

impl Scan<'_> {
    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Counts so far. Final once the iterator is exhausted.
    pub fn summary(&self) -> ScanSummary {
        self.summary
    }
}

impl Iterator for Scan<'_> {
    type Item = StoreResult<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.summary.visited >= self.limit {
            self.finished = true;
            return None;
        }

        let (key, value) = match self
            .scope
            .next_entry(&self.partition, self.last_key.as_deref())
        {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Err(err) => {
                self.finished = true;
                return Some(Err(err));
            }
        };

        self.summary.visited += 1;
        self.scope.counters().increment_entries_visited();

        let outcome = self.decoder.decode(&value, self.kind);
        if let Err(err) = &outcome {
            self.summary.failed += 1;
            let key_str = render_key(&key);
            let len_str = err.byte_len.to_string();
            log_event_with_fields(
                Event::DecodeFailed,
                &[
                    ("partition", self.partition.as_str()),
                    ("key", key_str.as_str()),
                    ("code", err.code()),
                    ("byte_len", len_str.as_str()),
                ],
            );
        }

        self.last_key = Some(key.clone());
        Some(Ok(ScanEntry { key, outcome }))
    }
}

impl FusedIterator for Scan<'_> {}

impl Drop for Scan<'_> {
    fn drop(&mut self) {
        let visited = self.summary.visited.to_string();
        let failed = self.summary.failed.to_string();
        let elapsed = self.timer.elapsed_ms();
        log_event_with_fields(
            Event::ScanComplete,
            &[
                ("partition", self.partition.as_str()),
                ("visited", visited.as_str()),
                ("failed", failed.as_str()),
                ("elapsed_ms", elapsed.as_str()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::types::VoluntaryExit;
    use crate::record::{encode_record, ChainRecord, DecoderTable};
    use crate::store::StoreError;
    use tempfile::TempDir;

    fn exit(index: u64) -> ChainRecord {
        ChainRecord::VoluntaryExit(VoluntaryExit {
            epoch: 10,
            validator_index: index,
        })
    }

    fn store_with_exits(keys: &[u64]) -> (TempDir, ChainStore) {
        let dir = TempDir::new().unwrap();
        let store = ChainStore::open(dir.path().join("beaconchain.db")).unwrap();
        for k in keys {
            let raw = encode_record(&exit(*k)).unwrap();
            store.put("voluntary-exits", &k.to_be_bytes(), &raw).unwrap();
        }
        (dir, store)
    }

    #[test]
    fn test_render_key() {
        assert_eq!(render_key(&42u64.to_be_bytes()), "42");
        assert_eq!(render_key(&[0xde, 0xad]), "dead");
        assert_eq!(render_key(&[]), "");
    }

    #[test]
    fn test_scan_yields_in_key_order() {
        let (_dir, store) = store_with_exits(&[3, 1, 2]);
        let reader = RangeReader::new(&store, RecordDecoder::default());
        let keys: Vec<u64> = reader
            .scan("voluntary-exits", RecordKind::VoluntaryExit, 10)
            .unwrap()
            .map(|e| {
                let entry = e.unwrap();
                assert!(entry.outcome.is_ok());
                u64::from_be_bytes(entry.key.try_into().unwrap())
            })
            .collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_limit_bounds_scan() {
        let (_dir, store) = store_with_exits(&[1, 2, 3, 4]);
        let reader = RangeReader::new(&store, RecordDecoder::default());
        let mut scan = reader
            .scan("voluntary-exits", RecordKind::VoluntaryExit, 2)
            .unwrap();
        assert!(scan.next().is_some());
        assert!(scan.next().is_some());
        assert!(scan.next().is_none());
        assert!(scan.next().is_none());
        assert_eq!(scan.summary(), ScanSummary { visited: 2, failed: 0 });
    }

    #[test]
    fn test_decode_failure_does_not_stop_scan() {
        let (_dir, store) = store_with_exits(&[1, 3]);
        let mut truncated = encode_record(&exit(2)).unwrap();
        truncated.truncate(truncated.len() / 2);
        store
            .put("voluntary-exits", &2u64.to_be_bytes(), &truncated)
            .unwrap();

        let reader = RangeReader::new(&store, RecordDecoder::default());
        let mut scan = reader
            .scan("voluntary-exits", RecordKind::VoluntaryExit, 10)
            .unwrap();
        let entries: Vec<ScanEntry> = scan.by_ref().map(|e| e.unwrap()).collect();

        assert_eq!(entries.len(), 3);
        assert!(entries[0].outcome.is_ok());
        assert!(entries[1].outcome.as_ref().unwrap_err().is_corrupt());
        assert!(entries[2].outcome.is_ok());
        assert_eq!(scan.summary(), ScanSummary { visited: 3, failed: 1 });
        assert_eq!(scan.summary().succeeded(), 2);
    }

    #[test]
    fn test_missing_partition() {
        let (_dir, store) = store_with_exits(&[]);
        let reader = RangeReader::new(&store, RecordDecoder::default());
        let err = reader
            .scan("blocks", RecordKind::SignedBeaconBlock, 1)
            .err()
            .unwrap();
        assert_eq!(err, StoreError::NotFound("blocks".to_string()));
        assert_eq!(store.counters().open_read_txns(), 0);
    }

    #[test]
    fn test_early_drop_releases_transaction() {
        let (_dir, store) = store_with_exits(&[1, 2, 3]);
        let reader = RangeReader::new(&store, RecordDecoder::default());
        {
            let mut scan = reader
                .scan("voluntary-exits", RecordKind::VoluntaryExit, 3)
                .unwrap();
            scan.next();
            assert_eq!(store.counters().open_read_txns(), 1);
        }
        assert_eq!(store.counters().open_read_txns(), 0);
    }

    #[test]
    fn test_custom_table_still_decodes_matching_encoding() {
        let (_dir, store) = store_with_exits(&[]);
        let decoder = RecordDecoder::new(DecoderTable::with_fixed_kinds(vec![]));
        let raw = decoder.encode(&exit(5)).unwrap();
        store.put("voluntary-exits", &5u64.to_be_bytes(), &raw).unwrap();

        let reader = RangeReader::new(&store, decoder);
        let entry = reader
            .scan("voluntary-exits", RecordKind::VoluntaryExit, 1)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(entry.outcome.unwrap(), exit(5));
    }

    #[test]
    fn test_entry_fields() {
        let ok = ScanEntry {
            key: 7u64.to_be_bytes().to_vec(),
            outcome: Ok(exit(7)),
        };
        let fields = ok.to_fields();
        assert_eq!(fields["key"], "7");
        assert_eq!(fields["ok"], true);
        assert_eq!(fields["kind"], "voluntary_exit");
        assert_eq!(fields["value"]["validator_index"], 7);
    }
}
