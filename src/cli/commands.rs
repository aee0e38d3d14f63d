//! CLI command implementations
//!
//! Every command resolves its configuration (file, then flags), validates
//! it, opens the store and reports through an emission sink. Commands
//! that run the health monitor drive it on a tokio runtime of their own,
//! and stop it (and any scan still running) on the first interrupt.

use std::future::Future;
use std::io;
use std::ops::RangeInclusive;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;

use crate::monitor::{HealthMonitor, MonitorExit, MonitorHandle};
use crate::observability::{log_event, log_event_with_fields, record_type, Event, Logger, RecordSink};
use crate::record::types::SignedBeaconBlock;
use crate::record::{ChainRecord, RecordDecoder};
use crate::store::{
    item_key, render_key, ChainStore, PartitionCatalog, RangeReader, ScanSummary, StoreError,
};

use super::args::{Command, StoreArgs};
use super::config::Config;
use super::errors::{check_monitor_exit, CliError, CliResult};
use super::io::{emit, stdout_sink, value_prefix};

/// What `inspect` observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub scan: ScanSummary,
    pub monitor: MonitorExit,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let sink = stdout_sink();
    match cmd {
        Command::Inspect {
            store,
            scan,
            monitor,
        } => {
            let config = resolve(&store, |c| {
                scan.apply(c);
                monitor.apply(c);
            })?;
            inspect(&config, sink).map(|_| ())
        }
        Command::Scan { store, scan } => {
            let config = resolve(&store, |c| scan.apply(c))?;
            self::scan(&config, sink.as_ref()).map(|_| ())
        }
        Command::Monitor { store, monitor } => {
            let config = resolve(&store, |c| monitor.apply(c))?;
            self::monitor(&config, sink).map(|_| ())
        }
        Command::Partitions { store } => {
            let config = resolve(&store, |_| {})?;
            partitions(&config, sink.as_ref()).map(|_| ())
        }
        Command::Provision { store } => {
            let config = resolve(&store, |_| {})?;
            provision(&config).map(|_| ())
        }
        Command::Dump { store, scan } => {
            let config = resolve(&store, |c| scan.apply(c))?;
            dump(&config, sink.as_ref()).map(|_| ())
        }
        Command::Seed {
            store,
            count,
            partition,
        } => {
            let config = resolve(&store, |c| {
                if let Some(p) = partition {
                    c.scan_partition = p;
                }
            })?;
            seed(&config, count).map(|_| ())
        }
        Command::Metadata { store } => {
            let config = resolve(&store, |_| {})?;
            metadata(&config, sink.as_ref()).map(|_| ())
        }
    }
}

/// Load the config file (or defaults), apply flag overrides, validate.
fn resolve(store: &StoreArgs, overrides: impl FnOnce(&mut Config)) -> CliResult<Config> {
    let from_file = store.config.exists();
    let mut config = Config::load_or_default(&store.config)?;
    store.apply(&mut config);
    overrides(&mut config);
    config.validate()?;

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("db_path", config.db_path.as_str()),
            ("source", if from_file { "file" } else { "defaults" }),
        ],
    );
    Ok(config)
}

fn open_store(config: &Config) -> CliResult<ChainStore> {
    Ok(ChainStore::open(config.db_path())?)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))
}

/// Open the store, start the health monitor, run one decode scan while it
/// samples, then wait for the monitor to finish. Ctrl-C stops both.
pub fn inspect(config: &Config, sink: Arc<dyn RecordSink>) -> CliResult<InspectReport> {
    inspect_until(config, sink, tokio::signal::ctrl_c())
}

/// `inspect`, stopped by `interrupt` instead of Ctrl-C.
pub fn inspect_until<I>(
    config: &Config,
    sink: Arc<dyn RecordSink>,
    interrupt: I,
) -> CliResult<InspectReport>
where
    I: Future<Output = io::Result<()>>,
{
    let store = Arc::new(open_store(config)?);
    let report = runtime()?.block_on(inspect_async(Arc::clone(&store), config, sink, interrupt));
    store.close();
    report
}

async fn inspect_async<I>(
    store: Arc<ChainStore>,
    config: &Config,
    sink: Arc<dyn RecordSink>,
    interrupt: I,
) -> CliResult<InspectReport>
where
    I: Future<Output = io::Result<()>>,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = HealthMonitor::new(Arc::clone(&store), Arc::clone(&sink), config.monitor_config())
        .spawn(shutdown_rx.clone());

    let scan_config = config.clone();
    let scan_sink = Arc::clone(&sink);
    let mut scan = tokio::task::spawn_blocking(move || {
        scan_with(&store, &scan_config, scan_sink.as_ref(), Some(&shutdown_rx))
    });

    tokio::pin!(interrupt);
    let mut interrupted = false;
    let joined = loop {
        tokio::select! {
            joined = &mut scan => break joined,
            signal = interrupt.as_mut(), if !interrupted => {
                interrupted = true;
                forward_interrupt(signal, &shutdown_tx);
            }
        }
    };
    let scanned = joined.map_err(|e| CliError::io_error(format!("scan task failed: {}", e)))?;

    match scanned {
        Ok(summary) => {
            let exit =
                wait_for_monitor(handle, &shutdown_tx, interrupt.as_mut(), interrupted).await?;
            Ok(InspectReport {
                scan: summary,
                monitor: exit,
            })
        }
        Err(err) => {
            let _ = shutdown_tx.send(true);
            let _ = handle.wait().await;
            Err(err)
        }
    }
}

/// Wait for the monitor, forwarding `interrupt` as the shutdown signal
/// unless it has already fired.
async fn wait_for_monitor<I>(
    handle: MonitorHandle,
    shutdown: &watch::Sender<bool>,
    mut interrupt: Pin<&mut I>,
    mut interrupted: bool,
) -> CliResult<MonitorExit>
where
    I: Future<Output = io::Result<()>>,
{
    let wait = handle.wait();
    tokio::pin!(wait);

    let exit = loop {
        tokio::select! {
            exit = &mut wait => break exit,
            signal = interrupt.as_mut(), if !interrupted => {
                interrupted = true;
                forward_interrupt(signal, shutdown);
            }
        }
    };

    check_monitor_exit(exit?)
}

fn forward_interrupt(signal: io::Result<()>, shutdown: &watch::Sender<bool>) {
    match signal {
        Ok(()) => {
            log_event(Event::ShutdownRequested);
            let _ = shutdown.send(true);
        }
        Err(e) => {
            let reason = e.to_string();
            Logger::warn("SIGNAL_UNAVAILABLE", &[("reason", reason.as_str())]);
        }
    }
}

/// Decode the first `scan_limit` entries of `scan_partition`.
pub fn scan(config: &Config, sink: &dyn RecordSink) -> CliResult<ScanSummary> {
    let store = open_store(config)?;
    scan_with(&store, config, sink, None)
}

/// Decode and emit entries until the limit, or until `shutdown` is set.
fn scan_with(
    store: &ChainStore,
    config: &Config,
    sink: &dyn RecordSink,
    shutdown: Option<&watch::Receiver<bool>>,
) -> CliResult<ScanSummary> {
    let kind = config.scan_kind()?;
    let reader = RangeReader::new(store, RecordDecoder::new(config.decoder_table()?));

    let mut scan = reader.scan(&config.scan_partition, kind, config.scan_limit)?;
    let mut cancelled = false;
    loop {
        if shutdown.is_some_and(|rx| *rx.borrow()) {
            cancelled = true;
            break;
        }
        let Some(entry) = scan.next() else {
            break;
        };
        emit(sink, record_type::DECODED_RECORD, entry?.to_fields())?;
    }
    let summary = scan.summary();
    drop(scan);

    emit(
        sink,
        record_type::SCAN_SUMMARY,
        json!({
            "partition": config.scan_partition,
            "kind": kind.as_str(),
            "limit": config.scan_limit,
            "visited": summary.visited,
            "failed": summary.failed,
            "cancelled": cancelled,
        }),
    )?;
    Ok(summary)
}

/// Run only the health monitor, until its bound or Ctrl-C.
pub fn monitor(config: &Config, sink: Arc<dyn RecordSink>) -> CliResult<MonitorExit> {
    monitor_until(config, sink, tokio::signal::ctrl_c())
}

/// `monitor`, stopped by `interrupt` instead of Ctrl-C.
pub fn monitor_until<I>(
    config: &Config,
    sink: Arc<dyn RecordSink>,
    interrupt: I,
) -> CliResult<MonitorExit>
where
    I: Future<Output = io::Result<()>>,
{
    let store = Arc::new(open_store(config)?);
    let monitored = Arc::clone(&store);
    let monitor_config = config.monitor_config();
    let result = runtime()?.block_on(async move {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = HealthMonitor::new(monitored, sink, monitor_config).spawn(shutdown_rx);
        tokio::pin!(interrupt);
        wait_for_monitor(handle, &shutdown_tx, interrupt.as_mut(), false).await
    });
    store.close();
    result
}

/// List partition names in store order.
pub fn partitions(config: &Config, sink: &dyn RecordSink) -> CliResult<Vec<String>> {
    let store = open_store(config)?;
    let names = store.list_partitions()?;
    for (index, name) in names.iter().enumerate() {
        emit(
            sink,
            record_type::PARTITION,
            json!({ "index": index, "name": name }),
        )?;
    }
    Ok(names)
}

/// Create the standard catalog's partitions. Returns how many were new.
pub fn provision(config: &Config) -> CliResult<usize> {
    let store = open_store(config)?;
    let catalog = PartitionCatalog::standard();
    let created = catalog.provision(&store)?;

    let version = catalog.version().to_string();
    let created_str = created.to_string();
    let total = catalog.partitions().len().to_string();
    log_event_with_fields(
        Event::PartitionsProvisioned,
        &[
            ("version", version.as_str()),
            ("created", created_str.as_str()),
            ("total", total.as_str()),
        ],
    );
    Ok(created)
}

/// Print raw entries of `scan_partition` without decoding them.
pub fn dump(config: &Config, sink: &dyn RecordSink) -> CliResult<usize> {
    let store = open_store(config)?;
    let entries = store.raw_entries(&config.scan_partition, config.scan_limit)?;
    for (key, value) in &entries {
        emit(
            sink,
            record_type::RAW_ENTRY,
            json!({
                "partition": config.scan_partition,
                "key": render_key(key),
                "value_len": value.len(),
                "value_prefix": value_prefix(value),
            }),
        )?;
    }
    Ok(entries.len())
}

/// Append `count` sample signed blocks to `scan_partition` in one write
/// transaction, keyed by the big-endian sequence numbers that follow the
/// partition's greatest key.
pub fn seed(config: &Config, count: u64) -> CliResult<u64> {
    let store = open_store(config)?;
    let decoder = RecordDecoder::new(config.decoder_table()?);
    let partition = config.scan_partition.as_str();

    let last = match store.view(|r| r.last_key(partition)) {
        Ok(key) => key,
        Err(StoreError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    let mut encoded = Vec::new();
    for seq in seed_sequence(last.as_deref(), count)? {
        let record = ChainRecord::from(SignedBeaconBlock::sample(seq));
        encoded.push((seq.to_be_bytes(), decoder.encode(&record)?));
    }

    store.update(|w| {
        for (key, value) in &encoded {
            w.put(partition, key, value)?;
        }
        Ok(())
    })?;

    let count_str = count.to_string();
    log_event_with_fields(
        Event::SeedComplete,
        &[("partition", partition), ("count", count_str.as_str())],
    );
    Ok(count)
}

/// Sequence numbers for `count` entries after the stored key `last`.
fn seed_sequence(last: Option<&[u8]>, count: u64) -> CliResult<RangeInclusive<u64>> {
    let previous = match last {
        None => 0,
        Some(key) => {
            let bytes = <[u8; 8]>::try_from(key).map_err(|_| {
                CliError::seed_failed(format!(
                    "last key {} is not an 8-byte sequence number",
                    render_key(key)
                ))
            })?;
            u64::from_be_bytes(bytes)
        }
    };
    let exhausted =
        || CliError::seed_failed(format!("{} keys after {} overflow u64", count, previous));

    let first = previous.checked_add(1).ok_or_else(exhausted)?;
    let end = match count.checked_sub(1) {
        Some(extra) => first.checked_add(extra).ok_or_else(exhausted)?,
        // count == 0: first > previous, so this is empty
        None => previous,
    };
    Ok(first..=end)
}

/// Look up every well-known metadata key. Returns how many are present.
pub fn metadata(config: &Config, sink: &dyn RecordSink) -> CliResult<usize> {
    let store = open_store(config)?;
    let scope = store.begin_read()?;

    let mut present = 0;
    for (partition, key) in item_key::ALL {
        let value = match scope.get(partition, key) {
            Ok(value) => value,
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };
        if value.is_some() {
            present += 1;
        }
        emit(
            sink,
            record_type::METADATA,
            json!({
                "partition": partition,
                "key": String::from_utf8_lossy(key),
                "present": value.is_some(),
                "value_len": value.as_ref().map(Vec::len),
                "value_prefix": value.as_deref().map(value_prefix),
            }),
        )?;
    }
    Ok(present)
}
