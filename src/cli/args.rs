//! CLI argument definitions using clap
//!
//! Commands:
//! - chaindb-inspect inspect    --config <path>
//! - chaindb-inspect scan       --config <path> [--partition P] [--kind K] [--limit N]
//! - chaindb-inspect monitor    --config <path> [--interval-ms MS] [--max-ticks N]
//! - chaindb-inspect partitions --config <path>
//! - chaindb-inspect provision  --config <path>
//! - chaindb-inspect dump       --config <path> [--partition P] [--limit N]
//! - chaindb-inspect seed       --config <path> [--count N]
//! - chaindb-inspect metadata   --config <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::config::Config;

/// Inspect a beacon node's chain database
#[derive(Parser, Debug)]
#[command(name = "chaindb-inspect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the store and its configuration live.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Path to configuration file (missing file means defaults)
    #[arg(long, default_value = "./chaindb.json")]
    pub config: PathBuf,

    /// Store file, overrides `db_path`
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Partition to scan, overrides `scan_partition`
    #[arg(long)]
    pub partition: Option<String>,

    /// Record kind to decode as, overrides `scan_kind`
    #[arg(long)]
    pub kind: Option<String>,

    /// Maximum entries, overrides `scan_limit`
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MonitorArgs {
    /// Wait between ticks, overrides `monitor_interval_ms`
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Tick bound, overrides `monitor_max_ticks`
    #[arg(long, conflicts_with = "until_cancelled")]
    pub max_ticks: Option<u64>,

    /// Run until Ctrl-C instead of stopping at a tick bound
    #[arg(long)]
    pub until_cancelled: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the health monitor alongside one decode scan
    Inspect {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        scan: ScanArgs,
        #[command(flatten)]
        monitor: MonitorArgs,
    },

    /// Decode the first entries of one partition
    Scan {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Run only the health monitor
    Monitor {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        monitor: MonitorArgs,
    },

    /// List partition names
    Partitions {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Create the standard partitions if absent
    Provision {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print raw entries of one partition
    Dump {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Insert sample signed blocks
    Seed {
        #[command(flatten)]
        store: StoreArgs,

        /// Number of blocks to insert
        #[arg(long, default_value_t = 5)]
        count: u64,

        /// Target partition, overrides `scan_partition`
        #[arg(long)]
        partition: Option<String>,
    },

    /// Look up the well-known chain metadata keys
    Metadata {
        #[command(flatten)]
        store: StoreArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

impl StoreArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(db) = &self.db {
            config.db_path = db.to_string_lossy().into_owned();
        }
    }
}

impl ScanArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(partition) = &self.partition {
            config.scan_partition = partition.clone();
        }
        if let Some(kind) = &self.kind {
            config.scan_kind = kind.clone();
        }
        if let Some(limit) = self.limit {
            config.scan_limit = limit;
        }
    }
}

impl MonitorArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(interval) = self.interval_ms {
            config.monitor_interval_ms = interval;
        }
        if self.until_cancelled {
            config.monitor_max_ticks = None;
        } else if let Some(bound) = self.max_ticks {
            config.monitor_max_ticks = Some(bound);
        }
    }
}
