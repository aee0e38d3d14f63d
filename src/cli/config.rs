//! Configuration file
//!
//! JSON, every field optional. A missing file means all defaults;
//! command-line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::monitor::MonitorConfig;
use crate::record::{DecoderTable, RecordKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Store file
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Wait between monitor ticks
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,

    /// Monitor tick bound; `null` runs until cancelled
    #[serde(default = "default_monitor_max_ticks")]
    pub monitor_max_ticks: Option<u64>,

    /// Default partition for scan, dump and seed
    #[serde(default = "default_scan_partition")]
    pub scan_partition: String,

    /// Default record kind for scan
    #[serde(default = "default_scan_kind")]
    pub scan_kind: String,

    /// Default scan bound
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,

    /// Kinds decoded with the fixed layout; absent means the standard set
    #[serde(default)]
    pub fixed_layout_kinds: Option<Vec<String>>,
}

fn default_db_path() -> String {
    "beaconchain.db".to_string()
}
fn default_monitor_interval_ms() -> u64 {
    2000
}
fn default_monitor_max_ticks() -> Option<u64> {
    Some(2)
}
fn default_scan_partition() -> String {
    "blocks".to_string()
}
fn default_scan_kind() -> String {
    "signed_beacon_block".to_string()
}
fn default_scan_limit() -> usize {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            monitor_interval_ms: default_monitor_interval_ms(),
            monitor_max_ticks: default_monitor_max_ticks(),
            scan_partition: default_scan_partition(),
            scan_kind: default_scan_kind(),
            scan_limit: default_scan_limit(),
            fixed_layout_kinds: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        Ok(config)
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> CliResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate after overrides have been applied
    pub fn validate(&self) -> CliResult<()> {
        if self.db_path.is_empty() {
            return Err(CliError::config_error("db_path must not be empty"));
        }

        if self.monitor_interval_ms == 0 {
            return Err(CliError::config_error("monitor_interval_ms must be > 0"));
        }

        if self.scan_partition.is_empty() {
            return Err(CliError::config_error("scan_partition must not be empty"));
        }

        self.scan_kind()?;
        self.decoder_table()?;

        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.db_path)
    }

    pub fn scan_kind(&self) -> CliResult<RecordKind> {
        parse_kind(&self.scan_kind)
    }

    pub fn decoder_table(&self) -> CliResult<DecoderTable> {
        match &self.fixed_layout_kinds {
            None => Ok(DecoderTable::STANDARD),
            Some(names) => {
                let kinds = names
                    .iter()
                    .map(|name| parse_kind(name))
                    .collect::<CliResult<Vec<_>>>()?;
                Ok(DecoderTable::with_fixed_kinds(kinds))
            }
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_millis(self.monitor_interval_ms),
            max_ticks: self.monitor_max_ticks,
        }
    }
}

fn parse_kind(name: &str) -> CliResult<RecordKind> {
    name.parse::<RecordKind>()
        .map_err(|e| CliError::config_error(format!("Invalid record kind '{}': {}", name, e)))
}
