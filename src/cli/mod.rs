//! CLI module
//!
//! Commands:
//! - inspect: health monitor plus one decode scan
//! - scan: decode the first entries of a partition
//! - monitor: health monitor only
//! - partitions: list partition names
//! - provision: create the standard partitions
//! - dump: raw entries of a partition
//! - seed: insert sample signed blocks
//! - metadata: look up the well-known chain metadata keys

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, MonitorArgs, ScanArgs, StoreArgs};
pub use commands::{
    dump, inspect, inspect_until, metadata, monitor, monitor_until, partitions, provision, run,
    run_command, scan, seed, InspectReport,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{emit, stdout_sink};
