//! Chain store collaborator
//!
//! A single `redb` file holding named, ordered partitions of
//! key -> compressed record. This module provides:
//!
//! - `ChainStore`: open with owner-only permissions, scoped read and
//!   write transactions, statistics snapshots
//! - `PartitionCatalog`: the versioned set of partitions to provision
//! - `RangeReader`: lazy decode scans over one partition
//!
//! The inspector only ever reads chain data. Writes exist for
//! provisioning and seeding.

mod catalog;
mod counters;
mod errors;
mod handle;
mod scan;
mod stats;

pub use catalog::{item_key, partition, PartitionCatalog};
pub use counters::{CountersSnapshot, EngineCounters};
pub use errors::{StoreError, StoreResult};
pub use handle::{ChainStore, RawEntry, ReadScope, WriteScope};
pub use scan::{render_key, RangeReader, Scan, ScanEntry, ScanSummary};
pub use stats::{StatsDelta, StatsSample, StoreFootprint};
