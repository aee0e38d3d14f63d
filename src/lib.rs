//! chaindb-inspect - typed record decoding and health monitoring for a
//! beacon node's embedded chain database
//!
//! - `codec`: snappy block framing of stored values
//! - `record`: record kinds, decoder dispatch and the decode pipeline
//! - `store`: store handle, partition catalog, range reader, statistics
//! - `monitor`: periodic statistics deltas on a background task
//! - `observability`: structured logs and the record emission sink
//! - `cli`: command-line front end

pub mod cli;
pub mod codec;
pub mod monitor;
pub mod observability;
pub mod record;
pub mod store;
