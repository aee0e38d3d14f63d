//! Output handling for CLI
//!
//! - Emitted records: JSON lines on stdout
//! - Logs: JSON lines on stderr (see `observability::Logger`)

use std::sync::Arc;

use serde_json::Value;

use super::errors::CliResult;
use crate::observability::{JsonLinesSink, RecordSink};

/// Value bytes shown in a raw dump.
pub const DUMP_PREFIX_LEN: usize = 32;

/// Sink writing one JSON object per line to stdout
pub fn stdout_sink() -> Arc<dyn RecordSink> {
    Arc::new(JsonLinesSink::stdout())
}

/// Emit one record, turning sink failures into CLI errors
pub fn emit(sink: &dyn RecordSink, record_type: &str, fields: Value) -> CliResult<()> {
    sink.emit(record_type, fields)?;
    Ok(())
}

/// Hex of at most `DUMP_PREFIX_LEN` leading bytes
pub fn value_prefix(value: &[u8]) -> String {
    hex::encode(&value[..value.len().min(DUMP_PREFIX_LEN)])
}
