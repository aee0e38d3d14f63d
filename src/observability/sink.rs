//! Emission sinks for structured diagnostic records
//!
//! Stats deltas and decode results leave the process as line-delimited
//! JSON objects. Each object carries a `record` field naming its type;
//! the remaining fields are an arbitrary key to numeric-or-string mapping.

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use super::{ObservabilityError, ObservabilityResult};

/// Record type names carried in the `record` field.
pub mod record_type {
    pub const STATS_DELTA: &str = "STATS_DELTA";
    pub const DECODED_RECORD: &str = "DECODED_RECORD";
    pub const SCAN_SUMMARY: &str = "SCAN_SUMMARY";
    pub const RAW_ENTRY: &str = "RAW_ENTRY";
    pub const PARTITION: &str = "PARTITION";
    pub const METADATA: &str = "METADATA";
}

/// A destination for emitted records.
///
/// Shared between the foreground scan and the background monitor, so
/// implementations must be `Send + Sync`.
pub trait RecordSink: Send + Sync {
    /// Emit one record. `fields` should be a JSON object; any other value
    /// is wrapped under a `value` key.
    fn emit(&self, record_type: &str, fields: Value) -> ObservabilityResult<()>;
}

/// A record as it was emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedRecord {
    pub record_type: String,
    pub fields: Map<String, Value>,
}

impl EmittedRecord {
    fn new(record_type: &str, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self {
            record_type: record_type.to_string(),
            fields,
        }
    }

    /// Render as one JSON line (without the trailing newline).
    pub fn to_json_line(&self) -> ObservabilityResult<String> {
        let mut map = self.fields.clone();
        map.insert("record".to_string(), Value::String(self.record_type.clone()));
        serde_json::to_string(&Value::Object(map))
            .map_err(|e| ObservabilityError::new(format!("cannot serialize record: {}", e)))
    }
}

/// Writes one JSON object per line to any writer.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink on the process stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn emit(&self, record_type: &str, fields: Value) -> ObservabilityResult<()> {
        let line = EmittedRecord::new(record_type, fields).to_json_line()?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ObservabilityError::new("sink writer lock poisoned"))?;
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| ObservabilityError::with_source("cannot write record", e))
    }
}

/// In-memory sink for testing.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<EmittedRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records emitted so far, in emission order.
    pub fn records(&self) -> Vec<EmittedRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Records of a single type, in emission order.
    pub fn records_of(&self, record_type: &str) -> Vec<EmittedRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.record_type == record_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record_type: &str, fields: Value) -> ObservabilityResult<()> {
        self.records
            .lock()
            .map_err(|_| ObservabilityError::new("memory sink lock poisoned"))?
            .push(EmittedRecord::new(record_type, fields));
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Arc<S> {
    fn emit(&self, record_type: &str, fields: Value) -> ObservabilityResult<()> {
        (**self).emit(record_type, fields)
    }
}
