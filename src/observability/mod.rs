//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Lifecycle event tracing
//! - Emission sinks for stats deltas and decode results (stdout)
//!
//! # Usage
//!
//! ```ignore
//! use chaindb_inspect::observability::{Logger, Event, ObservationScope, log_event_with_fields};
//!
//! Logger::info("SCAN_COMPLETE", &[("visited", "5")]);
//! log_event_with_fields(Event::StoreOpen, &[("path", "beaconchain.db")]);
//!
//! let scope = ObservationScope::begin("PROVISION", &[("version", "1")]);
//! // ... do work ...
//! scope.complete(&[("created", "21")]);
//! ```

mod events;
mod logger;
mod scope;
mod sink;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};
pub use sink::{record_type, EmittedRecord, JsonLinesSink, MemorySink, RecordSink};

use std::fmt;
use std::io;

/// Observability error code
///
/// Format: CHAINDB_CATEGORY_NAME
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservabilityErrorCode {
    /// Observability operation failed
    ObservabilityFailed,
}

impl ObservabilityErrorCode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservabilityErrorCode::ObservabilityFailed => "CHAINDB_OBSERVABILITY_FAILED",
        }
    }
}

impl fmt::Display for ObservabilityErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observability error
///
/// Observability errors are ERROR severity only and never abort a scan
/// or the monitor on their own.
#[derive(Debug)]
pub struct ObservabilityError {
    code: ObservabilityErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl ObservabilityError {
    /// Create a new observability error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: ObservabilityErrorCode::ObservabilityFailed,
            message: message.into(),
            source: None,
        }
    }

    /// Create with source error
    pub fn with_source(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ObservabilityErrorCode::ObservabilityFailed,
            message: message.into(),
            source: Some(source),
        }
    }
}

impl fmt::Display for ObservabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ObservabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;

fn event_severity(event: Event) -> Severity {
    if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    let severity = event_severity(event);
    Logger::log(severity, event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = event_severity(event);
    Logger::log(severity, event.as_str(), fields);
}

/// Log a failure event at the severity of the error that caused it
pub fn log_event_at(event: Event, severity: Severity, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}
