//! Lifecycle events emitted by the inspector
//!
//! Events are explicit and typed. Every log line produced by the store,
//! scan and monitor paths names one of these.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded (or defaulted)
    ConfigLoaded,
    /// Store file opened
    StoreOpen,
    /// Store handle closed
    StoreClosed,

    // Provisioning
    /// Catalog partitions created (or already present)
    PartitionsProvisioned,
    /// Sample records written
    SeedComplete,

    // Scan
    /// Range scan started
    ScanBegin,
    /// Range scan finished
    ScanComplete,
    /// A single entry failed to decode
    DecodeFailed,
    /// A kind outside the standard fixed/general split was requested
    UnexpectedKind,

    // Monitor
    /// Health monitor started
    MonitorStart,
    /// Health monitor reached its tick bound
    MonitorComplete,
    /// Health monitor stopped by the shutdown signal
    MonitorCancelled,
    /// Health monitor could not take a sample; logged at the error's severity
    MonitorSampleFailed,

    // Process
    /// Shutdown signal received
    ShutdownRequested,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpen => "STORE_OPEN",
            Event::StoreClosed => "STORE_CLOSED",

            Event::PartitionsProvisioned => "PARTITIONS_PROVISIONED",
            Event::SeedComplete => "SEED_COMPLETE",

            Event::ScanBegin => "SCAN_BEGIN",
            Event::ScanComplete => "SCAN_COMPLETE",
            Event::DecodeFailed => "DECODE_FAILED",
            Event::UnexpectedKind => "UNEXPECTED_KIND",

            Event::MonitorStart => "MONITOR_START",
            Event::MonitorComplete => "MONITOR_COMPLETE",
            Event::MonitorCancelled => "MONITOR_CANCELLED",
            Event::MonitorSampleFailed => "MONITOR_SAMPLE_FAILED",

            Event::ShutdownRequested => "SHUTDOWN_REQUESTED",
        }
    }

    /// Returns true if this event should be logged at WARN
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::DecodeFailed | Event::UnexpectedKind)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::StoreOpen,
            Event::StoreClosed,
            Event::PartitionsProvisioned,
            Event::SeedComplete,
            Event::ScanBegin,
            Event::ScanComplete,
            Event::DecodeFailed,
            Event::UnexpectedKind,
            Event::MonitorStart,
            Event::MonitorComplete,
            Event::MonitorCancelled,
            Event::MonitorSampleFailed,
            Event::ShutdownRequested,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_warning_events() {
        assert!(Event::DecodeFailed.is_warning());
        assert!(Event::UnexpectedKind.is_warning());
        assert!(!Event::ScanComplete.is_warning());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::ScanBegin), "SCAN_BEGIN");
        assert_eq!(format!("{}", Event::MonitorCancelled), "MONITOR_CANCELLED");
    }
}
