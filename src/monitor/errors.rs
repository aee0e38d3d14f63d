//! Monitor error and exit types
//!
//! Error codes:
//! - CHAINDB_MONITOR_COMPLETION_DROPPED
//! - CHAINDB_MONITOR_TASK_FAILED

use thiserror::Error;

use crate::store::StoreError;

/// How the monitor stopped. This is what the completion channel carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorExit {
    /// The tick counter passed the configured bound
    TickBoundReached { ticks: u64, deltas: u64 },
    /// The shutdown signal fired
    Cancelled { ticks: u64, deltas: u64 },
    /// A statistics sample could not be taken
    SampleFailed { tick: u64, error: StoreError },
}

impl MonitorExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorExit::TickBoundReached { .. } => "tick_bound_reached",
            MonitorExit::Cancelled { .. } => "cancelled",
            MonitorExit::SampleFailed { .. } => "sample_failed",
        }
    }

    /// Deltas emitted before the monitor stopped, if it stopped cleanly.
    pub fn deltas(&self) -> Option<u64> {
        match self {
            MonitorExit::TickBoundReached { deltas, .. } | MonitorExit::Cancelled { deltas, .. } => {
                Some(*deltas)
            }
            MonitorExit::SampleFailed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, MonitorExit::SampleFailed { .. })
    }
}

#[derive(Debug, Error)]
pub enum MonitorError {
    /// The monitor task ended without reporting how it stopped
    #[error("monitor completion channel dropped")]
    CompletionDropped,

    /// The monitor task panicked or was aborted
    #[error("monitor task failed: {0}")]
    TaskFailed(String),
}

impl MonitorError {
    pub fn code(&self) -> &'static str {
        match self {
            MonitorError::CompletionDropped => "CHAINDB_MONITOR_COMPLETION_DROPPED",
            MonitorError::TaskFailed(_) => "CHAINDB_MONITOR_TASK_FAILED",
        }
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_deltas() {
        let exit = MonitorExit::TickBoundReached { ticks: 3, deltas: 1 };
        assert_eq!(exit.deltas(), Some(1));
        assert!(!exit.is_failure());

        let failed = MonitorExit::SampleFailed {
            tick: 2,
            error: StoreError::TransactionClosed,
        };
        assert_eq!(failed.deltas(), None);
        assert!(failed.is_failure());
        assert_eq!(failed.as_str(), "sample_failed");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            MonitorError::CompletionDropped.code(),
            "CHAINDB_MONITOR_COMPLETION_DROPPED"
        );
        assert!(MonitorError::TaskFailed("panic".into())
            .to_string()
            .contains("panic"));
    }
}
