//! CLI-specific error types
//!
//! Every failure that reaches `main` is one of these; it prints the code
//! and message to stderr and exits non-zero.

use std::fmt;
use std::io;

use crate::monitor::{MonitorError, MonitorExit};
use crate::observability::ObservabilityError;
use crate::record::DecodeCause;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or override error
    ConfigError,
    /// I/O error (stdout, runtime, signals)
    IoError,
    /// Store access failed
    StoreError,
    /// The health monitor stopped on a failure
    MonitorFailed,
    /// A sample record could not be encoded
    EncodeFailed,
    /// Seed keys could not continue the partition's sequence
    SeedFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CHAINDB_CLI_CONFIG_ERROR",
            Self::IoError => "CHAINDB_CLI_IO_ERROR",
            Self::StoreError => "CHAINDB_CLI_STORE_ERROR",
            Self::MonitorFailed => "CHAINDB_CLI_MONITOR_FAILED",
            Self::EncodeFailed => "CHAINDB_CLI_ENCODE_FAILED",
            Self::SeedFailed => "CHAINDB_CLI_SEED_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Monitor stopped on a failure
    pub fn monitor_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::MonitorFailed, msg)
    }

    /// Seed keys cannot follow the existing ones
    pub fn seed_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::SeedFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::StoreError, format!("{} ({})", e, e.code()))
    }
}

impl From<ObservabilityError> for CliError {
    fn from(e: ObservabilityError) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<MonitorError> for CliError {
    fn from(e: MonitorError) -> Self {
        Self::monitor_failed(format!("{} ({})", e, e.code()))
    }
}

impl From<DecodeCause> for CliError {
    fn from(e: DecodeCause) -> Self {
        Self::new(CliErrorCode::EncodeFailed, e.to_string())
    }
}

/// A monitor that stopped on a failed sample is a command failure.
pub fn check_monitor_exit(exit: MonitorExit) -> CliResult<MonitorExit> {
    match exit {
        MonitorExit::SampleFailed { tick, error } => Err(CliError::monitor_failed(format!(
            "sample failed on tick {}: {} ({})",
            tick,
            error,
            error.code()
        ))),
        other => Ok(other),
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::config_error("monitor_interval_ms must be > 0");
        assert_eq!(
            err.to_string(),
            "CHAINDB_CLI_CONFIG_ERROR: monitor_interval_ms must be > 0"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let err: CliError = StoreError::NotFound("blocks".into()).into();
        assert_eq!(err.code(), &CliErrorCode::StoreError);
        assert!(err.message().contains("blocks"));
        assert!(err.message().contains("CHAINDB_STORE_NOT_FOUND"));
    }

    #[test]
    fn test_failed_monitor_exit_is_error() {
        let exit = MonitorExit::SampleFailed {
            tick: 2,
            error: StoreError::TransactionClosed,
        };
        let err = check_monitor_exit(exit).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::MonitorFailed);

        let ok = MonitorExit::TickBoundReached { ticks: 3, deltas: 1 };
        assert_eq!(check_monitor_exit(ok.clone()).unwrap(), ok);
    }
}
