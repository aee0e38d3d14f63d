//! Store error types
//!
//! Error codes:
//! - CHAINDB_STORE_NOT_FOUND (ERROR severity)
//! - CHAINDB_STORE_TRANSACTION_CLOSED (ERROR severity)
//! - CHAINDB_STORE_IO_FAILURE (FATAL severity)
//!
//! Every `redb` error type converts into one of these three.

use std::io;

use thiserror::Error;

use crate::observability::Severity;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The named partition does not exist in the store
    #[error("partition not found: {0}")]
    NotFound(String),

    /// The store handle was closed before the transaction could start
    #[error("store transaction closed")]
    TransactionClosed,

    /// Underlying file or engine failure
    #[error("store I/O failure: {0}")]
    IoFailure(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "CHAINDB_STORE_NOT_FOUND",
            StoreError::TransactionClosed => "CHAINDB_STORE_TRANSACTION_CLOSED",
            StoreError::IoFailure(_) => "CHAINDB_STORE_IO_FAILURE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StoreError::IoFailure(_) => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::IoFailure(err.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(err: redb::TableError) -> Self {
        match err {
            redb::TableError::TableDoesNotExist(name) => StoreError::NotFound(name),
            other => StoreError::IoFailure(other.to_string()),
        }
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(err: redb::DatabaseError) -> Self {
        StoreError::IoFailure(err.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(err: redb::TransactionError) -> Self {
        StoreError::IoFailure(err.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(err: redb::StorageError) -> Self {
        StoreError::IoFailure(err.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(err: redb::CommitError) -> Self {
        StoreError::IoFailure(err.to_string())
    }
}
