//! Codec error types
//!
//! Error codes:
//! - CHAINDB_CODEC_CORRUPT

use thiserror::Error;

/// Decompression failure.
///
/// There is exactly one kind: the stored bytes are not a valid compressed
/// record. The codec never returns partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("corrupt compressed record ({len} bytes): {reason}")]
    Corrupt { len: usize, reason: String },
}

impl CodecError {
    pub(crate) fn corrupt(len: usize, reason: impl Into<String>) -> Self {
        CodecError::Corrupt {
            len,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Corrupt { .. } => "CHAINDB_CODEC_CORRUPT",
        }
    }

    /// Length of the input that failed to decompress
    pub fn byte_len(&self) -> usize {
        match self {
            CodecError::Corrupt { len, .. } => *len,
        }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
