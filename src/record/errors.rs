//! Record decode error types
//!
//! Error codes:
//! - CHAINDB_RECORD_MALFORMED_FIXED
//! - CHAINDB_RECORD_MALFORMED_GENERAL
//! - CHAINDB_RECORD_LENGTH_MISMATCH
//! - CHAINDB_RECORD_UNKNOWN_KIND
//! - CHAINDB_CODEC_CORRUPT (wrapped from the codec)
//!
//! Decode failures are per-record: they are captured into the outcome of
//! that record and never abort a scan.

use thiserror::Error;

use super::kind::RecordKind;
use crate::codec::CodecError;

/// Failure to decode decompressed bytes into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("malformed fixed-layout {kind} record: {reason}")]
    MalformedFixedLayout { kind: RecordKind, reason: String },

    #[error("malformed general-purpose {kind} record: {reason}")]
    MalformedGeneralLayout { kind: RecordKind, reason: String },

    #[error("declared length {declared} does not match actual length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("no {layout} schema for record kind {kind}")]
    UnknownKind { kind: RecordKind, layout: &'static str },
}

impl StructuralError {
    pub fn code(&self) -> &'static str {
        match self {
            StructuralError::MalformedFixedLayout { .. } => "CHAINDB_RECORD_MALFORMED_FIXED",
            StructuralError::MalformedGeneralLayout { .. } => "CHAINDB_RECORD_MALFORMED_GENERAL",
            StructuralError::LengthMismatch { .. } => "CHAINDB_RECORD_LENGTH_MISMATCH",
            StructuralError::UnknownKind { .. } => "CHAINDB_RECORD_UNKNOWN_KIND",
        }
    }
}

/// Originating cause of a failed decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeCause {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// A failed decode of one stored record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} record ({byte_len} bytes) failed to decode: {cause}")]
pub struct DecodeError {
    /// Kind the caller asked for
    pub kind: RecordKind,
    /// Byte length involved: the stored length for codec failures, the
    /// decompressed length for structural failures
    pub byte_len: usize,
    #[source]
    pub cause: DecodeCause,
}

impl DecodeError {
    pub fn code(&self) -> &'static str {
        match &self.cause {
            DecodeCause::Codec(e) => e.code(),
            DecodeCause::Structural(e) => e.code(),
        }
    }

    /// Returns whether the stored bytes failed to decompress.
    pub fn is_corrupt(&self) -> bool {
        matches!(self.cause, DecodeCause::Codec(_))
    }
}
