//! Record decode pipeline
//!
//! decompress -> select strategy -> structural decode
//!
//! The pipeline holds no state beyond its dispatch table, so one decoder
//! can be shared freely across threads. Decoding is all-or-nothing: the
//! outcome is either a complete typed value or a `DecodeError` naming the
//! stage that failed and the byte length it was looking at.

use super::dispatch::{DecoderStrategy, DecoderTable};
use super::errors::{DecodeCause, DecodeError};
use super::kind::RecordKind;
use super::types::ChainRecord;
use super::{fixed, general};
use crate::codec;

/// Result of decoding one stored record.
pub type DecodeOutcome = Result<ChainRecord, DecodeError>;

/// Decodes stored records using a dispatch table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDecoder {
    table: DecoderTable,
}

impl RecordDecoder {
    pub fn new(table: DecoderTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DecoderTable {
        &self.table
    }

    pub fn strategy(&self, kind: RecordKind) -> DecoderStrategy {
        self.table.select(kind)
    }

    /// Decodes one stored (compressed) value as `kind`.
    pub fn decode(&self, raw: &[u8], kind: RecordKind) -> DecodeOutcome {
        let payload = codec::decompress(raw).map_err(|e| DecodeError {
            kind,
            byte_len: raw.len(),
            cause: e.into(),
        })?;

        let decoded = match self.table.select(kind) {
            DecoderStrategy::FixedLayout => fixed::decode(&payload, kind),
            DecoderStrategy::GeneralPurpose => general::decode(&payload, kind),
        };

        decoded.map_err(|e| DecodeError {
            kind,
            byte_len: payload.len(),
            cause: e.into(),
        })
    }

    /// Produces the stored representation of a record: encoded with the
    /// strategy this table selects for its kind, then compressed.
    pub fn encode(&self, record: &ChainRecord) -> Result<Vec<u8>, DecodeCause> {
        let payload = match self.table.select(record.kind()) {
            DecoderStrategy::FixedLayout => fixed::encode(record),
            DecoderStrategy::GeneralPurpose => general::encode(record),
        };
        Ok(codec::compress(&payload)?)
    }
}

/// Decodes one stored value with the standard dispatch table.
pub fn decode_record(raw: &[u8], kind: RecordKind) -> DecodeOutcome {
    RecordDecoder::default().decode(raw, kind)
}

/// Encodes one record with the standard dispatch table.
pub fn encode_record(record: &ChainRecord) -> Result<Vec<u8>, DecodeCause> {
    RecordDecoder::default().encode(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::types::{Checkpoint, SignedBeaconBlock, VoluntaryExit};
    use crate::record::StructuralError;

    fn sample_block() -> ChainRecord {
        ChainRecord::SignedBeaconBlock(SignedBeaconBlock {
            block: None,
            signature: vec![0x5A; 96],
        })
    }

    #[test]
    fn test_fixed_layout_record_decodes() {
        let stored = encode_record(&sample_block()).unwrap();
        assert_eq!(decode_record(&stored, RecordKind::SignedBeaconBlock).unwrap(), sample_block());
    }

    #[test]
    fn test_general_record_decodes() {
        let checkpoint = ChainRecord::Checkpoint(Checkpoint {
            epoch: 9,
            root: vec![1; 32],
        });
        let stored = encode_record(&checkpoint).unwrap();
        assert_eq!(decode_record(&stored, RecordKind::Checkpoint).unwrap(), checkpoint);
    }

    #[test]
    fn test_corrupt_bytes_short_circuit() {
        let err = decode_record(&[0x00, 0x01, 0x02], RecordKind::SignedBeaconBlock).unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(err.byte_len, 3);
        assert_eq!(err.kind, RecordKind::SignedBeaconBlock);
    }

    #[test]
    fn test_structural_failure_reports_decompressed_length() {
        let stored = codec::compress(b"not a frame at all").unwrap();
        let err = decode_record(&stored, RecordKind::VoluntaryExit).unwrap_err();

        assert!(!err.is_corrupt());
        assert_eq!(err.byte_len, b"not a frame at all".len());
    }

    #[test]
    fn test_wrong_strategy_is_structural_failure() {
        // fixed-layout bytes read through a table that treats the kind as general
        let exit = ChainRecord::VoluntaryExit(VoluntaryExit {
            epoch: 1,
            validator_index: 2,
        });
        let stored = encode_record(&exit).unwrap();
        let decoder = RecordDecoder::new(DecoderTable::with_fixed_kinds(Vec::new()));

        let err = decoder.decode(&stored, RecordKind::VoluntaryExit).unwrap_err();
        assert!(matches!(err.cause, DecodeCause::Structural(_)));
    }

    #[test]
    fn test_unrecognized_kind_reaches_general_decoder() {
        let stored = codec::compress(&[0x00]).unwrap();
        let err = decode_record(&stored, RecordKind::Unrecognized(42)).unwrap_err();
        assert_eq!(
            err.cause,
            DecodeCause::Structural(StructuralError::UnknownKind {
                kind: RecordKind::Unrecognized(42),
                layout: "general-purpose",
            })
        );
    }
}
