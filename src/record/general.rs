//! General-purpose record encoding
//!
//! Records outside the fixed-layout subset are stored as length-delimited
//! protobuf: a varint length prefix followed by exactly that many bytes of
//! message. Unknown fields inside the message are skipped, so records
//! written by newer schemas still decode.

use prost::Message;

use super::errors::StructuralError;
use super::kind::RecordKind;
use super::types::*;

/// Decodes a decompressed general-purpose record of `kind`.
pub fn decode(bytes: &[u8], kind: RecordKind) -> Result<ChainRecord, StructuralError> {
    if bytes.is_empty() {
        return Err(malformed(kind, "empty input"));
    }

    let mut body = bytes;
    let declared = prost::decode_length_delimiter(&mut body)
        .map_err(|e| malformed(kind, format!("length prefix: {}", e)))?;
    if declared != body.len() {
        return Err(StructuralError::LengthMismatch {
            declared,
            actual: body.len(),
        });
    }

    match kind {
        RecordKind::SignedBeaconBlock => decode_message::<SignedBeaconBlock>(body),
        RecordKind::BeaconBlock => decode_message::<BeaconBlock>(body),
        RecordKind::Attestation => decode_message::<Attestation>(body),
        RecordKind::SignedAggregateAttestationAndProof => {
            decode_message::<SignedAggregateAttestationAndProof>(body)
        }
        RecordKind::Deposit => decode_message::<Deposit>(body),
        RecordKind::AttesterSlashing => decode_message::<AttesterSlashing>(body),
        RecordKind::ProposerSlashing => decode_message::<ProposerSlashing>(body),
        RecordKind::VoluntaryExit => decode_message::<VoluntaryExit>(body),
        RecordKind::StateSummary => decode_message::<StateSummary>(body),
        RecordKind::Checkpoint => decode_message::<Checkpoint>(body),
        RecordKind::Eth1Data => decode_message::<Eth1Data>(body),
        RecordKind::Unrecognized(_) => Err(StructuralError::UnknownKind {
            kind,
            layout: "general-purpose",
        }),
    }
}

fn decode_message<T: ChainObject>(body: &[u8]) -> Result<ChainRecord, StructuralError> {
    T::decode(body)
        .map(ChainObject::into_record)
        .map_err(|e| malformed(T::KIND, e.to_string()))
}

/// Encodes a record as length-delimited protobuf.
pub fn encode(record: &ChainRecord) -> Vec<u8> {
    match record {
        ChainRecord::SignedBeaconBlock(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::BeaconBlock(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::Attestation(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::SignedAggregateAttestationAndProof(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::Deposit(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::AttesterSlashing(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::ProposerSlashing(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::VoluntaryExit(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::StateSummary(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::Checkpoint(v) => v.encode_length_delimited_to_vec(),
        ChainRecord::Eth1Data(v) => v.encode_length_delimited_to_vec(),
    }
}

fn malformed(kind: RecordKind, reason: impl Into<String>) -> StructuralError {
    StructuralError::MalformedGeneralLayout {
        kind,
        reason: reason.into(),
    }
}
