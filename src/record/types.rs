//! Chain-object payloads
//!
//! These shapes are opaque to the decode pipeline: it only needs to know
//! which kind a stored value is and how to materialize it. Each type
//! carries a protobuf schema (general-purpose encoding) and serializes to
//! JSON with byte fields rendered as hex for the emission sink. The
//! fixed-layout schemas live in `fixed.rs`.

use serde::{Serialize, Serializer};

use super::kind::RecordKind;

fn hex_bytes<T: AsRef<[u8]>, S: Serializer>(bytes: &T, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes.as_ref()))
}

fn hex_list<S: Serializer>(items: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(items.iter().map(hex::encode))
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct Checkpoint {
    #[prost(uint64, tag = "1")]
    pub epoch: u64,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(serialize_with = "hex_bytes")]
    pub root: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct AttestationData {
    #[prost(uint64, tag = "1")]
    pub slot: u64,
    #[prost(uint64, tag = "2")]
    pub committee_index: u64,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "hex_bytes")]
    pub beacon_block_root: Vec<u8>,
    #[prost(message, optional, tag = "4")]
    pub source: Option<Checkpoint>,
    #[prost(message, optional, tag = "5")]
    pub target: Option<Checkpoint>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct Attestation {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(serialize_with = "hex_bytes")]
    pub aggregation_bits: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub data: Option<AttestationData>,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct AggregateAttestationAndProof {
    #[prost(uint64, tag = "1")]
    pub aggregator_index: u64,
    #[prost(message, optional, tag = "2")]
    pub aggregate: Option<Attestation>,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "hex_bytes")]
    pub selection_proof: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct SignedAggregateAttestationAndProof {
    #[prost(message, optional, tag = "1")]
    pub message: Option<AggregateAttestationAndProof>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(serialize_with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct IndexedAttestation {
    #[prost(uint64, repeated, tag = "1")]
    pub attesting_indices: Vec<u64>,
    #[prost(message, optional, tag = "2")]
    pub data: Option<AttestationData>,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct AttesterSlashing {
    #[prost(message, optional, tag = "1")]
    pub attestation_1: Option<IndexedAttestation>,
    #[prost(message, optional, tag = "2")]
    pub attestation_2: Option<IndexedAttestation>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct BeaconBlockHeader {
    #[prost(uint64, tag = "1")]
    pub slot: u64,
    #[prost(uint64, tag = "2")]
    pub proposer_index: u64,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "hex_bytes")]
    pub parent_root: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    #[serde(serialize_with = "hex_bytes")]
    pub state_root: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    #[serde(serialize_with = "hex_bytes")]
    pub body_root: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct SignedBeaconBlockHeader {
    #[prost(message, optional, tag = "1")]
    pub header: Option<BeaconBlockHeader>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(serialize_with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct ProposerSlashing {
    #[prost(message, optional, tag = "1")]
    pub header_1: Option<SignedBeaconBlockHeader>,
    #[prost(message, optional, tag = "2")]
    pub header_2: Option<SignedBeaconBlockHeader>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct DepositData {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(serialize_with = "hex_bytes")]
    pub pubkey: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(serialize_with = "hex_bytes")]
    pub withdrawal_credentials: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub amount: u64,
    #[prost(bytes = "vec", tag = "4")]
    #[serde(serialize_with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct Deposit {
    #[prost(bytes = "vec", repeated, tag = "1")]
    #[serde(serialize_with = "hex_list")]
    pub proof: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "2")]
    pub data: Option<DepositData>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct VoluntaryExit {
    #[prost(uint64, tag = "1")]
    pub epoch: u64,
    #[prost(uint64, tag = "2")]
    pub validator_index: u64,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct SignedVoluntaryExit {
    #[prost(message, optional, tag = "1")]
    pub exit: Option<VoluntaryExit>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(serialize_with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct Eth1Data {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(serialize_with = "hex_bytes")]
    pub deposit_root: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub deposit_count: u64,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "hex_bytes")]
    pub block_hash: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct BeaconBlockBody {
    #[prost(bytes = "vec", tag = "1")]
    #[serde(serialize_with = "hex_bytes")]
    pub randao_reveal: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub eth1_data: Option<Eth1Data>,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "hex_bytes")]
    pub graffiti: Vec<u8>,
    #[prost(message, repeated, tag = "4")]
    pub proposer_slashings: Vec<ProposerSlashing>,
    #[prost(message, repeated, tag = "5")]
    pub attester_slashings: Vec<AttesterSlashing>,
    #[prost(message, repeated, tag = "6")]
    pub attestations: Vec<Attestation>,
    #[prost(message, repeated, tag = "7")]
    pub deposits: Vec<Deposit>,
    #[prost(message, repeated, tag = "8")]
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct BeaconBlock {
    #[prost(uint64, tag = "1")]
    pub slot: u64,
    #[prost(uint64, tag = "2")]
    pub proposer_index: u64,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(serialize_with = "hex_bytes")]
    pub parent_root: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    #[serde(serialize_with = "hex_bytes")]
    pub state_root: Vec<u8>,
    #[prost(message, optional, tag = "5")]
    pub body: Option<BeaconBlockBody>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct SignedBeaconBlock {
    #[prost(message, optional, tag = "1")]
    pub block: Option<BeaconBlock>,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(serialize_with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct StateSummary {
    #[prost(uint64, tag = "1")]
    pub slot: u64,
    #[prost(bytes = "vec", tag = "2")]
    #[serde(serialize_with = "hex_bytes")]
    pub root: Vec<u8>,
}

impl SignedBeaconBlock {
    /// A well-formed block with an empty body, for seeding and tests.
    ///
    /// Byte fields carry their canonical widths so the block survives both
    /// encodings.
    pub fn sample(slot: u64) -> Self {
        let fill = slot as u8;
        Self {
            block: Some(BeaconBlock {
                slot,
                proposer_index: slot % 64,
                parent_root: vec![fill.wrapping_sub(1); 32],
                state_root: vec![fill; 32],
                body: Some(BeaconBlockBody {
                    randao_reveal: vec![0x5A; 96],
                    eth1_data: Some(Eth1Data {
                        deposit_root: vec![0xD0; 32],
                        deposit_count: slot,
                        block_hash: vec![0xB1; 32],
                    }),
                    graffiti: vec![0; 32],
                    ..BeaconBlockBody::default()
                }),
            }),
            signature: vec![0xC5; 96],
        }
    }
}

/// A fully decoded stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChainRecord {
    SignedBeaconBlock(SignedBeaconBlock),
    BeaconBlock(BeaconBlock),
    Attestation(Attestation),
    SignedAggregateAttestationAndProof(SignedAggregateAttestationAndProof),
    Deposit(Deposit),
    AttesterSlashing(AttesterSlashing),
    ProposerSlashing(ProposerSlashing),
    VoluntaryExit(VoluntaryExit),
    StateSummary(StateSummary),
    Checkpoint(Checkpoint),
    Eth1Data(Eth1Data),
}

impl ChainRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            ChainRecord::SignedBeaconBlock(_) => RecordKind::SignedBeaconBlock,
            ChainRecord::BeaconBlock(_) => RecordKind::BeaconBlock,
            ChainRecord::Attestation(_) => RecordKind::Attestation,
            ChainRecord::SignedAggregateAttestationAndProof(_) => {
                RecordKind::SignedAggregateAttestationAndProof
            }
            ChainRecord::Deposit(_) => RecordKind::Deposit,
            ChainRecord::AttesterSlashing(_) => RecordKind::AttesterSlashing,
            ChainRecord::ProposerSlashing(_) => RecordKind::ProposerSlashing,
            ChainRecord::VoluntaryExit(_) => RecordKind::VoluntaryExit,
            ChainRecord::StateSummary(_) => RecordKind::StateSummary,
            ChainRecord::Checkpoint(_) => RecordKind::Checkpoint,
            ChainRecord::Eth1Data(_) => RecordKind::Eth1Data,
        }
    }
}

/// A payload type that is stored as its own record kind.
pub trait ChainObject: ::prost::Message + Default + Sized {
    const KIND: RecordKind;

    fn into_record(self) -> ChainRecord;
}

macro_rules! chain_object {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ChainObject for $ty {
                const KIND: RecordKind = RecordKind::$ty;

                fn into_record(self) -> ChainRecord {
                    ChainRecord::$ty(self)
                }
            }

            impl From<$ty> for ChainRecord {
                fn from(value: $ty) -> Self {
                    ChainRecord::$ty(value)
                }
            }
        )*
    };
}

chain_object!(
    SignedBeaconBlock,
    BeaconBlock,
    Attestation,
    SignedAggregateAttestationAndProof,
    Deposit,
    AttesterSlashing,
    ProposerSlashing,
    VoluntaryExit,
    StateSummary,
    Checkpoint,
    Eth1Data,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_matches_variant() {
        let exit = ChainRecord::from(VoluntaryExit {
            epoch: 3,
            validator_index: 9,
        });
        assert_eq!(exit.kind(), RecordKind::VoluntaryExit);
        assert_eq!(<Checkpoint as ChainObject>::KIND, RecordKind::Checkpoint);
    }

    #[test]
    fn test_sample_block_serializes_roots_as_hex() {
        let value = serde_json::to_value(SignedBeaconBlock::sample(3)).unwrap();
        assert_eq!(value["block"]["slot"], 3);
        assert_eq!(value["block"]["state_root"], "03".repeat(32));
        assert_eq!(value["signature"].as_str().unwrap().len(), 192);
    }

    #[test]
    fn test_bytes_serialize_as_hex() {
        let summary = ChainRecord::StateSummary(StateSummary {
            slot: 12,
            root: vec![0xde, 0xad, 0xbe, 0xef],
        });
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["slot"], 12);
        assert_eq!(value["root"], "deadbeef");
    }

    #[test]
    fn test_proof_list_serializes_as_hex_strings() {
        let deposit = Deposit {
            proof: vec![vec![0x01; 2], vec![0xff; 2]],
            data: None,
        };
        let value = serde_json::to_value(&deposit).unwrap();
        assert_eq!(value["proof"], serde_json::json!(["0101", "ffff"]));
        assert!(value["data"].is_null());
    }
}
