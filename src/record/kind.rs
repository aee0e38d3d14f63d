//! Record kinds
//!
//! A `RecordKind` names the chain-object type a stored value decodes into.
//! The set is closed; tags that this build does not know about surface as
//! `Unrecognized` so they still flow through dispatch instead of being
//! dropped.

use std::fmt;
use std::str::FromStr;

/// Logical chain-object type of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
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
    /// A tag outside the known set
    Unrecognized(u8),
}

impl RecordKind {
    /// Every kind this build knows how to name.
    pub const KNOWN: [RecordKind; 11] = [
        RecordKind::SignedBeaconBlock,
        RecordKind::BeaconBlock,
        RecordKind::Attestation,
        RecordKind::SignedAggregateAttestationAndProof,
        RecordKind::Deposit,
        RecordKind::AttesterSlashing,
        RecordKind::ProposerSlashing,
        RecordKind::VoluntaryExit,
        RecordKind::StateSummary,
        RecordKind::Checkpoint,
        RecordKind::Eth1Data,
    ];

    /// Wire tag, also used as the fixed-layout frame discriminant.
    pub fn tag(&self) -> u8 {
        match self {
            RecordKind::SignedBeaconBlock => 1,
            RecordKind::BeaconBlock => 2,
            RecordKind::Attestation => 3,
            RecordKind::SignedAggregateAttestationAndProof => 4,
            RecordKind::Deposit => 5,
            RecordKind::AttesterSlashing => 6,
            RecordKind::ProposerSlashing => 7,
            RecordKind::VoluntaryExit => 8,
            RecordKind::StateSummary => 9,
            RecordKind::Checkpoint => 10,
            RecordKind::Eth1Data => 11,
            RecordKind::Unrecognized(tag) => *tag,
        }
    }

    pub fn from_tag(tag: u8) -> Self {
        Self::KNOWN
            .iter()
            .copied()
            .find(|k| k.tag() == tag)
            .unwrap_or(RecordKind::Unrecognized(tag))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::SignedBeaconBlock => "signed_beacon_block",
            RecordKind::BeaconBlock => "beacon_block",
            RecordKind::Attestation => "attestation",
            RecordKind::SignedAggregateAttestationAndProof => "signed_aggregate_attestation_and_proof",
            RecordKind::Deposit => "deposit",
            RecordKind::AttesterSlashing => "attester_slashing",
            RecordKind::ProposerSlashing => "proposer_slashing",
            RecordKind::VoluntaryExit => "voluntary_exit",
            RecordKind::StateSummary => "state_summary",
            RecordKind::Checkpoint => "checkpoint",
            RecordKind::Eth1Data => "eth1_data",
            RecordKind::Unrecognized(_) => "unrecognized",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RecordKind::Unrecognized(_))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Unrecognized(tag) => write!(f, "unrecognized({})", tag),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::KNOWN
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("unknown record kind: '{}'", s))
    }
}
