//! Format dispatch
//!
//! Maps a `RecordKind` to the structural decoder its stored bytes are
//! written in. The performance-critical chain objects use the fixed
//! layout; everything else, including kinds this build has never heard
//! of, falls back to the general-purpose encoding.

use std::borrow::Cow;

use super::kind::RecordKind;

/// Structural decode strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderStrategy {
    /// Length-prefixed deterministic field frames
    FixedLayout,
    /// Length-delimited protobuf
    GeneralPurpose,
}

impl DecoderStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecoderStrategy::FixedLayout => "fixed_layout",
            DecoderStrategy::GeneralPurpose => "general_purpose",
        }
    }
}

/// Kinds stored in the fixed layout. One line per kind.
pub const FIXED_LAYOUT_KINDS: &[RecordKind] = &[
    RecordKind::SignedBeaconBlock,
    RecordKind::SignedAggregateAttestationAndProof,
    RecordKind::BeaconBlock,
    RecordKind::Attestation,
    RecordKind::Deposit,
    RecordKind::AttesterSlashing,
    RecordKind::ProposerSlashing,
    RecordKind::VoluntaryExit,
];

/// Dispatch table: the set of fixed-layout kinds.
///
/// The standard table borrows `FIXED_LAYOUT_KINDS`; a configured table owns
/// its own list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderTable {
    fixed: Cow<'static, [RecordKind]>,
}

impl DecoderTable {
    /// The table matching how the chain store writes records.
    pub const STANDARD: DecoderTable = DecoderTable {
        fixed: Cow::Borrowed(FIXED_LAYOUT_KINDS),
    };

    /// Builds a table with an explicit fixed-layout subset.
    pub fn with_fixed_kinds(kinds: Vec<RecordKind>) -> Self {
        Self {
            fixed: Cow::Owned(kinds),
        }
    }

    pub fn select(&self, kind: RecordKind) -> DecoderStrategy {
        if self.fixed.contains(&kind) {
            DecoderStrategy::FixedLayout
        } else {
            DecoderStrategy::GeneralPurpose
        }
    }

    pub fn fixed_kinds(&self) -> &[RecordKind] {
        &self.fixed
    }

    /// Returns whether this table selects the same kinds as the standard one.
    pub fn is_standard(&self) -> bool {
        let mut ours: Vec<RecordKind> = self.fixed.to_vec();
        let mut standard: Vec<RecordKind> = FIXED_LAYOUT_KINDS.to_vec();
        ours.sort_unstable();
        ours.dedup();
        standard.sort_unstable();
        ours == standard
    }
}

impl Default for DecoderTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Selects the decoder for `kind` using the standard table.
pub fn select_decoder(kind: RecordKind) -> DecoderStrategy {
    DecoderTable::STANDARD.select(kind)
}
