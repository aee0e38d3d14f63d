//! Fixed-layout record encoding
//!
//! Every container is written as one self-describing frame:
//!
//! ```text
//! +------------------+
//! | Frame Length     | (u32 LE, whole frame including this header)
//! +------------------+
//! | Layout Id        | (u8)
//! +------------------+
//! | Field Count      | (u8)
//! +------------------+
//! | Field 0..n       | (u32 LE length + bytes each)
//! +------------------+
//! ```
//!
//! Scalars are 8-byte little-endian fields, roots and signatures are
//! exact-width byte fields, nested containers are nested frames, and lists
//! are packed into a single field (concatenated frames, or fixed-width
//! items). A stored record's frame carries its kind tag as the layout id;
//! nested containers carry their own id. Nested-only containers use ids
//! from 0x80 up. `Checkpoint` and `Eth1Data` occur both ways, so the same
//! fields are framed under 0x81/0x88 when nested and under their kind tag
//! when stored on their own.
//!
//! The layout is deterministic: a value has exactly one encoding, and any
//! deviation from it is a decode error.

use super::errors::StructuralError;
use super::kind::RecordKind;
use super::types::*;

/// Frame header: length (4) + layout id (1) + field count (1)
pub const FRAME_HEADER_LEN: usize = 6;

const ROOT_LEN: usize = 32;
const SIGNATURE_LEN: usize = 96;
const PUBKEY_LEN: usize = 48;
const DEPOSIT_PROOF_DEPTH: usize = 33;

/// A violated layout rule, before it is attributed to a record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutViolation(String);

impl LayoutViolation {
    fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

type LayoutResult<T> = Result<T, LayoutViolation>;

/// A container with a fixed-layout schema.
pub trait FixedLayout: Sized {
    const LAYOUT_ID: u8;
    const FIELD_COUNT: u8;

    fn write_fields(&self, w: &mut FrameWriter);
    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self>;
}

/// Builds one frame.
pub struct FrameWriter {
    buf: Vec<u8>,
    fields: u8,
}

impl FrameWriter {
    fn new(layout_id: u8) -> Self {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(&[0u8; 4]);
        buf.push(layout_id);
        buf.push(0);
        Self { buf, fields: 0 }
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(bytes);
        self.fields += 1;
    }

    pub fn put_u64(&mut self, value: u64) {
        self.put_bytes(&value.to_le_bytes());
    }

    pub fn put_frame<T: FixedLayout>(&mut self, value: &T) {
        self.put_bytes(&encode_frame(value));
    }

    /// Absent containers are written as an empty field.
    pub fn put_opt_frame<T: FixedLayout>(&mut self, value: &Option<T>) {
        match value {
            Some(v) => self.put_frame(v),
            None => self.put_bytes(&[]),
        }
    }

    pub fn put_frames<T: FixedLayout>(&mut self, items: &[T]) {
        let packed: Vec<u8> = items.iter().flat_map(encode_frame::<T>).collect();
        self.put_bytes(&packed);
    }

    pub fn put_u64_list(&mut self, items: &[u64]) {
        let packed: Vec<u8> = items.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.put_bytes(&packed);
    }

    pub fn put_fixed_list(&mut self, items: &[Vec<u8>]) {
        self.put_bytes(&items.concat());
    }

    fn finish(mut self) -> Vec<u8> {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_le_bytes());
        self.buf[5] = self.fields;
        self.buf
    }
}

/// Reads the fields of one frame, in order.
pub struct FrameReader<'a> {
    remaining: &'a [u8],
    declared: u8,
    read: u8,
}

impl<'a> FrameReader<'a> {
    fn field(&mut self) -> LayoutResult<&'a [u8]> {
        if self.read >= self.declared {
            return Err(LayoutViolation::new(format!(
                "read past declared field count {}",
                self.declared
            )));
        }
        let (len_bytes, rest) = split(self.remaining, 4)
            .ok_or_else(|| LayoutViolation::new(format!("field {} header truncated", self.read)))?;
        let len = read_u32(len_bytes) as usize;
        let (value, rest) = split(rest, len).ok_or_else(|| {
            LayoutViolation::new(format!(
                "field {} declares {} bytes, {} remain",
                self.read,
                len,
                rest.len()
            ))
        })?;
        self.remaining = rest;
        self.read += 1;
        Ok(value)
    }

    pub fn u64(&mut self) -> LayoutResult<u64> {
        let field = self.field()?;
        let bytes: [u8; 8] = field.try_into().map_err(|_| {
            LayoutViolation::new(format!("scalar field is {} bytes, expected 8", field.len()))
        })?;
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn fixed_bytes(&mut self, width: usize) -> LayoutResult<Vec<u8>> {
        let field = self.field()?;
        if field.len() != width {
            return Err(LayoutViolation::new(format!(
                "field is {} bytes, expected {}",
                field.len(),
                width
            )));
        }
        Ok(field.to_vec())
    }

    pub fn bytes(&mut self) -> LayoutResult<Vec<u8>> {
        Ok(self.field()?.to_vec())
    }

    pub fn opt_frame<T: FixedLayout>(&mut self) -> LayoutResult<Option<T>> {
        let field = self.field()?;
        if field.is_empty() {
            return Ok(None);
        }
        parse_frame(field).map(Some)
    }

    pub fn frames<T: FixedLayout>(&mut self) -> LayoutResult<Vec<T>> {
        let mut packed = self.field()?;
        let mut items = Vec::new();
        while !packed.is_empty() {
            let len = split(packed, 4)
                .map(|(len_bytes, _)| read_u32(len_bytes) as usize)
                .ok_or_else(|| LayoutViolation::new("list item header truncated"))?;
            let (item, rest) = split(packed, len).ok_or_else(|| {
                LayoutViolation::new(format!(
                    "list item declares {} bytes, {} remain",
                    len,
                    packed.len()
                ))
            })?;
            items.push(parse_frame(item)?);
            packed = rest;
        }
        Ok(items)
    }

    pub fn u64_list(&mut self) -> LayoutResult<Vec<u64>> {
        let packed = self.field()?;
        if packed.len() % 8 != 0 {
            return Err(LayoutViolation::new(format!(
                "scalar list of {} bytes is not a multiple of 8",
                packed.len()
            )));
        }
        Ok(packed
            .chunks_exact(8)
            .map(|c| {
                let mut b = [0u8; 8];
                b.copy_from_slice(c);
                u64::from_le_bytes(b)
            })
            .collect())
    }

    pub fn fixed_list(&mut self, width: usize, max_items: usize) -> LayoutResult<Vec<Vec<u8>>> {
        let packed = self.field()?;
        if packed.len() % width != 0 {
            return Err(LayoutViolation::new(format!(
                "list of {} bytes is not a multiple of {}",
                packed.len(),
                width
            )));
        }
        if packed.len() / width > max_items {
            return Err(LayoutViolation::new(format!(
                "list holds {} items, limit is {}",
                packed.len() / width,
                max_items
            )));
        }
        Ok(packed.chunks_exact(width).map(<[u8]>::to_vec).collect())
    }

    fn finish(self) -> LayoutResult<()> {
        if self.read != self.declared {
            return Err(LayoutViolation::new(format!(
                "read {} of {} declared fields",
                self.read, self.declared
            )));
        }
        if !self.remaining.is_empty() {
            return Err(LayoutViolation::new(format!(
                "{} trailing bytes after last field",
                self.remaining.len()
            )));
        }
        Ok(())
    }
}

fn split(bytes: &[u8], at: usize) -> Option<(&[u8], &[u8])> {
    if bytes.len() < at {
        None
    } else {
        Some(bytes.split_at(at))
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(b)
}

/// Encodes a container as a nested frame.
pub fn encode_frame<T: FixedLayout>(value: &T) -> Vec<u8> {
    encode_frame_as(value, T::LAYOUT_ID)
}

fn encode_frame_as<T: FixedLayout>(value: &T, layout_id: u8) -> Vec<u8> {
    let mut writer = FrameWriter::new(layout_id);
    value.write_fields(&mut writer);
    writer.finish()
}

/// Parses one complete nested frame of type `T`.
pub fn parse_frame<T: FixedLayout>(bytes: &[u8]) -> LayoutResult<T> {
    parse_frame_as(bytes, T::LAYOUT_ID)
}

/// Record frames are tagged with the record kind.
fn encode_record_frame<T: FixedLayout + ChainObject>(value: &T) -> Vec<u8> {
    encode_frame_as(value, T::KIND.tag())
}

fn parse_record_frame<T: FixedLayout + ChainObject>(bytes: &[u8]) -> LayoutResult<ChainRecord> {
    parse_frame_as::<T>(bytes, T::KIND.tag()).map(ChainObject::into_record)
}

fn parse_frame_as<T: FixedLayout>(bytes: &[u8], layout_id: u8) -> LayoutResult<T> {
    if bytes.len() < FRAME_HEADER_LEN {
        return Err(LayoutViolation::new(format!(
            "{} bytes is shorter than the frame header",
            bytes.len()
        )));
    }
    let declared_len = read_u32(bytes) as usize;
    if declared_len != bytes.len() {
        return Err(LayoutViolation::new(format!(
            "frame declares {} bytes, holds {}",
            declared_len,
            bytes.len()
        )));
    }
    if bytes[4] != layout_id {
        return Err(LayoutViolation::new(format!(
            "unknown discriminant 0x{:02x}, expected 0x{:02x}",
            bytes[4], layout_id
        )));
    }
    let field_count = bytes[5];
    if field_count != T::FIELD_COUNT {
        return Err(LayoutViolation::new(format!(
            "frame declares {} fields, layout has {}",
            field_count,
            T::FIELD_COUNT
        )));
    }

    let mut reader = FrameReader {
        remaining: &bytes[FRAME_HEADER_LEN..],
        declared: field_count,
        read: 0,
    };
    let value = T::read_fields(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

/// Decodes a decompressed fixed-layout record of `kind`.
pub fn decode(bytes: &[u8], kind: RecordKind) -> Result<ChainRecord, StructuralError> {
    if bytes.is_empty() {
        return Err(malformed(kind, LayoutViolation::new("empty input")));
    }
    if bytes.len() >= 4 {
        let declared = read_u32(bytes) as usize;
        if declared != bytes.len() {
            return Err(StructuralError::LengthMismatch {
                declared,
                actual: bytes.len(),
            });
        }
    }

    let record = match kind {
        RecordKind::SignedBeaconBlock => parse_record_frame::<SignedBeaconBlock>(bytes),
        RecordKind::BeaconBlock => parse_record_frame::<BeaconBlock>(bytes),
        RecordKind::Attestation => parse_record_frame::<Attestation>(bytes),
        RecordKind::SignedAggregateAttestationAndProof => {
            parse_record_frame::<SignedAggregateAttestationAndProof>(bytes)
        }
        RecordKind::Deposit => parse_record_frame::<Deposit>(bytes),
        RecordKind::AttesterSlashing => parse_record_frame::<AttesterSlashing>(bytes),
        RecordKind::ProposerSlashing => parse_record_frame::<ProposerSlashing>(bytes),
        RecordKind::VoluntaryExit => parse_record_frame::<VoluntaryExit>(bytes),
        RecordKind::StateSummary => parse_record_frame::<StateSummary>(bytes),
        RecordKind::Checkpoint => parse_record_frame::<Checkpoint>(bytes),
        RecordKind::Eth1Data => parse_record_frame::<Eth1Data>(bytes),
        RecordKind::Unrecognized(_) => {
            return Err(StructuralError::UnknownKind {
                kind,
                layout: "fixed-layout",
            })
        }
    };
    record.map_err(|v| malformed(kind, v))
}

/// Encodes a record in the fixed layout. Every known kind has one.
pub fn encode(record: &ChainRecord) -> Vec<u8> {
    match record {
        ChainRecord::SignedBeaconBlock(v) => encode_record_frame(v),
        ChainRecord::BeaconBlock(v) => encode_record_frame(v),
        ChainRecord::Attestation(v) => encode_record_frame(v),
        ChainRecord::SignedAggregateAttestationAndProof(v) => encode_record_frame(v),
        ChainRecord::Deposit(v) => encode_record_frame(v),
        ChainRecord::AttesterSlashing(v) => encode_record_frame(v),
        ChainRecord::ProposerSlashing(v) => encode_record_frame(v),
        ChainRecord::VoluntaryExit(v) => encode_record_frame(v),
        ChainRecord::StateSummary(v) => encode_record_frame(v),
        ChainRecord::Checkpoint(v) => encode_record_frame(v),
        ChainRecord::Eth1Data(v) => encode_record_frame(v),
    }
}

fn malformed(kind: RecordKind, violation: LayoutViolation) -> StructuralError {
    StructuralError::MalformedFixedLayout {
        kind,
        reason: violation.0,
    }
}

// =============================================================================
// Layouts
// =============================================================================

impl FixedLayout for Checkpoint {
    const LAYOUT_ID: u8 = 0x81;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_u64(self.epoch);
        w.put_bytes(&self.root);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            epoch: r.u64()?,
            root: r.fixed_bytes(ROOT_LEN)?,
        })
    }
}

impl FixedLayout for AttestationData {
    const LAYOUT_ID: u8 = 0x82;
    const FIELD_COUNT: u8 = 5;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_u64(self.slot);
        w.put_u64(self.committee_index);
        w.put_bytes(&self.beacon_block_root);
        w.put_opt_frame(&self.source);
        w.put_opt_frame(&self.target);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            slot: r.u64()?,
            committee_index: r.u64()?,
            beacon_block_root: r.fixed_bytes(ROOT_LEN)?,
            source: r.opt_frame()?,
            target: r.opt_frame()?,
        })
    }
}

impl FixedLayout for Attestation {
    const LAYOUT_ID: u8 = 3;
    const FIELD_COUNT: u8 = 3;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_bytes(&self.aggregation_bits);
        w.put_opt_frame(&self.data);
        w.put_bytes(&self.signature);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            aggregation_bits: r.bytes()?,
            data: r.opt_frame()?,
            signature: r.fixed_bytes(SIGNATURE_LEN)?,
        })
    }
}

impl FixedLayout for AggregateAttestationAndProof {
    const LAYOUT_ID: u8 = 0x8A;
    const FIELD_COUNT: u8 = 3;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_u64(self.aggregator_index);
        w.put_opt_frame(&self.aggregate);
        w.put_bytes(&self.selection_proof);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            aggregator_index: r.u64()?,
            aggregate: r.opt_frame()?,
            selection_proof: r.fixed_bytes(SIGNATURE_LEN)?,
        })
    }
}

impl FixedLayout for SignedAggregateAttestationAndProof {
    const LAYOUT_ID: u8 = 4;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_opt_frame(&self.message);
        w.put_bytes(&self.signature);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            message: r.opt_frame()?,
            signature: r.fixed_bytes(SIGNATURE_LEN)?,
        })
    }
}

impl FixedLayout for IndexedAttestation {
    const LAYOUT_ID: u8 = 0x83;
    const FIELD_COUNT: u8 = 3;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_u64_list(&self.attesting_indices);
        w.put_opt_frame(&self.data);
        w.put_bytes(&self.signature);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            attesting_indices: r.u64_list()?,
            data: r.opt_frame()?,
            signature: r.fixed_bytes(SIGNATURE_LEN)?,
        })
    }
}

impl FixedLayout for AttesterSlashing {
    const LAYOUT_ID: u8 = 6;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_opt_frame(&self.attestation_1);
        w.put_opt_frame(&self.attestation_2);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            attestation_1: r.opt_frame()?,
            attestation_2: r.opt_frame()?,
        })
    }
}

impl FixedLayout for BeaconBlockHeader {
    const LAYOUT_ID: u8 = 0x84;
    const FIELD_COUNT: u8 = 5;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_u64(self.slot);
        w.put_u64(self.proposer_index);
        w.put_bytes(&self.parent_root);
        w.put_bytes(&self.state_root);
        w.put_bytes(&self.body_root);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            slot: r.u64()?,
            proposer_index: r.u64()?,
            parent_root: r.fixed_bytes(ROOT_LEN)?,
            state_root: r.fixed_bytes(ROOT_LEN)?,
            body_root: r.fixed_bytes(ROOT_LEN)?,
        })
    }
}

impl FixedLayout for SignedBeaconBlockHeader {
    const LAYOUT_ID: u8 = 0x85;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_opt_frame(&self.header);
        w.put_bytes(&self.signature);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            header: r.opt_frame()?,
            signature: r.fixed_bytes(SIGNATURE_LEN)?,
        })
    }
}

impl FixedLayout for ProposerSlashing {
    const LAYOUT_ID: u8 = 7;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_opt_frame(&self.header_1);
        w.put_opt_frame(&self.header_2);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            header_1: r.opt_frame()?,
            header_2: r.opt_frame()?,
        })
    }
}

impl FixedLayout for DepositData {
    const LAYOUT_ID: u8 = 0x86;
    const FIELD_COUNT: u8 = 4;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_bytes(&self.pubkey);
        w.put_bytes(&self.withdrawal_credentials);
        w.put_u64(self.amount);
        w.put_bytes(&self.signature);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            pubkey: r.fixed_bytes(PUBKEY_LEN)?,
            withdrawal_credentials: r.fixed_bytes(ROOT_LEN)?,
            amount: r.u64()?,
            signature: r.fixed_bytes(SIGNATURE_LEN)?,
        })
    }
}

impl FixedLayout for Deposit {
    const LAYOUT_ID: u8 = 5;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_fixed_list(&self.proof);
        w.put_opt_frame(&self.data);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            proof: r.fixed_list(ROOT_LEN, DEPOSIT_PROOF_DEPTH)?,
            data: r.opt_frame()?,
        })
    }
}

impl FixedLayout for VoluntaryExit {
    const LAYOUT_ID: u8 = 8;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_u64(self.epoch);
        w.put_u64(self.validator_index);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            epoch: r.u64()?,
            validator_index: r.u64()?,
        })
    }
}

impl FixedLayout for SignedVoluntaryExit {
    const LAYOUT_ID: u8 = 0x87;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_opt_frame(&self.exit);
        w.put_bytes(&self.signature);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            exit: r.opt_frame()?,
            signature: r.fixed_bytes(SIGNATURE_LEN)?,
        })
    }
}

impl FixedLayout for Eth1Data {
    const LAYOUT_ID: u8 = 0x88;
    const FIELD_COUNT: u8 = 3;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_bytes(&self.deposit_root);
        w.put_u64(self.deposit_count);
        w.put_bytes(&self.block_hash);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            deposit_root: r.fixed_bytes(ROOT_LEN)?,
            deposit_count: r.u64()?,
            block_hash: r.fixed_bytes(ROOT_LEN)?,
        })
    }
}

impl FixedLayout for StateSummary {
    const LAYOUT_ID: u8 = 9;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_u64(self.slot);
        w.put_bytes(&self.root);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            slot: r.u64()?,
            root: r.fixed_bytes(ROOT_LEN)?,
        })
    }
}

impl FixedLayout for BeaconBlockBody {
    const LAYOUT_ID: u8 = 0x89;
    const FIELD_COUNT: u8 = 8;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_bytes(&self.randao_reveal);
        w.put_opt_frame(&self.eth1_data);
        w.put_bytes(&self.graffiti);
        w.put_frames(&self.proposer_slashings);
        w.put_frames(&self.attester_slashings);
        w.put_frames(&self.attestations);
        w.put_frames(&self.deposits);
        w.put_frames(&self.voluntary_exits);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            randao_reveal: r.fixed_bytes(SIGNATURE_LEN)?,
            eth1_data: r.opt_frame()?,
            graffiti: r.fixed_bytes(ROOT_LEN)?,
            proposer_slashings: r.frames()?,
            attester_slashings: r.frames()?,
            attestations: r.frames()?,
            deposits: r.frames()?,
            voluntary_exits: r.frames()?,
        })
    }
}

impl FixedLayout for BeaconBlock {
    const LAYOUT_ID: u8 = 2;
    const FIELD_COUNT: u8 = 5;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_u64(self.slot);
        w.put_u64(self.proposer_index);
        w.put_bytes(&self.parent_root);
        w.put_bytes(&self.state_root);
        w.put_opt_frame(&self.body);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            slot: r.u64()?,
            proposer_index: r.u64()?,
            parent_root: r.fixed_bytes(ROOT_LEN)?,
            state_root: r.fixed_bytes(ROOT_LEN)?,
            body: r.opt_frame()?,
        })
    }
}

impl FixedLayout for SignedBeaconBlock {
    const LAYOUT_ID: u8 = 1;
    const FIELD_COUNT: u8 = 2;

    fn write_fields(&self, w: &mut FrameWriter) {
        w.put_opt_frame(&self.block);
        w.put_bytes(&self.signature);
    }

    fn read_fields(r: &mut FrameReader<'_>) -> LayoutResult<Self> {
        Ok(Self {
            block: r.opt_frame()?,
            signature: r.fixed_bytes(SIGNATURE_LEN)?,
        })
    }
}
