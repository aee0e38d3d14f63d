//! Typed record decoding
//!
//! Stored chain records are compressed, then encoded in one of two
//! layouts depending on their kind:
//!
//! - fixed layout for the performance-critical chain objects (blocks,
//!   attestations, slashings, exits, deposits)
//! - general-purpose length-delimited protobuf for everything else
//!
//! `RecordDecoder` composes the codec, the dispatch table and the two
//! structural decoders into a single `decode(raw, kind)` call.

mod dispatch;
mod errors;
pub mod fixed;
pub mod general;
mod kind;
mod pipeline;
pub mod types;

pub use dispatch::{select_decoder, DecoderStrategy, DecoderTable, FIXED_LAYOUT_KINDS};
pub use errors::{DecodeCause, DecodeError, StructuralError};
pub use kind::RecordKind;
pub use pipeline::{decode_record, encode_record, DecodeOutcome, RecordDecoder};
pub use types::{ChainObject, ChainRecord};
