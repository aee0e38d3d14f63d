//! Compression codec for stored chain records
//!
//! Every value in the chain store is persisted snappy-compressed (raw block
//! format, no framing). The read path only ever decompresses; `compress`
//! exists for seeding and tests.
//!
//! # Guarantees
//!
//! - Deterministic, no shared state
//! - Truncated or corrupted input is rejected with `CodecError::Corrupt`,
//!   never partially decoded

mod errors;

pub use errors::{CodecError, CodecResult};

/// Decompresses a stored record.
///
/// Empty input is rejected: the store never persists an empty value, so an
/// empty slice means the record was truncated.
pub fn decompress(bytes: &[u8]) -> CodecResult<Vec<u8>> {
    if bytes.is_empty() {
        return Err(CodecError::corrupt(0, "empty input"));
    }

    snap::raw::Decoder::new()
        .decompress_vec(bytes)
        .map_err(|e| CodecError::corrupt(bytes.len(), e.to_string()))
}

/// Returns the uncompressed length declared in the record header without
/// decompressing it.
pub fn decompressed_len(bytes: &[u8]) -> CodecResult<usize> {
    snap::raw::decompress_len(bytes).map_err(|e| CodecError::corrupt(bytes.len(), e.to_string()))
}

/// Compresses a payload into the stored representation.
pub fn compress(payload: &[u8]) -> CodecResult<Vec<u8>> {
    snap::raw::Encoder::new()
        .compress_vec(payload)
        .map_err(|e| CodecError::corrupt(payload.len(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompress_restores_payload() {
        let payload = b"slot=42;proposer=7;".repeat(20);
        let stored = compress(&payload).unwrap();

        assert!(stored.len() < payload.len());
        assert_eq!(decompress(&stored).unwrap(), payload);
        assert_eq!(decompressed_len(&stored).unwrap(), payload.len());
    }

    #[test]
    fn test_empty_input_is_corrupt() {
        let err = decompress(&[]).unwrap_err();
        assert_eq!(err.code(), "CHAINDB_CODEC_CORRUPT");
        assert_eq!(err.byte_len(), 0);
    }

    #[test]
    fn test_truncated_input_is_corrupt() {
        let payload = vec![0xAB; 512];
        let stored = compress(&payload).unwrap();
        let truncated = &stored[..stored.len() / 2];

        let err = decompress(truncated).unwrap_err();
        assert_eq!(err.byte_len(), truncated.len());
    }

    #[test]
    fn test_garbage_is_corrupt() {
        // Declares a 127 byte output but carries a copy referencing data
        // before the start of the buffer.
        let garbage = [0x7F, 0x01, 0xFF, 0xFF, 0xFF];
        assert!(decompress(&garbage).is_err());
    }
}
