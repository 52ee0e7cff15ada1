//! Decompression for VPVP entries.

use std::io::Read;

use thiserror::Error;

/// Internal buffer size of the brotli decoder.
const DECODER_BUFFER_SIZE: usize = 4096;

/// Upper bound on the capacity reserved before decoding.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// Brotli decoding failure.
#[derive(Debug, Error)]
pub enum DecompressionError {
    /// The brotli stream is malformed.
    #[error("brotli stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// The stream decoded to a different length than the index records.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Decompress brotli-compressed data with known output size.
///
/// The output must be exactly `expected_size` bytes. Decoding stops one byte
/// past the expected size, so oversized streams are rejected without being
/// fully inflated.
pub fn decompress_brotli_sized(
    data: &[u8],
    expected_size: usize,
) -> Result<Vec<u8>, DecompressionError> {
    let mut output = Vec::with_capacity(expected_size.min(MAX_PREALLOC));
    let decoder = brotli::Decompressor::new(data, DECODER_BUFFER_SIZE);

    decoder
        .take(expected_size as u64 + 1)
        .read_to_end(&mut output)?;

    if output.len() != expected_size {
        return Err(DecompressionError::SizeMismatch {
            expected: expected_size,
            actual: output.len(),
        });
    }

    Ok(output)
}
