//! Per-record zlib compression.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{RecordError, Result};

/// Default zlib compression level.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Compress `data` into a self-terminating zlib stream.
pub fn deflate(data: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
    let level = flate2::Compression::new(level.min(9));
    let mut enc = ZlibEncoder::new(Vec::new(), level);
    enc.write_all(data)?;
    enc.finish()
}

/// Decompress a zlib stream that must expand to exactly `expected_len` bytes.
///
/// At most `expected_len + 1` bytes are produced, so a header that understates
/// the record size is detected without inflating the whole body.
pub fn inflate(body: &[u8], expected_len: u64) -> Result<Vec<u8>> {
    let capacity = usize::try_from(expected_len).unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(capacity.min(body.len().saturating_mul(4)));
    ZlibDecoder::new(body)
        .take(expected_len.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(RecordError::Decompression)?;

    let actual = out.len() as u64;
    if actual != expected_len {
        tracing::debug!(expected_len, actual, "decompressed record size mismatch");
        return Err(RecordError::SizeMismatch {
            expected: expected_len,
            actual,
        });
    }
    Ok(out)
}

/// Upper bound on the zlib output size for `len` input bytes.
pub fn deflate_bound(len: usize) -> usize {
    // deflate stored-block overhead plus the 2-byte zlib header and 4-byte adler32.
    len.saturating_add(len >> 12)
        .saturating_add(len >> 14)
        .saturating_add(len >> 25)
        .saturating_add(13 + 6)
}
