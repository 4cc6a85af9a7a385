use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::compression::{deflate, deflate_bound, inflate, DEFAULT_COMPRESSION_LEVEL};
use crate::error::{FrameSection, RecordError, Result};
use crate::header::{Compression, Header};

/// Magic number opening every frame.
pub const MAGIC: u32 = 0x4e73_1039;

/// Fixed frame prefix: magic (4) + header length (4) = 8 bytes.
pub const PREFIX_SIZE: usize = 8;

/// Default maximum logical record size: 256 MiB.
pub const DEFAULT_MAX_RECORD_SIZE: usize = 256 * 1024 * 1024;

/// Default maximum encoded header size: 64 KiB.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 64 * 1024;

/// Configuration shared by record readers and writers.
#[derive(Debug, Clone)]
pub struct RecordConfig {
    /// Compress each record body with zlib. Writers only. Default: false.
    pub compress: bool,
    /// zlib level (0-9) used when `compress` is set. Default: 6.
    pub compression_level: u32,
    /// Maximum logical record size in bytes. Default: 256 MiB.
    pub max_record_size: usize,
    /// Maximum encoded header size in bytes. Default: 64 KiB.
    pub max_header_size: usize,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            compress: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        }
    }
}

/// Encode a record into the wire format, compressing it if `config.compress`
/// is set. Returns the header that was written.
///
/// Wire format (all integers big-endian):
/// ```text
/// ┌──────────────┬──────────────┬───────────────────┬────────────────────┐
/// │ Magic (4B)   │ Header len   │ Header            │ Body               │
/// │ 0x4e731039   │ (4B BE)      │ (Header len bytes)│ (on-disk size)     │
/// └──────────────┴──────────────┴───────────────────┴────────────────────┘
/// ```
pub fn encode_frame(record: &[u8], config: &RecordConfig, dst: &mut BytesMut) -> Result<Header> {
    let record_len = record.len() as u64;
    if record.len() > config.max_record_size {
        return Err(RecordError::RecordTooLarge {
            size: record_len,
            max: config.max_record_size as u64,
        });
    }

    let compressed;
    let (header, body) = if config.compress {
        compressed =
            deflate(record, config.compression_level).map_err(RecordError::Compression)?;
        let header = Header::deflated(record_len, compressed.len() as u64);
        (header, compressed.as_slice())
    } else {
        (Header::uncompressed(record_len), record)
    };

    let header_len = header.encoded_len();
    dst.reserve(PREFIX_SIZE + header_len + body.len());
    dst.put_u32(MAGIC);
    dst.put_u32(header_len as u32);
    header.encode(dst);
    dst.put_slice(body);
    Ok(header)
}

/// Decode one record from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer and returns the
/// logical record, decompressed if the header says so.
pub fn decode_frame(src: &mut BytesMut, config: &RecordConfig) -> Result<Option<Bytes>> {
    if src.len() < 4 {
        return Ok(None);
    }

    let magic = read_u32(&src[0..4]);
    if magic != MAGIC {
        tracing::debug!(found = magic, "record magic mismatch");
        return Err(RecordError::MagicMismatch { found: magic });
    }

    if src.len() < PREFIX_SIZE {
        return Ok(None);
    }

    let header_len = read_u32(&src[4..PREFIX_SIZE]) as usize;
    if header_len > config.max_header_size {
        return Err(RecordError::HeaderTooLarge {
            size: header_len,
            max: config.max_header_size,
        });
    }

    let header_end = PREFIX_SIZE + header_len;
    if src.len() < header_end {
        return Ok(None);
    }

    let header = Header::decode(&src[PREFIX_SIZE..header_end])?;
    check_limits(&header, config)?;

    // check_limits bounds the body only by config, which may be unbounded.
    let on_disk = header.on_disk_size();
    let body_len = usize::try_from(on_disk)
        .ok()
        .filter(|len| header_end.checked_add(*len).is_some())
        .ok_or(RecordError::RecordTooLarge {
            size: on_disk,
            max: (usize::MAX - header_end) as u64,
        })?;
    if src.len() - header_end < body_len {
        return Ok(None);
    }

    src.advance(header_end);
    let body = src.split_to(body_len).freeze();

    let record = match header.compression {
        Compression::None => body,
        Compression::Deflate { .. } => Bytes::from(inflate(&body, header.uncompressed_size)?),
    };

    tracing::trace!(
        size = header.uncompressed_size,
        on_disk = body_len,
        compressed = header.is_compressed(),
        "record decoded"
    );
    Ok(Some(record))
}

/// Name the frame section an incomplete buffer stops in.
///
/// `src` must start at a frame boundary.
pub fn pending_section(src: &[u8]) -> FrameSection {
    if src.len() < 4 {
        return FrameSection::Magic;
    }
    if src.len() < PREFIX_SIZE {
        return FrameSection::HeaderLength;
    }
    let header_len = read_u32(&src[4..PREFIX_SIZE]) as usize;
    if src.len() < PREFIX_SIZE.saturating_add(header_len) {
        FrameSection::Header
    } else {
        FrameSection::Body
    }
}

fn check_limits(header: &Header, config: &RecordConfig) -> Result<()> {
    let max = config.max_record_size as u64;
    if header.uncompressed_size > max {
        return Err(RecordError::RecordTooLarge {
            size: header.uncompressed_size,
            max,
        });
    }
    if let Compression::Deflate { compressed_size } = header.compression {
        let ceiling = deflate_bound(config.max_record_size) as u64;
        if compressed_size > ceiling {
            return Err(RecordError::RecordTooLarge {
                size: compressed_size,
                max: ceiling,
            });
        }
    }
    Ok(())
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
