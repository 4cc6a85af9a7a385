//! Record header: the small self-describing structure preceding every body.
//!
//! The header is a tag-length-value message, wire compatible with a protobuf
//! message holding two optional `uint64` fields:
//!
//! ```text
//! field 1  uncompressed_size   varint   always written
//! field 2  compressed_size     varint   written only for compressed bodies
//! ```
//!
//! Each field is prefixed by a varint key `(field_number << 3) | wire_type`.
//! Fields this version does not know are skipped by wire type, so new header
//! fields can be added without breaking older readers. A known field with a
//! non-varint wire type is skipped the same way, matching protobuf parsers.

use bytes::{Buf, BufMut};

const UNCOMPRESSED_SIZE_FIELD: u64 = 1;
const COMPRESSED_SIZE_FIELD: u64 = 2;

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LENGTH_DELIMITED: u8 = 2;
const WIRE_FIXED32: u8 = 5;

const MAX_VARINT_LEN: usize = 10;

/// Errors produced while decoding a header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// A varint ran past the end of the header.
    #[error("truncated varint")]
    TruncatedVarint,

    /// A varint encodes a value wider than 64 bits.
    #[error("varint exceeds 64 bits")]
    VarintOverflow,

    /// Field number 0 is never valid.
    #[error("field number 0 is reserved")]
    ZeroField,

    /// An unknown field uses a wire type that cannot be skipped.
    #[error("unsupported wire type {wire_type} on field {field}")]
    UnsupportedWireType { field: u64, wire_type: u8 },

    /// A fixed-width or length-delimited value runs past the end of the header.
    #[error("field {field} needs {needed} bytes, only {remaining} remain")]
    Truncated {
        field: u64,
        needed: u64,
        remaining: usize,
    },
}

/// How a record body is stored on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// The body is the record itself.
    #[default]
    None,
    /// The body is a zlib stream of `compressed_size` bytes.
    Deflate { compressed_size: u64 },
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Logical record length, before any compression.
    pub uncompressed_size: u64,
    /// Body storage.
    pub compression: Compression,
}

impl Header {
    /// Header for a record stored as-is.
    pub fn uncompressed(len: u64) -> Self {
        Self {
            uncompressed_size: len,
            compression: Compression::None,
        }
    }

    /// Header for a record stored as a zlib stream.
    pub fn deflated(len: u64, compressed_size: u64) -> Self {
        Self::from_fields(Some(len), Some(compressed_size))
    }

    /// Build a header from raw optional field values.
    ///
    /// A missing uncompressed size reads as 0. A compressed size that is
    /// missing or zero means the body is not compressed, so a zero-length
    /// "compressed" body is read back as an empty uncompressed body.
    pub fn from_fields(uncompressed_size: Option<u64>, compressed_size: Option<u64>) -> Self {
        let compression = match compressed_size {
            Some(size) if size > 0 => Compression::Deflate {
                compressed_size: size,
            },
            _ => Compression::None,
        };
        Self {
            uncompressed_size: uncompressed_size.unwrap_or(0),
            compression,
        }
    }

    /// True if the body is compressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self.compression, Compression::Deflate { .. })
    }

    /// Number of body bytes that follow the header on the stream.
    pub fn on_disk_size(&self) -> u64 {
        match self.compression {
            Compression::None => self.uncompressed_size,
            Compression::Deflate { compressed_size } => compressed_size,
        }
    }

    /// Length of the encoded header in bytes.
    pub fn encoded_len(&self) -> usize {
        let mut len = varint_len(field_key(UNCOMPRESSED_SIZE_FIELD, WIRE_VARINT))
            + varint_len(self.uncompressed_size);
        if let Compression::Deflate { compressed_size } = self.compression {
            len += varint_len(field_key(COMPRESSED_SIZE_FIELD, WIRE_VARINT))
                + varint_len(compressed_size);
        }
        len
    }

    /// Append the encoded header to `dst`.
    pub fn encode<B: BufMut>(&self, dst: &mut B) {
        put_varint(dst, field_key(UNCOMPRESSED_SIZE_FIELD, WIRE_VARINT));
        put_varint(dst, self.uncompressed_size);
        if let Compression::Deflate { compressed_size } = self.compression {
            put_varint(dst, field_key(COMPRESSED_SIZE_FIELD, WIRE_VARINT));
            put_varint(dst, compressed_size);
        }
    }

    /// Encode the header into a fresh buffer.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }

    /// Decode a header from exactly the bytes of one encoded header.
    ///
    /// Unknown fields are skipped, as is a known field carrying a wire type
    /// other than varint. If a known field appears more than once, the last
    /// occurrence wins.
    pub fn decode(mut src: &[u8]) -> Result<Self, HeaderError> {
        let mut uncompressed_size = None;
        let mut compressed_size = None;

        while src.has_remaining() {
            let key = get_varint(&mut src)?;
            let field = key >> 3;
            let wire_type = (key & 0x07) as u8;
            if field == 0 {
                return Err(HeaderError::ZeroField);
            }

            match (field, wire_type) {
                (UNCOMPRESSED_SIZE_FIELD, WIRE_VARINT) => {
                    uncompressed_size = Some(get_varint(&mut src)?);
                }
                (COMPRESSED_SIZE_FIELD, WIRE_VARINT) => {
                    compressed_size = Some(get_varint(&mut src)?);
                }
                _ => skip_field(&mut src, field, wire_type)?,
            }
        }

        Ok(Self::from_fields(uncompressed_size, compressed_size))
    }
}

fn field_key(field: u64, wire_type: u8) -> u64 {
    (field << 3) | u64::from(wire_type)
}

fn skip_field(src: &mut &[u8], field: u64, wire_type: u8) -> Result<(), HeaderError> {
    let len = match wire_type {
        WIRE_VARINT => {
            get_varint(src)?;
            return Ok(());
        }
        WIRE_FIXED64 => 8,
        WIRE_LENGTH_DELIMITED => get_varint(src)?,
        WIRE_FIXED32 => 4,
        _ => return Err(HeaderError::UnsupportedWireType { field, wire_type }),
    };

    if (src.remaining() as u64) < len {
        return Err(HeaderError::Truncated {
            field,
            needed: len,
            remaining: src.remaining(),
        });
    }
    src.advance(len as usize);
    Ok(())
}

pub(crate) fn put_varint<B: BufMut>(dst: &mut B, mut value: u64) {
    while value >= 0x80 {
        dst.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    dst.put_u8(value as u8);
}

pub(crate) fn get_varint(src: &mut &[u8]) -> Result<u64, HeaderError> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        if !src.has_remaining() {
            return Err(HeaderError::TruncatedVarint);
        }
        let byte = src.get_u8();
        // The tenth byte may only carry the top bit of a u64.
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(HeaderError::VarintOverflow);
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(HeaderError::VarintOverflow)
}

pub(crate) fn varint_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    (64 - value.leading_zeros() as usize).div_ceil(7)
}
