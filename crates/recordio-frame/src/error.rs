use std::fmt;

use crate::header::HeaderError;

/// The part of a frame a truncated stream stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSection {
    /// The 4-byte magic number.
    Magic,
    /// The 4-byte header length.
    HeaderLength,
    /// The encoded header.
    Header,
    /// The record body.
    Body,
}

impl fmt::Display for FrameSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameSection::Magic => "magic",
            FrameSection::HeaderLength => "header length",
            FrameSection::Header => "header",
            FrameSection::Body => "body",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while reading or writing records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The stream ended cleanly at a frame boundary. No more records.
    #[error("end of record stream")]
    EndOfStream,

    /// The stream ended in the middle of a frame.
    #[error("record stream truncated in frame {section}")]
    TruncatedStream { section: FrameSection },

    /// The frame does not start with the recordio magic number.
    #[error("invalid record magic 0x{found:08x} (expected 0x4e731039)")]
    MagicMismatch { found: u32 },

    /// The frame header could not be decoded.
    #[error("corrupt record header: {0}")]
    HeaderDecode(#[from] HeaderError),

    /// The declared header length exceeds the configured maximum.
    #[error("record header too large ({size} bytes, max {max})")]
    HeaderTooLarge { size: usize, max: usize },

    /// The record exceeds the configured maximum size.
    #[error("record too large ({size} bytes, max {max})")]
    RecordTooLarge { size: u64, max: u64 },

    /// The record body is not a valid zlib stream.
    #[error("failed to decompress record: {0}")]
    Decompression(#[source] std::io::Error),

    /// The decompressed record length disagrees with the header.
    #[error("decompressed record size {actual} does not match header size {expected}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// The record could not be compressed.
    #[error("failed to compress record: {0}")]
    Compression(#[source] std::io::Error),

    /// An I/O error occurred on the underlying stream.
    #[error("record I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordError {
    /// True for the clean "no more records" condition.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, RecordError::EndOfStream)
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
