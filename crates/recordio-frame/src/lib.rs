//! Self-describing record framing for sequential byte streams.
//!
//! This is the core of recordio. Every record is written as one frame:
//! - A 4-byte big-endian magic number (`0x4e731039`) for stream validation
//! - A 4-byte big-endian header length
//! - A tag-length-value header carrying the logical and on-disk sizes
//! - The body, either the record itself or a zlib stream of it
//!
//! Frames are self-describing, so compressed and uncompressed records can be
//! mixed freely on one stream. No partial records, no buffer management in
//! user code.
//!
//! Readers and writers are single-owner and blocking. Share one across
//! threads only behind external synchronization.

pub mod codec;
pub mod compression;
pub mod error;
pub mod header;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, pending_section, RecordConfig, DEFAULT_MAX_HEADER_SIZE,
    DEFAULT_MAX_RECORD_SIZE, MAGIC, PREFIX_SIZE,
};
pub use compression::DEFAULT_COMPRESSION_LEVEL;
pub use error::{FrameSection, RecordError, Result};
pub use header::{Compression, Header, HeaderError};
pub use reader::RecordReader;
pub use writer::RecordWriter;
