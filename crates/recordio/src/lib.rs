//! Sequential, self-describing record streams.
//!
//! recordio stores an ordered stream of opaque byte records on a single
//! byte stream (file, socket, pipe). Each record is framed with a magic
//! number and a small extensible header, and may be zlib-compressed on its
//! own.
//!
//! # Crate Structure
//!
//! - [`frame`] — Wire format, `RecordReader` and `RecordWriter`
//! - [`message`] — Structured payload codecs (behind `message` feature)
//!
//! ```
//! use std::io::Cursor;
//! use recordio::frame::{RecordReader, RecordWriter};
//!
//! let mut writer = RecordWriter::new(Vec::<u8>::new()).with_compression(true);
//! writer.write_record(b"RECORD 1")?;
//! writer.write_record(b"RECORD 2")?;
//!
//! let mut reader = RecordReader::new(Cursor::new(writer.into_inner()));
//! assert_eq!(reader.read_record()?.as_ref(), b"RECORD 1");
//! assert_eq!(reader.read_record()?.as_ref(), b"RECORD 2");
//! assert!(reader.read_record().unwrap_err().is_end_of_stream());
//! # Ok::<(), recordio::frame::RecordError>(())
//! ```

/// Re-export frame types.
pub mod frame {
    pub use recordio_frame::*;
}

/// Re-export message types (requires `message` feature).
#[cfg(feature = "message")]
pub mod message {
    pub use recordio_message::*;
}
