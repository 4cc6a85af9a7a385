use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use bytes::{Bytes, BytesMut};

use crate::codec::{decode_frame, pending_section, RecordConfig};
use crate::error::{RecordError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads records from any `Read` stream, one frame per call.
///
/// Handles partial reads internally, so callers always get complete records.
/// The reader buffers ahead of the current frame; bytes past the last
/// returned record are lost if the reader is unwrapped with `into_inner`.
pub struct RecordReader<T> {
    inner: T,
    buf: BytesMut,
    config: RecordConfig,
    done: bool,
}

impl RecordReader<File> {
    /// Open a record file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<T: Read> RecordReader<T> {
    /// Create a new record reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, RecordConfig::default())
    }

    /// Create a new record reader with explicit configuration.
    pub fn with_config(inner: T, config: RecordConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            done: false,
        }
    }

    /// Read the next record (blocking).
    ///
    /// Returns `Err(RecordError::EndOfStream)` when the stream ends cleanly at
    /// a frame boundary, and `Err(RecordError::TruncatedStream)` when it ends
    /// inside a frame. After any error other than `EndOfStream` the stream
    /// position is undefined and the reader should not be used again.
    pub fn read_record(&mut self) -> Result<Bytes> {
        loop {
            if let Some(record) = decode_frame(&mut self.buf, &self.config)? {
                return Ok(record);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(RecordError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Err(RecordError::EndOfStream);
                }
                let section = pending_section(&self.buf);
                tracing::debug!(%section, buffered = self.buf.len(), "record stream truncated");
                return Err(RecordError::TruncatedStream { section });
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum record size for subsequent reads.
    pub fn set_max_record_size(&mut self, max_record_size: usize) {
        self.config.max_record_size = max_record_size;
    }

    /// Current record reader configuration.
    pub fn config(&self) -> &RecordConfig {
        &self.config
    }
}

/// Yields records until the stream ends. `EndOfStream` ends iteration
/// and is not yielded; any other error is yielded once, then iteration stops.
impl<T: Read> Iterator for RecordReader<T> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(record) => Some(Ok(record)),
            Err(RecordError::EndOfStream) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
