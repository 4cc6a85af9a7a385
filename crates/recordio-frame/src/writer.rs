use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use bytes::BytesMut;

use crate::codec::{encode_frame, RecordConfig};
use crate::error::{RecordError, Result};
use crate::header::Header;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes records to any `Write` stream, one frame per call.
///
/// Records longer than `max_record_size` (256 MiB by default, see
/// [`DEFAULT_MAX_RECORD_SIZE`](crate::DEFAULT_MAX_RECORD_SIZE)) are rejected
/// with [`RecordError::RecordTooLarge`]. Raise the limit with
/// [`set_max_record_size`](Self::set_max_record_size) or
/// [`with_config`](Self::with_config); readers must allow the same size.
///
/// A failed write may leave a partial frame on the stream; treat the stream
/// as unusable for further appends after an error.
pub struct RecordWriter<T> {
    inner: T,
    buf: BytesMut,
    config: RecordConfig,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (or truncate) a record file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }

    /// Open a record file for appending, creating it if needed.
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<T: Write> RecordWriter<T> {
    /// Create a new record writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, RecordConfig::default())
    }

    /// Create a new record writer with explicit configuration.
    pub fn with_config(inner: T, config: RecordConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Enable or disable compression for subsequent records.
    pub fn set_compress(&mut self, compress: bool) {
        self.config.compress = compress;
    }

    /// Builder form of [`set_compress`](Self::set_compress).
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.set_compress(compress);
        self
    }

    /// Update the maximum record size for subsequent writes.
    pub fn set_max_record_size(&mut self, max_record_size: usize) {
        self.config.max_record_size = max_record_size;
    }

    /// Whether subsequent records will be compressed.
    pub fn compress(&self) -> bool {
        self.config.compress
    }

    /// Encode and write one record (blocking). Returns the header written.
    pub fn write_record(&mut self, record: &[u8]) -> Result<Header> {
        self.buf.clear();
        let header = encode_frame(record, &self.config, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(RecordError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(RecordError::Io(err)),
            }
        }

        tracing::trace!(
            size = header.uncompressed_size,
            on_disk = header.on_disk_size(),
            compressed = header.is_compressed(),
            "record written"
        );
        self.flush()?;
        Ok(header)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(RecordError::Io(err)),
            }
        }
    }

    /// Flush, then return the inner stream.
    pub fn finish(mut self) -> Result<T> {
        self.flush()?;
        Ok(self.inner)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current record writer configuration.
    pub fn config(&self) -> &RecordConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::{decode_frame, MAGIC, PREFIX_SIZE};
    use crate::reader::RecordReader;

    fn decode_all(bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut wire = BytesMut::from(bytes);
        let mut out = Vec::new();
        while let Some(record) = decode_frame(&mut wire, &RecordConfig::default()).unwrap() {
            out.push(record.to_vec());
        }
        assert!(wire.is_empty());
        out
    }

    #[test]
    fn write_single_record() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));

        let header = writer.write_record(b"hello").unwrap();
        assert_eq!(header, Header::uncompressed(5));

        let wire = writer.into_inner().into_inner();
        assert_eq!(&wire[..4], &MAGIC.to_be_bytes());
        assert_eq!(wire.len(), PREFIX_SIZE + header.encoded_len() + 5);
        assert_eq!(decode_all(&wire), vec![b"hello".to_vec()]);
    }

    #[test]
    fn write_multiple_records() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.write_record(b"one").unwrap();
        writer.write_record(b"two").unwrap();
        writer.write_record(b"three").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(
            decode_all(&wire),
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn compression_toggle_applies_per_record() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));
        assert!(!writer.compress());

        let plain = writer.write_record(b"plain").unwrap();
        writer.set_compress(true);
        assert!(writer.compress());
        let packed = writer.write_record(b"packed").unwrap();
        writer.set_compress(false);
        let plain_again = writer.write_record(b"plain again").unwrap();

        assert!(!plain.is_compressed());
        assert!(packed.is_compressed());
        assert!(!plain_again.is_compressed());

        let wire = writer.into_inner().into_inner();
        assert_eq!(
            decode_all(&wire),
            vec![
                b"plain".to_vec(),
                b"packed".to_vec(),
                b"plain again".to_vec()
            ]
        );
    }

    #[test]
    fn compressed_and_plain_frames_differ() {
        let mut plain = RecordWriter::new(Vec::<u8>::new());
        let mut packed = RecordWriter::new(Vec::<u8>::new()).with_compression(true);

        plain.write_record(b"RECORD 1").unwrap();
        packed.write_record(b"RECORD 1").unwrap();

        assert_ne!(plain.get_ref(), packed.get_ref());
        assert_eq!(decode_all(plain.get_ref()), decode_all(packed.get_ref()));
    }

    #[test]
    fn oversized_record_rejected_before_writing() {
        let cfg = RecordConfig {
            max_record_size: 4,
            ..RecordConfig::default()
        };
        let mut writer = RecordWriter::with_config(Vec::<u8>::new(), cfg);

        let err = writer.write_record(b"oversized").unwrap_err();
        assert!(matches!(err, RecordError::RecordTooLarge { .. }));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn raised_limit_accepts_larger_records() {
        let mut writer = RecordWriter::new(Vec::<u8>::new());
        assert_eq!(writer.config().max_record_size, crate::DEFAULT_MAX_RECORD_SIZE);

        writer.set_max_record_size(4);
        let err = writer.write_record(b"oversized").unwrap_err();
        assert!(matches!(err, RecordError::RecordTooLarge { size: 9, max: 4 }));

        writer.set_max_record_size(9);
        let header = writer.write_record(b"oversized").unwrap();
        assert_eq!(header.uncompressed_size, 9);
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = RecordWriter::new(sink);

        writer.write_record(b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = RecordWriter::new(cursor);

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        assert!(!writer.config().compress);
        let _inner = writer.into_inner();
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = RecordWriter::new(writer_impl);
        writer.write_record(b"retry").unwrap();

        let inner = writer.into_inner();
        assert_eq!(decode_all(&inner.data), vec![b"retry".to_vec()]);
    }

    #[test]
    fn handles_would_block_write_and_flush() {
        let writer_impl = WouldBlockWriteThenFlush {
            wrote_once: false,
            flush_would_block: false,
            data: Vec::new(),
        };

        let mut writer = RecordWriter::new(writer_impl);
        writer.write_record(b"retry").unwrap();

        let inner = writer.into_inner();
        assert_eq!(decode_all(&inner.data), vec![b"retry".to_vec()]);
    }

    #[test]
    fn write_zero_is_io_error() {
        let mut writer = RecordWriter::new(ZeroWriter);
        let err = writer.write_record(b"x").unwrap_err();
        assert!(matches!(err, RecordError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[test]
    fn failing_sink_error_is_returned() {
        let mut writer = RecordWriter::new(BrokenPipeWriter);
        let err = writer.write_record(b"x").unwrap_err();
        assert!(matches!(err, RecordError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn create_then_append_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.rio");

        let mut writer = RecordWriter::create(&path).unwrap();
        writer.write_record(b"first").unwrap();
        writer.finish().unwrap();

        let mut writer = RecordWriter::append(&path).unwrap().with_compression(true);
        writer.write_record(b"second").unwrap();
        drop(writer);

        let mut bytes = Vec::new();
        File::open(&path).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(decode_all(&bytes), vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct WouldBlockWriteThenFlush {
        wrote_once: bool,
        flush_would_block: bool,
        data: Vec<u8>,
    }

    impl Write for WouldBlockWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_would_block {
                self.flush_would_block = true;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipeWriter;

    impl Write for BrokenPipeWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn written_records_read_back() {
        let mut writer = RecordWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.write_record(b"z").unwrap();

        let wire = writer.into_inner().into_inner();
        let mut reader = RecordReader::new(Cursor::new(wire));
        assert_eq!(reader.read_record().unwrap().as_ref(), b"z");
    }
}
