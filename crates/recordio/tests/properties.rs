use std::io::Cursor;

use proptest::collection::vec;
use proptest::prelude::*;
use recordio::frame::{Header, RecordError, RecordReader, RecordWriter, PREFIX_SIZE};

proptest! {
    #[test]
    fn single_record_roundtrip(record in vec(any::<u8>(), 0..4096), compress in any::<bool>()) {
        let mut writer = RecordWriter::new(Vec::<u8>::new()).with_compression(compress);
        let header = writer.write_record(&record).unwrap();
        let wire = writer.into_inner();

        prop_assert_eq!(header.uncompressed_size, record.len() as u64);
        prop_assert_eq!(
            wire.len(),
            PREFIX_SIZE + header.encoded_len() + header.on_disk_size() as usize
        );

        let mut reader = RecordReader::new(Cursor::new(wire));
        let got = reader.read_record().unwrap();
        prop_assert_eq!(got.as_ref(), record.as_slice());
        prop_assert!(reader.read_record().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn mixed_stream_preserves_order(
        records in vec((vec(any::<u8>(), 0..512), any::<bool>()), 0..16)
    ) {
        let mut writer = RecordWriter::new(Vec::<u8>::new());
        for (record, compress) in &records {
            writer.set_compress(*compress);
            writer.write_record(record).unwrap();
        }

        let mut reader = RecordReader::new(Cursor::new(writer.into_inner()));
        for (record, _) in &records {
            let got = reader.read_record().unwrap();
            prop_assert_eq!(got.as_ref(), record.as_slice());
        }
        prop_assert!(reader.read_record().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn any_strict_prefix_is_truncated(
        record in vec(any::<u8>(), 0..256),
        compress in any::<bool>(),
        cut in any::<prop::sample::Index>(),
    ) {
        let mut writer = RecordWriter::new(Vec::<u8>::new()).with_compression(compress);
        writer.write_record(&record).unwrap();
        let wire = writer.into_inner();

        let len = 1 + cut.index(wire.len() - 1);
        let mut reader = RecordReader::new(Cursor::new(wire[..len].to_vec()));
        let err = reader.read_record().unwrap_err();
        prop_assert!(matches!(err, RecordError::TruncatedStream { .. }), "{:?}", err);
    }

    #[test]
    fn header_roundtrip(uncompressed in any::<u64>(), compressed in any::<Option<u64>>()) {
        let header = Header::from_fields(Some(uncompressed), compressed);
        let bytes = header.encode_to_vec();
        prop_assert_eq!(bytes.len(), header.encoded_len());
        prop_assert_eq!(Header::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn header_decode_never_panics(bytes in vec(any::<u8>(), 0..64)) {
        let _ = Header::decode(&bytes);
    }
}
