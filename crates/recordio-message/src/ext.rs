use std::io::{Read, Write};

use recordio_frame::{Header, RecordReader, RecordWriter};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::MessageCodec;
use crate::error::{MessageError, Result};
use crate::json::JsonCodec;

/// Read structured messages from a record stream.
pub trait ReadMessageExt {
    /// Read the next record and decode it with `codec`.
    fn read_message<T, C: MessageCodec<T>>(&mut self, codec: &C) -> Result<T, C::Error>;

    /// Read the next record as JSON.
    fn read_json<T: DeserializeOwned>(&mut self) -> Result<T, serde_json::Error> {
        self.read_message(&JsonCodec)
    }
}

/// Write structured messages to a record stream.
pub trait WriteMessageExt {
    /// Encode `value` with `codec` and write it as one record.
    fn write_message<T, C: MessageCodec<T>>(&mut self, value: &T, codec: &C)
        -> Result<Header, C::Error>;

    /// Write `value` as a JSON record. Only serialization is required.
    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T)
        -> Result<Header, serde_json::Error>;
}

impl<R: Read> ReadMessageExt for RecordReader<R> {
    fn read_message<T, C: MessageCodec<T>>(&mut self, codec: &C) -> Result<T, C::Error> {
        let record = self.read_record()?;
        codec.decode(&record).map_err(|err| {
            tracing::debug!(error = %err, size = record.len(), "message decode failed");
            MessageError::Codec(err)
        })
    }
}

impl<W: Write> WriteMessageExt for RecordWriter<W> {
    fn write_message<T, C: MessageCodec<T>>(
        &mut self,
        value: &T,
        codec: &C,
    ) -> Result<Header, C::Error> {
        let payload = codec.encode(value).map_err(MessageError::Codec)?;
        Ok(self.write_record(&payload)?)
    }

    fn write_json<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<Header, serde_json::Error> {
        let payload = serde_json::to_vec(value).map_err(MessageError::Codec)?;
        Ok(self.write_record(&payload)?)
    }
}
