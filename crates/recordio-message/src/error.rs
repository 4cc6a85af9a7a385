use recordio_frame::RecordError;

/// Errors from reading or writing a structured message.
///
/// `E` is the error type of the payload codec in use.
#[derive(Debug, thiserror::Error)]
pub enum MessageError<E> {
    /// Record-level error from the underlying stream.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// The payload codec failed to encode or decode the message.
    #[error("payload codec error: {0}")]
    Codec(#[source] E),
}

impl<E> MessageError<E> {
    /// True for the clean "no more records" condition.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, MessageError::Record(RecordError::EndOfStream))
    }
}

pub type Result<T, E> = std::result::Result<T, MessageError<E>>;
