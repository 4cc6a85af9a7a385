use recordio_frame::{Header, HeaderError};

/// A pluggable encoding between structured values and record payloads.
///
/// The record layer treats payloads as opaque bytes; codecs are the only
/// place payload structure is known.
pub trait MessageCodec<T> {
    /// Error produced by either direction of the codec.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encode a value into record bytes.
    fn encode(&self, value: &T) -> Result<Vec<u8>, Self::Error>;

    /// Decode a value from record bytes.
    fn decode(&self, bytes: &[u8]) -> Result<T, Self::Error>;
}

impl<T, C: MessageCodec<T>> MessageCodec<T> for &C {
    type Error = C::Error;

    fn encode(&self, value: &T) -> Result<Vec<u8>, Self::Error> {
        (**self).encode(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, Self::Error> {
        (**self).decode(bytes)
    }
}

/// Stores record headers as payloads, in their own TLV encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderCodec;

impl MessageCodec<Header> for HeaderCodec {
    type Error = HeaderError;

    fn encode(&self, value: &Header) -> Result<Vec<u8>, HeaderError> {
        Ok(value.encode_to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Header, HeaderError> {
        Header::decode(bytes)
    }
}

/// A codec built from an encode closure and a decode closure.
#[derive(Clone)]
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

/// Build a codec from a pair of closures sharing one error type.
pub fn fn_codec<T, Err, E, D>(encode: E, decode: D) -> FnCodec<E, D>
where
    E: Fn(&T) -> Result<Vec<u8>, Err>,
    D: Fn(&[u8]) -> Result<T, Err>,
{
    FnCodec { encode, decode }
}

impl<T, Err, E, D> MessageCodec<T> for FnCodec<E, D>
where
    E: Fn(&T) -> Result<Vec<u8>, Err>,
    D: Fn(&[u8]) -> Result<T, Err>,
    Err: std::error::Error + Send + Sync + 'static,
{
    type Error = Err;

    fn encode(&self, value: &T) -> Result<Vec<u8>, Err> {
        (self.encode)(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, Err> {
        (self.decode)(bytes)
    }
}
