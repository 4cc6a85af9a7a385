use crate::codec::MessageCodec;

/// Protocol Buffers payloads via prost.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProstCodec;

impl<M: prost::Message + Default> MessageCodec<M> for ProstCodec {
    type Error = prost::DecodeError;

    fn encode(&self, value: &M) -> Result<Vec<u8>, prost::DecodeError> {
        Ok(value.encode_to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<M, prost::DecodeError> {
        M::decode(bytes)
    }
}
