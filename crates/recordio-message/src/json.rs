use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::MessageCodec;

/// JSON payloads via serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T: Serialize + DeserializeOwned> MessageCodec<T> for JsonCodec {
    type Error = serde_json::Error;

    fn encode(&self, value: &T) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
