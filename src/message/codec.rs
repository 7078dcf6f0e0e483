//! Pluggable envelope serialization.
//!
//! The client only needs "value to bytes" and "bytes to value"; which format
//! sits behind that is the embedder's choice.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::CodecError;

/// Serializer used for envelopes, call arguments and replies.
///
/// # Example
///
/// ```
/// use unirpc::message::{JsonCodec, Message, MessageCodec};
///
/// let codec = JsonCodec;
/// let msg = Message::request("id-1", "ping", vec![1, 2, 3]);
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: Message = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
pub trait MessageCodec: Clone + Send + Sync + 'static {
    /// Serialize a value.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Deserialize a value.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl MessageCodec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(CodecError::encode)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::decode)
    }
}
