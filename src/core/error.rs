//! Error types shared across layers.

use thiserror::Error;

/// Why a [`CallContext`](super::CallContext) is done.
///
/// Returned verbatim to callers whose operation was cut short by their own
/// cancellation or deadline.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The context was cancelled.
    #[error("context canceled")]
    Cancelled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Errors at the serialization boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value could not be serialized.
    #[error("encode failed: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Bytes could not be deserialized into the requested shape.
    #[error("decode failed: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CodecError {
    /// Wrap an encoding failure.
    pub fn encode<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Encode(Box::new(err))
    }

    /// Wrap a decoding failure.
    pub fn decode<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Decode(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_error_messages() {
        assert_eq!(ContextError::Cancelled.to_string(), "context canceled");
        assert_eq!(
            ContextError::DeadlineExceeded.to_string(),
            "context deadline exceeded"
        );
    }

    #[test]
    fn test_codec_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
        let err = CodecError::decode(io);

        assert!(matches!(err, CodecError::Decode(_)));
        assert_eq!(err.to_string(), "decode failed: bad bytes");
        assert!(std::error::Error::source(&err).is_some());
    }
}
