//! Transport layer error types.
//!
//! Transport errors are transient from the client's point of view: they
//! trigger a reconnect and are only logged while the caller's context is
//! live.

use std::io;

use thiserror::Error;

use crate::core::ContextError;

/// Transport layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error (socket operations).
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// WebSocket protocol or TLS error.
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// The peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// A deadline set on the transport passed.
    #[error("i/o deadline exceeded")]
    DeadlineExceeded,

    /// The caller's context ended while the operation was pending.
    #[error("interrupted: {0}")]
    Interrupted(#[from] ContextError),

    /// The target address cannot be turned into a URL.
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::ConnectionClosed,
            WsError::Io(io) => TransportError::Io(io),
            other => TransportError::WebSocket(Box::new(other)),
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A single connection attempt failed.
#[derive(Debug, Error)]
#[error("error while dialing {target}: {source}")]
pub struct DialError {
    /// Address that was dialed.
    pub target: String,
    /// Underlying failure.
    #[source]
    pub source: TransportError,
}

impl DialError {
    /// Wrap a failure to reach `target`.
    pub fn new(target: impl Into<String>, source: impl Into<TransportError>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }
}
