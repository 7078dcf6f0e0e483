//! unirpc - Transport Layer
//!
//! This module defines what the client needs from a connection and provides
//! the production implementation:
//!
//! - **Transport capability set**: [`Transport`], one message in, one message
//!   out, with per-direction deadlines
//! - **WebSocket over TLS**: [`WsTransport`], built on `tokio-tungstenite`
//! - **Dialing**: [`Dialer`] and [`TlsDialer`], one cancellable connection
//!   attempt per call, never retrying internally
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      Client (invoke / reconnect)        │
//! ├─────────────────────────────────────────┤
//! │         Transport Layer                 │  ← This module
//! │   Transport trait, dialer, deadlines    │
//! ├─────────────────────────────────────────┤
//! │     WebSocket (tokio-tungstenite)       │
//! ├─────────────────────────────────────────┤
//! │     TLS (rustls, pinned Ed25519 keys)   │
//! └─────────────────────────────────────────┘
//! ```

mod dialer;
mod error;
mod websocket;

pub use dialer::*;
pub use error::*;
pub use websocket::*;

use async_trait::async_trait;
use tokio::time::Instant;

/// Minimal capability set over a full-duplex, message-oriented channel.
///
/// Messages are delivered whole, in order and reliably within one
/// connection. Any implementation (real socket or test double) can back a
/// client.
#[async_trait]
pub trait Transport: Send {
    /// Bound the time the next sends may take.
    fn set_write_deadline(&mut self, deadline: Instant) -> TransportResult<()>;

    /// Bound the time the next receives may take.
    fn set_read_deadline(&mut self, deadline: Instant) -> TransportResult<()>;

    /// Send one message.
    async fn send(&mut self, payload: &[u8]) -> TransportResult<()>;

    /// Receive one message.
    async fn recv(&mut self) -> TransportResult<Vec<u8>>;

    /// Close the connection.
    async fn close(&mut self) -> TransportResult<()>;
}

/// Run `fut`, failing with [`TransportError::DeadlineExceeded`] if it is
/// still pending at `deadline`.
pub async fn with_deadline<F, T>(deadline: Option<Instant>, fut: F) -> TransportResult<T>
where
    F: std::future::Future<Output = TransportResult<T>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut)
            .await
            .map_err(|_| TransportError::DeadlineExceeded)?,
        None => fut.await,
    }
}
