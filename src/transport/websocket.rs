//! WebSocket transport.
//!
//! Wraps a `tokio-tungstenite` stream so that one [`Transport`] message is
//! one binary WebSocket frame.

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use async_trait::async_trait;

use super::{Transport, TransportError, TransportResult, with_deadline};

/// [`Transport`] over an established WebSocket.
///
/// Deadlines set with [`Transport::set_write_deadline`] and
/// [`Transport::set_read_deadline`] stay in force until replaced.
#[derive(Debug)]
pub struct WsTransport<S = MaybeTlsStream<TcpStream>> {
    stream: WebSocketStream<S>,
    write_deadline: Option<Instant>,
    read_deadline: Option<Instant>,
}

impl<S> WsTransport<S> {
    /// Wrap an open WebSocket stream.
    pub fn new(stream: WebSocketStream<S>) -> Self {
        Self {
            stream,
            write_deadline: None,
            read_deadline: None,
        }
    }

    /// Current write deadline.
    pub fn write_deadline(&self) -> Option<Instant> {
        self.write_deadline
    }

    /// Current read deadline.
    pub fn read_deadline(&self) -> Option<Instant> {
        self.read_deadline
    }
}

#[async_trait]
impl<S> Transport for WsTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn set_write_deadline(&mut self, deadline: Instant) -> TransportResult<()> {
        self.write_deadline = Some(deadline);
        Ok(())
    }

    fn set_read_deadline(&mut self, deadline: Instant) -> TransportResult<()> {
        self.read_deadline = Some(deadline);
        Ok(())
    }

    async fn send(&mut self, payload: &[u8]) -> TransportResult<()> {
        let deadline = self.write_deadline;
        let stream = &mut self.stream;
        with_deadline(deadline, async move {
            stream
                .send(WsMessage::Binary(payload.to_vec()))
                .await
                .map_err(TransportError::from)
        })
        .await
    }

    async fn recv(&mut self) -> TransportResult<Vec<u8>> {
        let deadline = self.read_deadline;
        let stream = &mut self.stream;
        with_deadline(deadline, async move {
            loop {
                match stream.next().await {
                    Some(Ok(WsMessage::Binary(data))) => return Ok(data),
                    Some(Ok(WsMessage::Text(text))) => return Ok(text.into_bytes()),
                    Some(Ok(WsMessage::Close(_))) | None => {
                        return Err(TransportError::ConnectionClosed);
                    }
                    // Control frames; pings are answered by the library.
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Err(err.into()),
                }
            }
        })
        .await
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.stream.close(None).await.map_err(TransportError::from)
    }
}
