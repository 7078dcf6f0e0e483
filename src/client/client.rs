//! High-level unirpc client API.
//!
//! Provides [`UniClient`], which holds one connection to a fixed server and
//! runs calls over it one at a time, reconnecting transparently whenever the
//! transport fails.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::backoff::BackoffPolicy;
use super::reconnect::Reconnector;
use crate::core::{CallContext, CodecError, ContextError, HANDSHAKE_TIMEOUT, Logger};
use crate::crypto::{ClientIdentity, CredentialError, PeerKeys, client_tls_config};
use crate::message::{Exchange, JsonCodec, Message, MessageCodec};
use crate::transport::{Dialer, TlsDialer, Transport, TransportError, target_url};

/// Errors that can occur in the unirpc client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Key material could not be turned into TLS credentials.
    #[error("invalid credentials: {0}")]
    Credential(#[from] CredentialError),

    /// The caller's context ended before the operation completed.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The call arguments or envelope could not be serialized.
    #[error("encoding error: {0}")]
    Encoding(#[source] CodecError),

    /// The response envelope or reply could not be deserialized.
    #[error("decoding error: {0}")]
    Decoding(#[source] CodecError),

    /// The server answered without a payload.
    #[error("response payload is nil")]
    EmptyPayload,

    /// The server sent something other than a response.
    #[error("unexpected message type: {0}")]
    UnexpectedMessageType(&'static str),

    /// The configured server address cannot be dialed.
    #[error(transparent)]
    InvalidTarget(TransportError),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address (`host:port`).
    pub target: String,

    /// Upper bound on one WebSocket/TLS opening handshake.
    pub handshake_timeout: Duration,

    /// Wait between failed dials.
    pub backoff: BackoffPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: "127.0.0.1:8443".to_string(),
            handshake_timeout: HANDSHAKE_TIMEOUT,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Builder for a [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server address.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.config.target = target.into();
        self
    }

    /// Set the opening handshake timeout.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Set the reconnection backoff.
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.config.backoff = backoff;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// A single-connection RPC client.
///
/// All use of the connection is serialized by one lock: a call holds it from
/// sending the request until its response is read, including any reconnects
/// needed on the way. Calls from concurrent tasks therefore run one after
/// the other, in the order they acquired the lock.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use unirpc::client::UniClient;
/// use unirpc::core::{CallContext, TracingLogger};
///
/// # async fn run(signing_key: [u8; 32], server_key: [u8; 32]) -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = CallContext::background().with_timeout(Duration::from_secs(30));
/// let client = UniClient::dial_with_context(
///     &ctx,
///     Arc::new(TracingLogger),
///     "rpc.example.com:443",
///     &signing_key,
///     &server_key,
/// )
/// .await?;
///
/// let sum: u64 = client.invoke(&ctx, "Add", &(2u64, 3u64)).await?;
/// assert_eq!(sum, 5);
///
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct UniClient<C: MessageCodec = JsonCodec> {
    /// The live transport, if any. Only touched while locked.
    conn: Mutex<Option<Box<dyn Transport>>>,

    /// Dialer wrapped with unbounded retry.
    reconnector: Reconnector,

    /// Envelope and payload serialization.
    codec: C,

    /// Diagnostic sink.
    logger: Arc<dyn Logger>,
}

impl UniClient<JsonCodec> {
    /// Create a client that dials `config.target` over TLS, authenticating
    /// as `identity` and accepting only servers holding one of `peers`.
    ///
    /// No connection is made until [`dial`](Self::dial) or the first call,
    /// but a target that could never be dialed is rejected here.
    pub fn new(
        config: ClientConfig,
        identity: &ClientIdentity,
        peers: &PeerKeys,
        logger: Arc<dyn Logger>,
    ) -> ClientResult<Self> {
        target_url(&config.target).map_err(ClientError::InvalidTarget)?;
        let tls = client_tls_config(identity, peers)?;
        let dialer =
            TlsDialer::new(config.target, tls).with_handshake_timeout(config.handshake_timeout);
        Ok(Self::with_dialer(Arc::new(dialer), config.backoff, logger))
    }

    /// Create a client over any [`Dialer`].
    pub fn with_dialer(
        dialer: Arc<dyn Dialer>,
        backoff: BackoffPolicy,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            conn: Mutex::new(None),
            reconnector: Reconnector::new(dialer, backoff, Arc::clone(&logger)),
            codec: JsonCodec,
            logger,
        }
    }

    /// Construct a client from raw Ed25519 keys and connect it.
    ///
    /// Blocks until connected or `ctx` ends. `signing_key` is the 32-byte
    /// seed or 64-byte keypair; `server_key` the 32-byte public key of the
    /// only server accepted.
    pub async fn dial_with_context(
        ctx: &CallContext,
        logger: Arc<dyn Logger>,
        target: impl Into<String>,
        signing_key: &[u8],
        server_key: &[u8],
    ) -> ClientResult<Self> {
        let identity = ClientIdentity::from_bytes(signing_key)?;
        let peers = PeerKeys::from_bytes(server_key)?;
        let config = ClientConfigBuilder::new().target(target).build();

        let client = Self::new(config, &identity, &peers, logger)?;
        client.dial(ctx).await?;
        Ok(client)
    }
}

impl<C: MessageCodec> UniClient<C> {
    /// Replace the envelope codec.
    pub fn with_codec<D: MessageCodec>(self, codec: D) -> UniClient<D> {
        UniClient {
            conn: self.conn,
            reconnector: self.reconnector,
            codec,
            logger: self.logger,
        }
    }

    /// Connect, retrying until a transport is open or `ctx` ends.
    ///
    /// A previously held transport is closed and replaced.
    pub async fn dial(&self, ctx: &CallContext) -> ClientResult<()> {
        let mut conn = self.conn.lock().await;
        let fresh = self.reconnector.reconnect(ctx).await?;
        self.replace(&mut conn, fresh).await;
        Ok(())
    }

    /// Call `method` on the server and wait for its reply.
    ///
    /// Transport failures are retried on a fresh connection for as long as
    /// `ctx` is live; the call only fails on the end of `ctx` or on a
    /// malformed or empty response.
    pub async fn invoke<A, R>(&self, ctx: &CallContext, method: &str, args: &A) -> ClientResult<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut conn = self.conn.lock().await;

        let call_id = Uuid::new_v4().to_string();
        let payload = self.codec.encode(args).map_err(ClientError::Encoding)?;
        let request = self
            .codec
            .encode(&Message::request(call_id.as_str(), method, payload))
            .map_err(ClientError::Encoding)?;

        let deadline = ctx.deadline();
        let response = 'exchange: loop {
            if conn.is_none() {
                *conn = Some(self.reconnector.reconnect(ctx).await?);
            }
            let Some(transport) = conn.as_mut() else {
                continue;
            };

            if let Some(deadline) = deadline {
                let _ = transport.set_write_deadline(deadline);
            }
            let sent = tokio::select! {
                biased;
                reason = ctx.done() => return Err(reason.into()),
                sent = transport.send(&request) => sent,
            };
            if let Err(err) = sent {
                self.recover(ctx, &mut conn, "writing", err).await?;
                continue;
            }

            loop {
                if let Some(deadline) = deadline {
                    let _ = transport.set_read_deadline(deadline);
                }
                let received = tokio::select! {
                    biased;
                    reason = ctx.done() => return Err(reason.into()),
                    received = transport.recv() => received,
                };
                let bytes = match received {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        self.recover(ctx, &mut conn, "reading", err).await?;
                        continue 'exchange;
                    }
                };

                let msg: Message = self.codec.decode(&bytes).map_err(ClientError::Decoding)?;
                if let Some(Exchange::Response(resp)) = &msg.exchange {
                    if !resp.answers(&call_id) {
                        self.logger.warn(format_args!(
                            "discarding response for call {} while waiting for {call_id}",
                            resp.call_id
                        ));
                        continue;
                    }
                }
                break 'exchange msg;
            }
        };
        drop(conn);

        let kind = response.kind();
        match response.exchange {
            Some(Exchange::Response(resp)) => {
                if !resp.error.is_empty() {
                    self.logger.warn(format_args!(
                        "response to call {call_id} carries error: {}",
                        resp.error
                    ));
                }
                let payload = resp.payload.ok_or(ClientError::EmptyPayload)?;
                self.codec.decode(&payload).map_err(ClientError::Decoding)
            }
            _ => Err(ClientError::UnexpectedMessageType(kind)),
        }
    }

    /// Close the current transport, returning its close error verbatim.
    ///
    /// Closing a client without a live transport succeeds. A later call
    /// reconnects.
    pub async fn close(&self) -> Result<(), TransportError> {
        let mut conn = self.conn.lock().await;
        match conn.take() {
            Some(mut transport) => transport.close().await,
            None => Ok(()),
        }
    }

    /// Whether a transport is currently held.
    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// After a failed send or receive: drop the failed transport, then give
    /// up if the caller is done or dial a fresh one.
    ///
    /// The slot stays empty while reconnecting, so a cancelled reconnect
    /// leaves no dead transport behind.
    async fn recover(
        &self,
        ctx: &CallContext,
        conn: &mut Option<Box<dyn Transport>>,
        op: &str,
        err: TransportError,
    ) -> ClientResult<()> {
        let failed = conn.take();
        if let Some(reason) = ctx.err() {
            self.logger.warn(format_args!("ctx error {reason} {op} message"));
            return Err(reason.into());
        }
        self.logger.warn(format_args!(
            "received error {err} {op} message, reconnecting"
        ));
        if let Some(mut failed) = failed {
            tokio::select! {
                biased;
                _ = ctx.done() => {}
                closed = failed.close() => {
                    if let Err(err) = closed {
                        self.logger.debug(format_args!("closing failed transport: {err}"));
                    }
                }
            }
        }
        *conn = Some(self.reconnector.reconnect(ctx).await?);
        Ok(())
    }

    /// Store `fresh`, closing whatever it supersedes.
    async fn replace(&self, conn: &mut Option<Box<dyn Transport>>, fresh: Box<dyn Transport>) {
        if let Some(mut stale) = conn.replace(fresh) {
            if let Err(err) = stale.close().await {
                self.logger.debug(format_args!("closing superseded transport: {err}"));
            }
        }
    }
}

impl<C: MessageCodec + std::fmt::Debug> std::fmt::Debug for UniClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniClient")
            .field("reconnector", &self.reconnector)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
