//! Opening transports.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_tungstenite::{Connector, connect_async_tls_with_config};

use super::{DialError, Transport, TransportError, TransportResult, WsTransport};
use crate::core::{CallContext, HANDSHAKE_TIMEOUT, URL_SCHEME};

/// Opens one transport to a fixed target.
///
/// A dialer makes exactly one attempt per call and never retries;
/// resilience is layered on top by the client's reconnector.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Make one connection attempt, abandoning it when `ctx` is done.
    async fn dial(&self, ctx: &CallContext) -> Result<Box<dyn Transport>, DialError>;
}

/// Dials `wss://<target>` with a pinned-key TLS configuration.
#[derive(Debug, Clone)]
pub struct TlsDialer {
    target: String,
    tls: Arc<rustls::ClientConfig>,
    handshake_timeout: Duration,
}

impl TlsDialer {
    /// Create a dialer for `target` (`host:port`).
    pub fn new(target: impl Into<String>, tls: Arc<rustls::ClientConfig>) -> Self {
        Self {
            target: target.into(),
            tls,
            handshake_timeout: HANDSHAKE_TIMEOUT,
        }
    }

    /// Override the opening handshake timeout.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

#[async_trait]
impl Dialer for TlsDialer {
    async fn dial(&self, ctx: &CallContext) -> Result<Box<dyn Transport>, DialError> {
        let url = target_url(&self.target).map_err(|e| DialError::new(&self.target, e))?;
        let connector = Connector::Rustls(Arc::clone(&self.tls));
        let connect = connect_async_tls_with_config(url.as_str(), None, false, Some(connector));

        let attempt = tokio::select! {
            biased;
            reason = ctx.done() => return Err(DialError::new(&self.target, reason)),
            attempt = tokio::time::timeout(self.handshake_timeout, connect) => attempt,
        };

        match attempt {
            Ok(Ok((stream, _response))) => Ok(Box::new(WsTransport::new(stream))),
            Ok(Err(err)) => Err(DialError::new(&self.target, err)),
            Err(_elapsed) => Err(DialError::new(
                &self.target,
                TransportError::DeadlineExceeded,
            )),
        }
    }
}

/// Build the URL dialed for `target`.
///
/// The target is a bare `host:port`; schemes and paths are rejected so that
/// the client cannot silently downgrade to plain `ws://`.
pub fn target_url(target: &str) -> TransportResult<String> {
    let target = target.trim();
    if target.is_empty() {
        return Err(TransportError::InvalidTarget("empty target".into()));
    }
    if target.contains("://") || target.contains('/') || target.contains(char::is_whitespace) {
        return Err(TransportError::InvalidTarget(format!(
            "expected host:port, got {target:?}"
        )));
    }
    Ok(format!("{URL_SCHEME}://{target}"))
}
