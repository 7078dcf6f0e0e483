//! # unirpc
//!
//! A single-connection RPC client for services reachable over mutually
//! authenticated WebSocket/TLS.
//!
//! The client keeps one connection to a fixed server and runs calls over it
//! strictly one at a time. It provides:
//!
//! - **Pinned identities**: both ends authenticate with Ed25519 keys carried
//!   in self-signed certificates; no certificate authority is involved
//! - **Transparent recovery**: any transport failure during a call triggers
//!   a reconnect with exponential backoff, after which the call is resent
//! - **Caller-controlled lifetimes**: every operation takes a
//!   [`CallContext`](core::CallContext) whose cancellation or deadline is
//!   the only thing that stops a call short of a response
//! - **Pluggable pieces**: logging, serialization, and the transport itself
//!   sit behind traits
//!
//! ## Feature Flags
//!
//! - `transport` (default): transport trait, WebSocket/TLS transport and dialer
//! - `crypto` (default): Ed25519 identities and pinned-key TLS configuration
//! - `client` (default): the high-level [`UniClient`](client::UniClient)
//!
//! ## Modules
//!
//! - [`core`]: call context, logger, constants, and error types (always included)
//! - [`message`]: wire envelopes and codecs (always included)
//! - [`transport`]: transport layer (requires `transport` feature)
//! - [`crypto`]: credentials (requires `crypto` feature)
//! - [`client`]: client API (requires `client` feature)
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use unirpc::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = ClientIdentity::from_hex(&std::env::var("CLIENT_KEY")?)?;
//! let peers = PeerKeys::from_hex([std::env::var("SERVER_KEY")?])?;
//!
//! let config = ClientConfigBuilder::new()
//!     .target("rpc.example.com:443")
//!     .build();
//! let client = UniClient::new(config, &identity, &peers, Arc::new(TracingLogger))?;
//!
//! let ctx = CallContext::background().with_timeout(Duration::from_secs(10));
//! let greeting: String = client.invoke(&ctx, "Hello", "world").await?;
//! println!("{greeting}");
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Wire format (always included)
pub mod message;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Crypto layer (feature-gated)
#[cfg(feature = "crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "crypto")))]
pub mod crypto;

// Client API (feature-gated)
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core traits and types
    pub use crate::core::*;

    pub use crate::message::{Exchange, JsonCodec, Message, MessageCodec, Request, Response};

    #[cfg(feature = "transport")]
    pub use crate::transport::{
        DialError, Dialer, TlsDialer, Transport, TransportError, TransportResult, WsTransport,
    };

    #[cfg(feature = "crypto")]
    pub use crate::crypto::{ClientIdentity, CredentialError, PeerKeys, client_tls_config};

    #[cfg(feature = "client")]
    pub use crate::client::{
        BackoffPolicy, ClientConfig, ClientConfigBuilder, ClientError, ClientResult, UniClient,
    };
}

// Re-export commonly used items at crate root
pub use core::{CallContext, ContextError, Logger, TracingLogger};

#[cfg(feature = "client")]
pub use client::{ClientError, UniClient};
