//! Credential error types.

use thiserror::Error;

/// Errors turning key material into a TLS configuration.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The local signing key is malformed.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// A peer verification key is malformed.
    #[error("invalid peer key: {0}")]
    InvalidPeerKey(String),

    /// No peer key was supplied, so no server could be authenticated.
    #[error("no peer keys supplied")]
    NoPeerKeys,

    /// Key text is not valid hex.
    #[error("invalid hex key: {0}")]
    InvalidHex(String),

    /// The signing key could not be encoded as PKCS#8.
    #[error("pkcs8 encoding failed: {0}")]
    Pkcs8(String),

    /// The client certificate could not be generated.
    #[error("certificate generation failed: {0}")]
    Certificate(#[from] rcgen::Error),

    /// The TLS configuration was rejected.
    #[error("tls configuration failed: {0}")]
    Tls(#[from] rustls::Error),
}
