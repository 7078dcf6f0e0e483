//! unirpc - Security Layer
//!
//! Turns Ed25519 identities into a TLS client configuration with mutual,
//! key-pinned authentication:
//!
//! - [`ClientIdentity`]: the local signing key, presented to the server in a
//!   self-signed certificate
//! - [`PeerKeys`]: the server public keys the client accepts
//! - [`client_tls_config`]: builds the `rustls` configuration handed to the
//!   dialer
//!
//! No certificate authority is involved on either side: the server is
//! authenticated by the public key embedded in its certificate.

mod error;
mod keys;
mod tls;

pub use error::*;
pub use keys::*;
pub use tls::*;
