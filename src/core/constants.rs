//! Protocol constants.
//!
//! Defaults for timing and addressing. Timing values can be overridden per
//! client through [`ClientConfig`](crate::client::ClientConfig).

use std::time::Duration;

// =============================================================================
// RECONNECTION
// =============================================================================

/// First wait after a failed dial.
pub const INITIAL_RECONNECT_WAIT: Duration = Duration::from_secs(1);

/// Wait growth stops here; every later wait is exactly this long.
pub const MAX_RECONNECT_WAIT: Duration = Duration::from_secs(60);

/// Growth factor applied to the wait after every failed dial.
pub const RECONNECT_BACKOFF_FACTOR: u32 = 2;

// =============================================================================
// DIALING
// =============================================================================

/// Upper bound on a single WebSocket/TLS opening handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(45);

/// URL scheme used to reach the target.
pub const URL_SCHEME: &str = "wss";

// =============================================================================
// KEYS
// =============================================================================

/// Ed25519 private key (seed) size.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Ed25519 public key size.
pub const PUBLIC_KEY_SIZE: usize = 32;
