//! Ed25519 key management.
//!
//! Validates raw key material before it is used to build TLS credentials.

use ed25519_dalek::{KEYPAIR_LENGTH, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use super::CredentialError;
use crate::core::{PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};

/// The client's long-term signing identity.
///
/// The secret is zeroized on drop.
#[derive(Clone)]
pub struct ClientIdentity {
    signing: SigningKey,
}

impl ClientIdentity {
    /// Create an identity from raw key bytes.
    ///
    /// Accepts either the 32-byte seed or the 64-byte `seed || public`
    /// keypair encoding; in the latter case the public half must match.
    pub fn from_bytes(private: &[u8]) -> Result<Self, CredentialError> {
        let signing = match private.len() {
            PRIVATE_KEY_SIZE => {
                let mut seed = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
                seed.copy_from_slice(private);
                SigningKey::from_bytes(&seed)
            }
            KEYPAIR_LENGTH => {
                let mut keypair = Zeroizing::new([0u8; KEYPAIR_LENGTH]);
                keypair.copy_from_slice(private);
                SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|e| CredentialError::InvalidSigningKey(e.to_string()))?
            }
            other => {
                return Err(CredentialError::InvalidSigningKey(format!(
                    "expected {PRIVATE_KEY_SIZE} or {KEYPAIR_LENGTH} bytes, got {other}"
                )));
            }
        };
        Ok(Self { signing })
    }

    /// Create an identity from hex-encoded key bytes.
    pub fn from_hex(private_hex: &str) -> Result<Self, CredentialError> {
        let bytes = Zeroizing::new(
            hex::decode(private_hex.trim()).map_err(|e| CredentialError::InvalidHex(e.to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// The public half, as presented to the server.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.signing.verifying_key().to_bytes()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing
    }
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("public_key", &key_preview(&self.public_key()))
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Server public keys the client accepts.
///
/// Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct PeerKeys {
    keys: Vec<VerifyingKey>,
}

impl PeerKeys {
    /// Accept a single server key.
    pub fn from_bytes(key: &[u8]) -> Result<Self, CredentialError> {
        Self::new([key])
    }

    /// Accept any of `keys`.
    pub fn new<I, K>(keys: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        let keys = keys
            .into_iter()
            .map(|key| parse_verifying_key(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if keys.is_empty() {
            return Err(CredentialError::NoPeerKeys);
        }
        Ok(Self { keys })
    }

    /// Accept any of the hex-encoded `keys`.
    pub fn from_hex<I, S>(keys: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw = keys
            .into_iter()
            .map(|key| {
                hex::decode(key.as_ref().trim()).map_err(|e| CredentialError::InvalidHex(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(raw)
    }

    /// Whether `key` is one of the accepted keys.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.keys.iter().any(|k| k.as_bytes().as_slice() == key)
    }

    /// Number of accepted keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over the accepted keys.
    pub fn iter(&self) -> impl Iterator<Item = &[u8; PUBLIC_KEY_SIZE]> {
        self.keys.iter().map(VerifyingKey::as_bytes)
    }
}

impl std::fmt::Debug for PeerKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|k| key_preview(k)))
            .finish()
    }
}

fn parse_verifying_key(key: &[u8]) -> Result<VerifyingKey, CredentialError> {
    let bytes: &[u8; PUBLIC_KEY_SIZE] = key.try_into().map_err(|_| {
        CredentialError::InvalidPeerKey(format!(
            "expected {PUBLIC_KEY_SIZE} bytes, got {}",
            key.len()
        ))
    })?;

    let key = VerifyingKey::from_bytes(bytes)
        .map_err(|e| CredentialError::InvalidPeerKey(e.to_string()))?;
    if key.is_weak() {
        return Err(CredentialError::InvalidPeerKey("small-order point".into()));
    }
    Ok(key)
}

fn key_preview(bytes: &[u8]) -> String {
    format!("{}...", hex::encode(&bytes[..bytes.len().min(4)]))
}
