//! Pinned-key TLS client configuration.

use std::sync::Arc;

use ed25519_dalek::pkcs8::EncodePrivateKey;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer, ServerName, UnixTime};
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, SignatureScheme};
use x509_parser::prelude::{FromDer, X509Certificate};

use super::{ClientIdentity, CredentialError, PeerKeys};

/// Build the TLS configuration used to dial the server.
///
/// The client presents a self-signed certificate for `identity` and accepts
/// a server only if its certificate carries one of `peers`.
pub fn client_tls_config(
    identity: &ClientIdentity,
    peers: &PeerKeys,
) -> Result<Arc<ClientConfig>, CredentialError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = PinnedKeyVerifier::new(peers.clone(), &provider);
    let (cert, key) = self_signed_certificate(identity)?;

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_client_auth_cert(vec![cert], key)?;

    Ok(Arc::new(config))
}

/// Self-signed certificate and PKCS#8 key for `identity`.
///
/// The certificate carries no meaningful names; peers authenticate it by its
/// public key alone.
pub fn self_signed_certificate(
    identity: &ClientIdentity,
) -> Result<(CertificateDer<'static>, PrivateKeyDer<'static>), CredentialError> {
    let pkcs8 = identity
        .signing_key()
        .to_pkcs8_der()
        .map_err(|e| CredentialError::Pkcs8(e.to_string()))?;

    let key_pair = rcgen::KeyPair::try_from(pkcs8.as_bytes())?;
    let cert = rcgen::CertificateParams::new(Vec::<String>::new())?.self_signed(&key_pair)?;
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(pkcs8.as_bytes().to_vec()));

    Ok((cert.der().clone(), key))
}

/// Accepts a server certificate iff its Ed25519 key is pinned.
///
/// Chain, validity period and server name are not consulted. Handshake
/// signatures are still verified against the certificate key.
#[derive(Debug)]
pub struct PinnedKeyVerifier {
    peers: PeerKeys,
    algorithms: WebPkiSupportedAlgorithms,
}

impl PinnedKeyVerifier {
    /// Pin `peers`, verifying signatures with `provider`'s algorithms.
    pub fn new(peers: PeerKeys, provider: &CryptoProvider) -> Self {
        Self {
            peers,
            algorithms: provider.signature_verification_algorithms,
        }
    }
}

impl ServerCertVerifier for PinnedKeyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let (_, cert) = X509Certificate::from_der(end_entity.as_ref())
            .map_err(|_| rustls::Error::InvalidCertificate(CertificateError::BadEncoding))?;
        let key: &[u8] = &cert.public_key().subject_public_key.data;

        if self.peers.contains(key) {
            Ok(ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
