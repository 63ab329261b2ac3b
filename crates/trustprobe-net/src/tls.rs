//! rustls client configurations for the three TLS probe flavours.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{
    verify_tls12_signature, verify_tls13_signature, CryptoProvider, WebPkiSupportedAlgorithms,
};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use trustprobe_core::{ProbeError, Result};

use crate::identity::ClientIdentity;

/// The crypto provider every probe uses
pub(crate) fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Client config that accepts any server certificate and any name.
///
/// Handshake signatures are still checked against the presented leaf so a
/// successful probe proves the peer holds the matching key.
pub(crate) fn insecure_config(identity: Option<&ClientIdentity>) -> Result<ClientConfig> {
    let provider = provider();
    let verifier = Arc::new(danger::AcceptAnyServerCert::new(&provider));
    finish(provider, verifier, identity)
}

/// Client config that performs standard WebPKI verification against `roots`
pub(crate) fn verified_config(
    roots: Arc<RootCertStore>,
    ignore_cn: bool,
    identity: Option<&ClientIdentity>,
) -> Result<ClientConfig> {
    let provider = provider();
    let webpki = WebPkiServerVerifier::builder_with_provider(roots, Arc::clone(&provider))
        .build()
        .map_err(|e| {
            ProbeError::TlsVerification(format!("cannot build certificate verifier: {e}"))
        })?;

    let verifier: Arc<dyn ServerCertVerifier> = if ignore_cn {
        Arc::new(HostnameIgnoringVerifier::new(webpki))
    } else {
        webpki
    };

    finish(provider, verifier, identity)
}

fn finish(
    provider: Arc<CryptoProvider>,
    verifier: Arc<dyn ServerCertVerifier>,
    identity: Option<&ClientIdentity>,
) -> Result<ClientConfig> {
    let builder = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ProbeError::TlsHandshake(e.to_string()))?
        .dangerous()
        .with_custom_certificate_verifier(verifier);

    let mut config = match identity {
        Some(identity) => builder
            .with_client_auth_cert(identity.cert_chain().to_vec(), identity.private_key())
            .map_err(|e| {
                ProbeError::IdentityNotFound(format!("{}: unusable key pair: {e}", identity.id()))
            })?,
        None => builder.with_no_client_auth(),
    };

    // Every probe is a one-off connection.
    config.resumption = rustls::client::Resumption::disabled();

    Ok(config)
}

/// Verifies the chain but tolerates a certificate not valid for the requested name.
///
/// WebPKI checks the name only after the chain has been verified against a
/// trust anchor, so a name error means everything else passed.
#[derive(Debug)]
pub(crate) struct HostnameIgnoringVerifier {
    inner: Arc<WebPkiServerVerifier>,
}

impl HostnameIgnoringVerifier {
    pub(crate) const fn new(inner: Arc<WebPkiServerVerifier>) -> Self {
        Self { inner }
    }
}

impl ServerCertVerifier for HostnameIgnoringVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        match self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Err(rustls::Error::InvalidCertificate(
                rustls::CertificateError::NotValidForName
                | rustls::CertificateError::NotValidForNameContext { .. },
            )) => Ok(ServerCertVerified::assertion()),
            other => other,
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

pub(crate) mod danger {
    use super::{
        verify_tls12_signature, verify_tls13_signature, CertificateDer, CryptoProvider,
        DigitallySignedStruct, HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
        ServerName, SignatureScheme, UnixTime, WebPkiSupportedAlgorithms,
    };

    /// Accepts every server certificate. Only for reachability probes and
    /// chain capture, never for trust decisions.
    #[derive(Debug)]
    pub struct AcceptAnyServerCert {
        algorithms: WebPkiSupportedAlgorithms,
    }

    impl AcceptAnyServerCert {
        pub fn new(provider: &CryptoProvider) -> Self {
            Self {
                algorithms: provider.signature_verification_algorithms,
            }
        }
    }

    impl ServerCertVerifier for AcceptAnyServerCert {
        fn verify_server_cert(
            &self,
            _: &CertificateDer<'_>,
            _: &[CertificateDer<'_>],
            _: &ServerName<'_>,
            _: &[u8],
            _: UnixTime,
        ) -> Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            verify_tls12_signature(message, cert, dss, &self.algorithms)
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            verify_tls13_signature(message, cert, dss, &self.algorithms)
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.algorithms.supported_schemes()
        }
    }
}
