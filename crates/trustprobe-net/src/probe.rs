//! Connection probes and certificate chain capture.

use async_trait::async_trait;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::future::Future;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::OnceCell;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};
use trustprobe_core::{Certificate, CertificateChain, Endpoint, ProbeError, Result};

use crate::config::ProbeConfig;
use crate::identity::ClientIdentity;
use crate::tls;
use crate::trust_store;

/// Options for a verified TLS probe
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifiedTlsOptions<'a> {
    /// Skip hostname/CN matching
    pub ignore_cn: bool,
    /// Verify against this CA instead of the system trust store
    pub custom_root_ca: Option<&'a Certificate>,
    /// Present this identity for mutual TLS
    pub client_identity: Option<&'a ClientIdentity>,
}

/// The network operations the trust negotiation is built from.
///
/// Every operation opens at most one connection and closes it before returning.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Open and immediately close a plain TCP connection
    async fn probe_tcp(&self, endpoint: &Endpoint) -> Result<()>;

    /// TLS handshake with chain and hostname verification disabled
    async fn probe_insecure_tls(
        &self,
        endpoint: &Endpoint,
        client_identity: Option<&ClientIdentity>,
    ) -> Result<()>;

    /// TLS handshake with standard chain verification
    async fn probe_verified_tls(
        &self,
        endpoint: &Endpoint,
        options: VerifiedTlsOptions<'_>,
    ) -> Result<()>;

    /// Insecure TLS handshake that captures the presented certificate chain
    async fn fetch_chain(
        &self,
        endpoint: &Endpoint,
        client_identity: Option<&ClientIdentity>,
    ) -> Result<CertificateChain>;
}

/// [`Prober`] that talks to the network
#[derive(Debug, Default)]
pub struct NetworkProber {
    config: ProbeConfig,
    system_roots: OnceCell<Arc<RootCertStore>>,
}

impl NetworkProber {
    /// Create a prober with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a prober with custom configuration
    #[must_use]
    pub fn with_config(config: ProbeConfig) -> Self {
        Self {
            config,
            system_roots: OnceCell::new(),
        }
    }

    /// The active configuration
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    async fn system_roots(&self) -> Arc<RootCertStore> {
        let roots = self
            .system_roots
            .get_or_init(|| async {
                let anchors = trust_store::load_trust_anchors(
                    &self.config.extra_trust_paths,
                    self.config.skip_system_trust,
                )
                .await;
                if anchors.is_empty() {
                    warn!("no trust anchors found, verified TLS probes will fail");
                }
                Arc::new(trust_store::root_store(&anchors))
            })
            .await;
        Arc::clone(roots)
    }

    /// Run `fut` under the connect timeout
    async fn bounded<T>(
        &self,
        endpoint: &Endpoint,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.config.connect_timeout;
        tokio::time::timeout(timeout, fut).await.unwrap_or_else(|_| {
            Err(ProbeError::Connect(format!(
                "unable to connect to {}: timed out after {}s",
                endpoint.authority(),
                timeout.as_secs()
            )))
        })
    }

    async fn connect_tcp(endpoint: &Endpoint) -> Result<TcpStream> {
        TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|e| {
                ProbeError::Connect(format!("unable to connect to {}: {e}", endpoint.authority()))
            })
    }

    async fn handshake(
        endpoint: &Endpoint,
        config: ClientConfig,
    ) -> Result<TlsStream<TcpStream>> {
        let server_name = ServerName::try_from(endpoint.host.clone()).map_err(|e| {
            ProbeError::Configuration(format!("invalid TLS server name {:?}: {e}", endpoint.host))
        })?;

        let tcp = Self::connect_tcp(endpoint).await?;
        TlsConnector::from(Arc::new(config))
            .connect(server_name, tcp)
            .await
            .map_err(|e| classify_tls_error(endpoint, &e))
    }

    async fn tls_round_trip(
        &self,
        endpoint: &Endpoint,
        config: ClientConfig,
        capture_chain: bool,
    ) -> Result<Vec<Vec<u8>>> {
        self.bounded(endpoint, async {
            let mut stream = Self::handshake(endpoint, config).await?;

            let presented = if capture_chain {
                stream
                    .get_ref()
                    .1
                    .peer_certificates()
                    .map(|certs| certs.iter().map(|c| c.as_ref().to_vec()).collect())
                    .unwrap_or_default()
            } else {
                Vec::new()
            };

            close(&mut stream).await;
            Ok(presented)
        })
        .await
    }
}

#[async_trait]
impl Prober for NetworkProber {
    async fn probe_tcp(&self, endpoint: &Endpoint) -> Result<()> {
        debug!(host = %endpoint.host, port = endpoint.port, "probing TCP");
        self.bounded(endpoint, async {
            let mut stream = Self::connect_tcp(endpoint).await?;
            let _ = stream.shutdown().await;
            Ok(())
        })
        .await
    }

    async fn probe_insecure_tls(
        &self,
        endpoint: &Endpoint,
        client_identity: Option<&ClientIdentity>,
    ) -> Result<()> {
        debug!(host = %endpoint.host, port = endpoint.port, "probing insecure TLS");
        let config = tls::insecure_config(client_identity)?;
        self.tls_round_trip(endpoint, config, false).await.map(|_| ())
    }

    async fn probe_verified_tls(
        &self,
        endpoint: &Endpoint,
        options: VerifiedTlsOptions<'_>,
    ) -> Result<()> {
        debug!(
            host = %endpoint.host,
            port = endpoint.port,
            ignore_cn = options.ignore_cn,
            custom_root = options.custom_root_ca.is_some(),
            "probing verified TLS"
        );

        let roots = match options.custom_root_ca {
            Some(root) => {
                let store = trust_store::root_store([root]);
                if store.is_empty() {
                    return Err(ProbeError::TlsVerification(
                        "the accepted root CA is not usable as a trust anchor".into(),
                    ));
                }
                Arc::new(store)
            }
            None => {
                let roots = self.system_roots().await;
                if roots.is_empty() {
                    warn!(
                        host = %endpoint.host,
                        port = endpoint.port,
                        "no trust anchors configured, cannot verify remote"
                    );
                    return Err(ProbeError::TlsVerification(format!(
                        "cannot verify the TLS certificate of {}: no trust anchors are configured",
                        endpoint.authority()
                    )));
                }
                roots
            }
        };

        let config = tls::verified_config(roots, options.ignore_cn, options.client_identity)?;
        self.tls_round_trip(endpoint, config, false).await.map(|_| ())
    }

    async fn fetch_chain(
        &self,
        endpoint: &Endpoint,
        client_identity: Option<&ClientIdentity>,
    ) -> Result<CertificateChain> {
        debug!(host = %endpoint.host, port = endpoint.port, "fetching certificate chain");
        let config = tls::insecure_config(client_identity)?;
        let presented = self.tls_round_trip(endpoint, config, true).await?;
        debug!(count = presented.len(), "captured peer certificates");
        CertificateChain::from_presented(&presented)
    }
}

/// Send `close_notify` and shut the socket down; errors are irrelevant here.
async fn close(stream: &mut TlsStream<TcpStream>) {
    if let Err(e) = stream.shutdown().await {
        debug!(error = %e, "TLS shutdown failed");
    }
}

/// Split handshake failures into certificate rejections and everything else
fn classify_tls_error(endpoint: &Endpoint, err: &std::io::Error) -> ProbeError {
    let rustls_error = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>());

    match rustls_error {
        Some(rustls::Error::InvalidCertificate(_)) => ProbeError::TlsVerification(format!(
            "TLS verification of {} failed: {err}",
            endpoint.authority()
        )),
        _ => ProbeError::TlsHandshake(format!(
            "TLS handshake with {} failed: {err}",
            endpoint.authority()
        )),
    }
}
