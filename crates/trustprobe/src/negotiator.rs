//! The trust decision state machine.
//!
//! Re-run against the full submitted field set on every validation attempt.
//! The only memory between attempts is what the caller hands back: the
//! checked options and the cached root CA PEM.

use std::sync::Arc;
use tracing::{debug, info};
use trustprobe_core::{
    Certificate, DisplayOptions, Endpoint, Evaluation, OptionalField, ProbeError, Result,
    SubmittedFields, Verdict,
};
use trustprobe_net::{
    ClientIdentity, ClientIdentityResolver, DirectoryIdentityStore, NetworkProber, NoIdentities,
    ProbeConfig, Prober, VerifiedTlsOptions,
};

const NO_NON_SELF_SIGNED: &str = "The remote didn't provide any non-self-signed TLS certificate";
const NO_ROOT_CA: &str = "The remote didn't provide any root CA certificate";

/// Drives probes through the accept / reject / ask-again sequence.
pub struct TrustNegotiator<P = NetworkProber> {
    prober: Arc<P>,
    identities: Arc<dyn ClientIdentityResolver>,
}

impl TrustNegotiator<NetworkProber> {
    /// Negotiator probing the real network with default settings
    #[must_use]
    pub fn network() -> Self {
        Self::new(NetworkProber::new())
    }

    /// Negotiator probing the real network with `config`.
    ///
    /// Client identities are read from `config.identity_dir` when set.
    #[must_use]
    pub fn with_config(config: ProbeConfig) -> Self {
        let identity_dir = config.identity_dir.clone();
        let negotiator = Self::new(NetworkProber::with_config(config));
        match identity_dir {
            Some(dir) => negotiator.identities(DirectoryIdentityStore::new(dir)),
            None => negotiator,
        }
    }
}

impl<P: Prober> TrustNegotiator<P> {
    /// Create a negotiator around `prober`, without client identities
    pub fn new(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            identities: Arc::new(NoIdentities),
        }
    }

    /// Resolve `tls_client_identity` references through `resolver`
    #[must_use]
    pub fn identities(mut self, resolver: impl ClientIdentityResolver + 'static) -> Self {
        self.identities = Arc::new(resolver);
        self
    }

    /// The underlying prober
    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Run one validation pass.
    ///
    /// Network and verification failures become a rejection carrying the
    /// error text. Only a malformed base URL is returned as `Err`, before any
    /// probe runs.
    pub async fn evaluate(&self, fields: &SubmittedFields) -> Result<Evaluation> {
        let endpoint = fields
            .baseurl
            .as_deref()
            .map(Endpoint::resolve)
            .transpose()?;

        let mut pass = Pass::new(fields);

        let cached_root = match fields.tls_server_rootca_cert.as_deref() {
            Some(text) => match Certificate::from_pem(text) {
                Ok(cert) => Some(cert),
                Err(e) => {
                    pass.forget_root();
                    return Ok(pass.reject_with(format!(
                        "The cached root CA is not a valid TLS certificate: {e}"
                    )));
                }
            },
            None => None,
        };

        let Some(endpoint) = endpoint else {
            debug!("no base URL configured, nothing to validate");
            return Ok(pass.accept());
        };

        if fields.force_creation {
            info!(%endpoint, "connectivity validation skipped on operator request");
            return Ok(pass.accept());
        }

        if endpoint.scheme.is_tls() {
            Ok(self.evaluate_tls(fields, &endpoint, cached_root, pass).await)
        } else {
            Ok(self.evaluate_plain(&endpoint, pass).await)
        }
    }

    async fn evaluate_plain(&self, endpoint: &Endpoint, mut pass: Pass) -> Evaluation {
        match self.prober.probe_tcp(endpoint).await {
            Ok(()) => {
                info!(%endpoint, "TCP probe succeeded");
                pass.display = DisplayOptions::none();
                pass.accept()
            }
            Err(e) => {
                info!(%endpoint, error = %e, "TCP probe failed");
                pass.display = only_force_creation();
                pass.reject(&e)
            }
        }
    }

    async fn evaluate_tls(
        &self,
        fields: &SubmittedFields,
        endpoint: &Endpoint,
        cached_root: Option<Certificate>,
        mut pass: Pass,
    ) -> Evaluation {
        let identity = match fields.tls_client_identity.as_deref() {
            Some(id) => match self.identities.resolve(id).await {
                Ok(identity) => Some(identity),
                Err(e) => return pass.reject(&e),
            },
            None => None,
        };

        if let Err(e) = self
            .prober
            .probe_insecure_tls(endpoint, identity.as_ref())
            .await
        {
            info!(%endpoint, error = %e, "remote is not reachable via TLS");
            pass.display = only_force_creation();
            return pass.reject(&e);
        }

        if fields.tls_server_insecure {
            info!(%endpoint, "TLS trust checks waived on operator request");
            return pass.accept();
        }

        if fields.tls_server_discover_rootca {
            return self.discover_root(endpoint, identity.as_ref(), pass).await;
        }

        if let Some(root) = &cached_root {
            pass.show_root(root.clone());
        }

        let options = VerifiedTlsOptions {
            ignore_cn: fields.tls_server_ignore_cn,
            custom_root_ca: cached_root
                .as_ref()
                .filter(|_| fields.tls_server_accept_rootca),
            client_identity: identity.as_ref(),
        };

        match self.prober.probe_verified_tls(endpoint, options).await {
            Ok(()) => {
                info!(%endpoint, "verified TLS probe succeeded");
                pass.display.remove(OptionalField::ForceCreation);
                pass.display.remove(OptionalField::TlsServerInsecure);
                pass.accept()
            }
            Err(e) => {
                info!(%endpoint, error = %e, "verified TLS probe failed");
                let mut allowed = vec![
                    OptionalField::ForceCreation,
                    OptionalField::TlsServerInsecure,
                    OptionalField::TlsServerIgnoreCn,
                    OptionalField::TlsServerDiscoverRootca,
                ];
                if cached_root.is_some() {
                    allowed.push(OptionalField::TlsServerAcceptRootca);
                }
                pass.display.restrict_to(&allowed);
                pass.reject(&e)
            }
        }
    }

    /// Capture the chain and offer its root CA for confirmation. Never accepts.
    async fn discover_root(
        &self,
        endpoint: &Endpoint,
        identity: Option<&ClientIdentity>,
        mut pass: Pass,
    ) -> Evaluation {
        pass.forget_root();

        let chain = match self.prober.fetch_chain(endpoint, identity).await {
            Ok(chain) => chain,
            Err(e) => return pass.reject(&e),
        };

        if chain.has_self_signed_leaf() {
            return pass.reject(&ProbeError::ChainDiscovery(NO_NON_SELF_SIGNED.into()));
        }

        let root = match chain.root {
            Some(root) if root.subject_cn() != chain.leaf.subject_cn() => root,
            _ => return pass.reject(&ProbeError::ChainDiscovery(NO_ROOT_CA.into())),
        };

        info!(
            %endpoint,
            subject = ?root.subject_cn(),
            sha256 = %root.sha256_fingerprint(),
            "discovered root CA, awaiting operator confirmation"
        );

        pass.display.restrict_to(&OptionalField::ERROR_HANDLING);
        pass.rootca_cert = Some(root.to_pem());
        pass.show_root(root);
        pass.finish(Verdict::Reject)
    }
}

impl<P> std::fmt::Debug for TrustNegotiator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustNegotiator").finish_non_exhaustive()
    }
}

fn only_force_creation() -> DisplayOptions {
    [OptionalField::ForceCreation].into_iter().collect()
}

/// Accumulates the outcome of one validation pass
struct Pass {
    display: DisplayOptions,
    errors: Vec<String>,
    root_ca: Option<Certificate>,
    rootca_cert: Option<String>,
}

impl Pass {
    fn new(fields: &SubmittedFields) -> Self {
        Self {
            display: DisplayOptions::from_submission(fields),
            errors: Vec::new(),
            root_ca: None,
            rootca_cert: fields.tls_server_rootca_cert.clone(),
        }
    }

    fn show_root(&mut self, root: Certificate) {
        self.display.insert(OptionalField::TlsServerRootcaInfo);
        self.root_ca = Some(root);
    }

    fn forget_root(&mut self) {
        self.display.remove(OptionalField::TlsServerRootcaInfo);
        self.display.remove(OptionalField::TlsServerAcceptRootca);
        self.root_ca = None;
        self.rootca_cert = None;
    }

    fn accept(self) -> Evaluation {
        self.finish(Verdict::Accept)
    }

    fn reject(self, error: &ProbeError) -> Evaluation {
        self.reject_with(error.to_string())
    }

    fn reject_with(mut self, message: String) -> Evaluation {
        self.errors.push(message);
        self.finish(Verdict::Reject)
    }

    fn finish(self, verdict: Verdict) -> Evaluation {
        Evaluation {
            verdict,
            display: self.display,
            errors: self.errors,
            root_ca: self.root_ca,
            rootca_cert: self.rootca_cert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};
    use std::sync::Mutex;
    use trustprobe_core::CertificateChain;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Tcp,
        Insecure,
        Verified { ignore_cn: bool, custom_root: Option<String> },
        Fetch,
    }

    /// Prober with canned outcomes; `Some(message)` means the probe fails
    #[derive(Default)]
    struct ScriptedProber {
        tcp: Option<&'static str>,
        insecure: Option<&'static str>,
        verified: Option<&'static str>,
        chain: Option<Vec<Vec<u8>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedProber {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe_tcp(&self, _endpoint: &Endpoint) -> Result<()> {
            self.record(Call::Tcp);
            self.tcp.map_or(Ok(()), |e| Err(ProbeError::Connect(e.into())))
        }

        async fn probe_insecure_tls(
            &self,
            _endpoint: &Endpoint,
            _client_identity: Option<&ClientIdentity>,
        ) -> Result<()> {
            self.record(Call::Insecure);
            self.insecure
                .map_or(Ok(()), |e| Err(ProbeError::Connect(e.into())))
        }

        async fn probe_verified_tls(
            &self,
            _endpoint: &Endpoint,
            options: VerifiedTlsOptions<'_>,
        ) -> Result<()> {
            self.record(Call::Verified {
                ignore_cn: options.ignore_cn,
                custom_root: options.custom_root_ca.map(Certificate::fingerprint_hex),
            });
            self.verified
                .map_or(Ok(()), |e| Err(ProbeError::TlsVerification(e.into())))
        }

        async fn fetch_chain(
            &self,
            _endpoint: &Endpoint,
            _client_identity: Option<&ClientIdentity>,
        ) -> Result<CertificateChain> {
            self.record(Call::Fetch);
            match &self.chain {
                Some(presented) => CertificateChain::from_presented(presented),
                None => Err(ProbeError::TlsHandshake("handshake aborted".into())),
            }
        }
    }

    struct Pki {
        root_der: Vec<u8>,
        root_pem: String,
        leaf_der: Vec<u8>,
        intermediate_der: Vec<u8>,
        self_signed_der: Vec<u8>,
    }

    fn params(cn: &str, ca: bool) -> CertificateParams {
        let mut params = CertificateParams::new(vec!["monitoring.example".to_string()]).unwrap();
        params.distinguished_name = rcgen::DistinguishedName::new();
        params.distinguished_name.push(DnType::CommonName, cn);
        if ca {
            params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        }
        params
    }

    fn pki() -> Pki {
        let root_key = KeyPair::generate().unwrap();
        let root = params("Example Root CA", true).self_signed(&root_key).unwrap();

        let inter_key = KeyPair::generate().unwrap();
        let inter = params("Example Issuing CA", true)
            .signed_by(&inter_key, &root, &root_key)
            .unwrap();

        let leaf_key = KeyPair::generate().unwrap();
        let leaf = params("monitoring.example", false)
            .signed_by(&leaf_key, &root, &root_key)
            .unwrap();

        let own_key = KeyPair::generate().unwrap();
        let self_signed = params("monitoring.example", false)
            .self_signed(&own_key)
            .unwrap();

        Pki {
            root_der: root.der().to_vec(),
            root_pem: root.pem(),
            leaf_der: leaf.der().to_vec(),
            intermediate_der: inter.der().to_vec(),
            self_signed_der: self_signed.der().to_vec(),
        }
    }

    fn root_fingerprint(pki: &Pki) -> String {
        Certificate::from_der(&pki.root_der).unwrap().fingerprint_hex()
    }

    fn https() -> SubmittedFields {
        SubmittedFields::for_url("https://monitoring.example:8443")
    }

    fn shown(evaluation: &Evaluation) -> Vec<OptionalField> {
        evaluation.display.iter().collect()
    }

    #[tokio::test]
    async fn accepts_without_base_url() {
        let negotiator = TrustNegotiator::new(ScriptedProber::default());
        let evaluation = negotiator
            .evaluate(&SubmittedFields::default())
            .await
            .unwrap();
        assert!(evaluation.is_accepted());
        assert!(evaluation.errors.is_empty());
        assert!(negotiator.prober().calls().is_empty());
    }

    #[tokio::test]
    async fn force_creation_skips_probes() {
        let negotiator = TrustNegotiator::new(ScriptedProber {
            tcp: Some("refused"),
            insecure: Some("refused"),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            force_creation: true,
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert!(evaluation.is_accepted());
        assert!(evaluation.display.contains(OptionalField::ForceCreation));
        assert!(negotiator.prober().calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_url_fails_before_probing() {
        let negotiator = TrustNegotiator::new(ScriptedProber::default());
        let fields = SubmittedFields {
            force_creation: true,
            ..SubmittedFields::for_url("ftp://monitoring.example")
        };
        let err = negotiator.evaluate(&fields).await.unwrap_err();
        assert!(matches!(err, ProbeError::Configuration(_)));
        assert!(negotiator.prober().calls().is_empty());
    }

    #[tokio::test]
    async fn http_reachable_accepts_with_no_options() {
        let negotiator = TrustNegotiator::new(ScriptedProber::default());
        let fields = SubmittedFields {
            tls_server_insecure: true,
            tls_server_ignore_cn: true,
            ..SubmittedFields::for_url("http://internal-host:5665")
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Accept);
        assert!(evaluation.display.is_empty());
        assert_eq!(negotiator.prober().calls(), vec![Call::Tcp]);
    }

    #[tokio::test]
    async fn http_unreachable_offers_force_only() {
        let negotiator = TrustNegotiator::new(ScriptedProber {
            tcp: Some("unable to connect to internal-host:5665: Connection refused"),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_ignore_cn: true,
            ..SubmittedFields::for_url("http://internal-host:5665")
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert_eq!(shown(&evaluation), vec![OptionalField::ForceCreation]);
        assert_eq!(evaluation.errors.len(), 1);
        assert!(evaluation.errors[0].contains("Connection refused"));
    }

    #[tokio::test]
    async fn https_unreachable_offers_force_only() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber {
            insecure: Some("unable to connect to monitoring.example:8443: Connection refused"),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_ignore_cn: true,
            tls_server_accept_rootca: true,
            tls_server_rootca_cert: Some(pki.root_pem.clone()),
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert_eq!(shown(&evaluation), vec![OptionalField::ForceCreation]);
        assert!(evaluation.errors[0].contains("Connection refused"));
        assert!(evaluation.root_ca.is_none());
        assert_eq!(evaluation.rootca_cert, Some(pki.root_pem));
        assert_eq!(negotiator.prober().calls(), vec![Call::Insecure]);
    }

    #[tokio::test]
    async fn insecure_option_accepts_after_reachability() {
        let negotiator = TrustNegotiator::new(ScriptedProber {
            verified: Some("unknown issuer"),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_insecure: true,
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert!(evaluation.is_accepted());
        assert_eq!(negotiator.prober().calls(), vec![Call::Insecure]);
    }

    #[tokio::test]
    async fn verified_failure_offers_error_handling_options() {
        let negotiator = TrustNegotiator::new(ScriptedProber {
            verified: Some("invalid peer certificate: UnknownIssuer"),
            ..ScriptedProber::default()
        });
        let evaluation = negotiator.evaluate(&https()).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert_eq!(
            shown(&evaluation),
            vec![
                OptionalField::ForceCreation,
                OptionalField::TlsServerInsecure,
                OptionalField::TlsServerIgnoreCn,
                OptionalField::TlsServerDiscoverRootca,
            ]
        );
        assert_eq!(
            evaluation.errors,
            vec!["invalid peer certificate: UnknownIssuer".to_string()]
        );
        assert_eq!(
            negotiator.prober().calls(),
            vec![
                Call::Insecure,
                Call::Verified {
                    ignore_cn: false,
                    custom_root: None
                }
            ]
        );
    }

    #[tokio::test]
    async fn verified_failure_with_cached_root_offers_accept() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber {
            verified: Some("certificate not valid for name"),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_rootca_cert: Some(pki.root_pem.clone()),
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert_eq!(shown(&evaluation), OptionalField::ALL.to_vec());
        assert_eq!(
            evaluation.root_ca.as_ref().map(Certificate::fingerprint_hex),
            Some(root_fingerprint(&pki))
        );
    }

    #[tokio::test]
    async fn cached_root_is_only_trusted_when_accepted() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber::default());
        let cached = SubmittedFields {
            tls_server_ignore_cn: true,
            tls_server_rootca_cert: Some(pki.root_pem.clone()),
            ..https()
        };
        negotiator.evaluate(&cached).await.unwrap();

        let accepted = SubmittedFields {
            tls_server_accept_rootca: true,
            ..cached
        };
        negotiator.evaluate(&accepted).await.unwrap();

        let verified: Vec<_> = negotiator
            .prober()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Verified { .. }))
            .collect();
        assert_eq!(
            verified,
            vec![
                Call::Verified {
                    ignore_cn: true,
                    custom_root: None
                },
                Call::Verified {
                    ignore_cn: true,
                    custom_root: Some(root_fingerprint(&pki))
                },
            ]
        );
    }

    #[tokio::test]
    async fn verified_success_drops_force_and_insecure() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber::default());
        let fields = SubmittedFields {
            tls_server_ignore_cn: true,
            tls_server_accept_rootca: true,
            tls_server_rootca_cert: Some(pki.root_pem.clone()),
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert!(evaluation.is_accepted());
        assert!(!evaluation.display.contains(OptionalField::ForceCreation));
        assert!(!evaluation.display.contains(OptionalField::TlsServerInsecure));
        assert!(evaluation.display.contains(OptionalField::TlsServerIgnoreCn));
        assert!(evaluation.display.contains(OptionalField::TlsServerRootcaInfo));
        assert_eq!(evaluation.rootca_cert, Some(pki.root_pem));
    }

    #[tokio::test]
    async fn discovery_previews_root_and_rejects() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber {
            chain: Some(vec![pki.leaf_der.clone(), pki.root_der.clone()]),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_discover_rootca: true,
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();

        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert!(evaluation.errors.is_empty());
        assert_eq!(shown(&evaluation), OptionalField::ALL.to_vec());
        let root = evaluation.root_ca.as_ref().unwrap();
        assert_eq!(root.subject_cn(), Some("Example Root CA"));
        let cached = Certificate::from_pem(evaluation.rootca_cert.as_deref().unwrap()).unwrap();
        assert_eq!(cached.fingerprint_hex(), root_fingerprint(&pki));
        assert_eq!(negotiator.prober().calls(), vec![Call::Insecure, Call::Fetch]);
    }

    #[tokio::test]
    async fn discovery_is_repeatable() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber {
            chain: Some(vec![pki.leaf_der.clone(), pki.root_der.clone()]),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_discover_rootca: true,
            ..https()
        };
        let first = negotiator.evaluate(&fields).await.unwrap();
        let second = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn discovery_rejects_self_signed_leaf() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber {
            chain: Some(vec![pki.self_signed_der.clone()]),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_discover_rootca: true,
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert_eq!(evaluation.errors, vec![NO_NON_SELF_SIGNED.to_string()]);
        assert!(evaluation.root_ca.is_none());
        assert!(evaluation.rootca_cert.is_none());
    }

    #[tokio::test]
    async fn discovery_needs_self_issued_last_certificate() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber {
            chain: Some(vec![pki.leaf_der.clone(), pki.intermediate_der.clone()]),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_discover_rootca: true,
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.errors, vec![NO_ROOT_CA.to_string()]);
        assert!(evaluation.root_ca.is_none());
        assert!(!evaluation.display.contains(OptionalField::TlsServerRootcaInfo));
    }

    #[tokio::test]
    async fn discovery_discards_stale_root_on_failure() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber::default());
        let fields = SubmittedFields {
            tls_server_discover_rootca: true,
            tls_server_accept_rootca: true,
            tls_server_rootca_cert: Some(pki.root_pem),
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert_eq!(evaluation.errors, vec!["handshake aborted".to_string()]);
        assert!(evaluation.rootca_cert.is_none());
        assert!(!evaluation.display.contains(OptionalField::TlsServerAcceptRootca));
        assert!(!evaluation.display.contains(OptionalField::TlsServerRootcaInfo));
        assert!(!negotiator
            .prober()
            .calls()
            .iter()
            .any(|call| matches!(call, Call::Verified { .. })));
    }

    #[tokio::test]
    async fn invalid_cached_root_is_rejected() {
        let negotiator = TrustNegotiator::new(ScriptedProber::default());
        let fields = SubmittedFields {
            tls_server_accept_rootca: true,
            tls_server_rootca_cert: Some("not a certificate".into()),
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert!(evaluation.errors[0].contains("not a valid TLS certificate"));
        assert!(evaluation.rootca_cert.is_none());
        assert!(negotiator.prober().calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_client_identity_is_rejected() {
        let negotiator = TrustNegotiator::new(ScriptedProber::default());
        let fields = SubmittedFields {
            tls_client_identity: Some("monitoring-client".into()),
            ..https()
        };
        let evaluation = negotiator.evaluate(&fields).await.unwrap();
        assert_eq!(evaluation.verdict, Verdict::Reject);
        assert!(evaluation.errors[0].contains("monitoring-client"));
        assert!(negotiator.prober().calls().is_empty());
    }

    #[tokio::test]
    async fn discover_then_accept() {
        let pki = pki();
        let negotiator = TrustNegotiator::new(ScriptedProber {
            chain: Some(vec![pki.leaf_der.clone(), pki.root_der.clone()]),
            ..ScriptedProber::default()
        });
        let fields = SubmittedFields {
            tls_server_discover_rootca: true,
            ..https()
        };
        let preview = negotiator.evaluate(&fields).await.unwrap();

        let mut next = fields.resubmit(&preview);
        next.tls_server_accept_rootca = true;
        let evaluation = negotiator.evaluate(&next).await.unwrap();

        assert!(evaluation.is_accepted());
        assert_eq!(
            negotiator.prober().calls().last(),
            Some(&Call::Verified {
                ignore_cn: false,
                custom_root: Some(root_fingerprint(&pki))
            })
        );
        assert_eq!(
            shown(&evaluation),
            vec![
                OptionalField::TlsServerDiscoverRootca,
                OptionalField::TlsServerRootcaInfo,
                OptionalField::TlsServerAcceptRootca,
            ]
        );
    }
}
