//! Submitted form values and the outcome of one validation pass.

use serde::{Deserialize, Serialize};

use super::{Certificate, DisplayOptions, OptionalField};

/// The field set an operator submitted for an HTTP(S) resource.
///
/// `tls_server_rootca_cert` carries a previously discovered root CA between
/// submissions as opaque PEM text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmittedFields {
    /// `http[s]://<HOST>[:<PORT>][/<BASE_LOCATION>]`
    pub baseurl: Option<String>,
    /// Enforce changes without connectivity validation
    pub force_creation: bool,
    /// Skip TLS chain validation entirely
    pub tls_server_insecure: bool,
    /// Skip hostname/CN matching
    pub tls_server_ignore_cn: bool,
    /// The discover action was triggered with this submission
    pub tls_server_discover_rootca: bool,
    /// Trust the cached root CA
    pub tls_server_accept_rootca: bool,
    /// Cached root CA, PEM
    pub tls_server_rootca_cert: Option<String>,
    /// Reference to a TLS client identity for mutual TLS
    pub tls_client_identity: Option<String>,
}

impl SubmittedFields {
    /// Fields for a base URL with nothing else set
    #[must_use]
    pub fn for_url(baseurl: impl Into<String>) -> Self {
        Self {
            baseurl: Some(baseurl.into()),
            ..Self::default()
        }
    }

    /// Whether an optional checkbox or action is set
    #[must_use]
    pub const fn is_checked(&self, field: OptionalField) -> bool {
        match field {
            OptionalField::ForceCreation => self.force_creation,
            OptionalField::TlsServerInsecure => self.tls_server_insecure,
            OptionalField::TlsServerIgnoreCn => self.tls_server_ignore_cn,
            OptionalField::TlsServerDiscoverRootca => self.tls_server_discover_rootca,
            OptionalField::TlsServerAcceptRootca => self.tls_server_accept_rootca,
            OptionalField::TlsServerRootcaInfo => false,
        }
    }

    /// Set an optional checkbox or action; the info block is ignored
    pub fn set_checked(&mut self, field: OptionalField, checked: bool) {
        match field {
            OptionalField::ForceCreation => self.force_creation = checked,
            OptionalField::TlsServerInsecure => self.tls_server_insecure = checked,
            OptionalField::TlsServerIgnoreCn => self.tls_server_ignore_cn = checked,
            OptionalField::TlsServerDiscoverRootca => self.tls_server_discover_rootca = checked,
            OptionalField::TlsServerAcceptRootca => self.tls_server_accept_rootca = checked,
            OptionalField::TlsServerRootcaInfo => {}
        }
    }

    /// Defaults applied when the form is first rendered: a cached root CA
    /// starts out accepted, since the operator saw it when it was discovered.
    #[must_use]
    pub fn with_render_defaults(mut self) -> Self {
        if self.tls_server_rootca_cert.is_some() {
            self.tls_server_accept_rootca = true;
        }
        self
    }

    /// Carry the outcome of `evaluation` into the next submission.
    ///
    /// Options no longer displayed are cleared, the discover action is reset
    /// and the root CA cache is replaced with whatever the pass produced.
    #[must_use]
    pub fn resubmit(&self, evaluation: &Evaluation) -> Self {
        let mut next = self.clone();
        for field in OptionalField::ERROR_HANDLING {
            if !evaluation.display.contains(field) {
                next.set_checked(field, false);
            }
        }
        next.tls_server_discover_rootca = false;
        next.tls_server_rootca_cert.clone_from(&evaluation.rootca_cert);
        next
    }
}

/// Final decision for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The resource may be saved
    Accept,
    /// The operator has to adjust something and resubmit
    Reject,
}

impl Verdict {
    /// Returns true for [`Verdict::Accept`]
    #[must_use]
    pub const fn is_accept(self) -> bool {
        matches!(self, Self::Accept)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "ACCEPT"),
            Self::Reject => write!(f, "REJECT"),
        }
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Accept or reject
    pub verdict: Verdict,
    /// Optional fields to display next
    pub display: DisplayOptions,
    /// Messages attached to the submission
    pub errors: Vec<String>,
    /// Root CA whose details should be shown
    pub root_ca: Option<Certificate>,
    /// Root CA cache to hand back with the next submission (PEM)
    pub rootca_cert: Option<String>,
}

impl Evaluation {
    /// Returns true if the submission was accepted
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.verdict.is_accept()
    }
}
