use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::{ProbeError, Result};

/// URL scheme of a monitored resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP, probed with a TCP connect
    Http,
    /// HTTP over TLS, probed with the TLS trust negotiation
    Https,
}

impl Scheme {
    /// Port used when the base URL does not name one
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    /// Returns true for TLS-wrapped schemes
    #[must_use]
    pub const fn is_tls(self) -> bool {
        matches!(self, Self::Https)
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// A remote endpoint resolved from an operator-supplied base URL.
///
/// Immutable for the duration of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP literal (IPv6 without brackets)
    pub host: String,
    /// TCP port
    pub port: u16,
    /// URL scheme
    pub scheme: Scheme,
}

impl Endpoint {
    /// Create an endpoint from its parts
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, scheme: Scheme) -> Self {
        Self {
            host: host.into(),
            port,
            scheme,
        }
    }

    /// Resolve a base URL of the form `http[s]://<HOST>[:<PORT>][/<BASE_LOCATION>]`.
    ///
    /// Pure: no DNS lookup or other network access happens here.
    pub fn resolve(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url.trim())
            .map_err(|e| ProbeError::Configuration(format!("invalid base URL {base_url:?}: {e}")))?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(ProbeError::Configuration(format!(
                    "unsupported URL scheme {other:?}, expected http or https"
                )))
            }
        };

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => {
                return Err(ProbeError::Configuration(format!(
                    "base URL {base_url:?} has no host"
                )))
            }
        };

        let port = url
            .port_or_known_default()
            .unwrap_or_else(|| scheme.default_port());

        Ok(Self { host, port, scheme })
    }

    /// `host:port` suitable for display and socket address resolution
    #[must_use]
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority())
    }
}
