//! Probe configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default connect + handshake timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration shared by all probes
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Upper bound for TCP connect plus TLS handshake
    pub connect_timeout: Duration,

    /// CA bundles or directories consulted in addition to the system locations
    pub extra_trust_paths: Vec<PathBuf>,

    /// Skip the well-known system CA locations entirely
    pub skip_system_trust: bool,

    /// Directory holding TLS client identities as `<id>.pem`
    pub identity_dir: Option<PathBuf>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeConfig {
    /// Create a new probe configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            extra_trust_paths: Vec::new(),
            skip_system_trust: false,
            identity_dir: None,
        }
    }

    /// Set the connect + handshake timeout
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Add a CA bundle file or certificate directory to the trust store
    #[must_use]
    pub fn trust_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_trust_paths.push(path.into());
        self
    }

    /// Only trust the explicitly added paths
    #[must_use]
    pub const fn skip_system_trust(mut self, skip: bool) -> Self {
        self.skip_system_trust = skip;
        self
    }

    /// Resolve client identities from `dir`
    #[must_use]
    pub fn identity_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.identity_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(60));
        assert!(config.extra_trust_paths.is_empty());
        assert!(!config.skip_system_trust);
        assert!(config.identity_dir.is_none());
    }

    #[test]
    fn builder_chain() {
        let config = ProbeConfig::new()
            .connect_timeout(Duration::from_secs(5))
            .trust_path("/opt/pki/ca.pem")
            .skip_system_trust(true)
            .identity_dir("/etc/trustprobe/identities");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.extra_trust_paths, vec![PathBuf::from("/opt/pki/ca.pem")]);
        assert!(config.skip_system_trust);
        assert_eq!(
            config.identity_dir.as_deref(),
            Some(std::path::Path::new("/etc/trustprobe/identities"))
        );
    }
}
