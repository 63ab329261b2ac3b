use thiserror::Error;

/// Result type alias for trust probing operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Errors that can occur while probing an endpoint or negotiating trust
#[derive(Error, Debug)]
pub enum ProbeError {
    /// DNS resolution, TCP connect or timeout failure
    #[error("{0}")]
    Connect(String),

    /// Transport-level TLS failure (protocol alert, handshake aborted)
    #[error("{0}")]
    TlsHandshake(String),

    /// The remote's certificate chain or hostname was rejected
    #[error("{0}")]
    TlsVerification(String),

    /// The remote offered no usable distinct root CA
    #[error("{0}")]
    ChainDiscovery(String),

    /// Malformed input, rejected before any probing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A certificate could not be decoded
    #[error("invalid certificate: {0}")]
    Certificate(String),

    /// The requested TLS client identity does not exist or is unusable
    #[error("TLS client identity not found: {0}")]
    IdentityNotFound(String),

    /// Local I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Returns true if the operator can recover by adjusting options and resubmitting.
    ///
    /// Only malformed configuration is fatal for a validation pass.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}
