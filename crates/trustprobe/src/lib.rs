//! TLS trust negotiation for registering monitored HTTP(S) endpoints.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use trustprobe::{SubmittedFields, TrustNegotiator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> trustprobe::Result<()> {
//!     let negotiator = TrustNegotiator::network();
//!
//!     let mut fields = SubmittedFields::for_url("https://monitoring.example:5665");
//!     let evaluation = negotiator.evaluate(&fields).await?;
//!     println!("{}: {:?}", evaluation.verdict, evaluation.errors);
//!
//!     // Unknown issuer? Ask for the root CA, then accept it.
//!     fields.tls_server_discover_rootca = true;
//!     let preview = negotiator.evaluate(&fields).await?;
//!     let mut next = fields.resubmit(&preview);
//!     next.tls_server_accept_rootca = true;
//!     let evaluation = negotiator.evaluate(&next).await?;
//!     assert!(evaluation.is_accepted());
//!     Ok(())
//! }
//! ```
//!
//! # Decision sequence
//!
//! ```text
//! force_creation / no base URL ............................ ACCEPT
//! http:  TCP probe ........ ok: ACCEPT    fail: REJECT [force_creation]
//! https: insecure TLS probe .............. fail: REJECT [force_creation]
//!        tls_server_insecure .................................. ACCEPT
//!        discover root CA -> preview root, all options ........ REJECT
//!        verified TLS probe (ignore CN?, accepted root?)
//!            ok: ACCEPT    fail: REJECT [force .. discover (+ accept)]
//! ```

#![doc(html_root_url = "https://docs.rs/trustprobe/0.1.0")]

mod negotiator;

pub use negotiator::TrustNegotiator;

// Re-export core types
pub use trustprobe_core::*;

// Re-export probes
pub use trustprobe_net as net;
pub use trustprobe_net::{
    ClientIdentity, ClientIdentityResolver, DirectoryIdentityStore, NetworkProber, ProbeConfig,
    Prober, VerifiedTlsOptions,
};

// Re-export runtime for convenience
pub use tokio;
