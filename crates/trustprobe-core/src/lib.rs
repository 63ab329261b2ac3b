//! Core types and errors for TLS endpoint trust negotiation.
//!
//! This crate provides the foundational types shared by the probes and the
//! trust decision state machine:
//!
//! - **Endpoint**: a resolved `host:port` plus scheme, see [`Endpoint::resolve`]
//! - **Certificates**: parsed X.509 certificates and the leaf/root chain
//! - **Submission**: the operator's submitted fields and the resulting [`Evaluation`]
//! - **Errors**: the probe error taxonomy in [`ProbeError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use trustprobe_core::{Endpoint, Scheme};
//!
//! let endpoint = Endpoint::resolve("https://monitoring.example:8443/api")?;
//! assert_eq!(endpoint.scheme, Scheme::Https);
//! assert_eq!(endpoint.port, 8443);
//! ```

#![doc(html_root_url = "https://docs.rs/trustprobe-core/0.1.0")]

mod error;
pub mod types;

pub use error::{ProbeError, Result};
pub use types::*;
