//! TCP and TLS connection probes for endpoint trust negotiation.
//!
//! Three probe flavours plus chain capture, each opening exactly one
//! connection and closing it before returning:
//!
//! - [`Prober::probe_tcp`]: plain TCP connect
//! - [`Prober::probe_insecure_tls`]: TLS with all certificate checks disabled
//! - [`Prober::probe_verified_tls`]: WebPKI verification, optionally against a
//!   custom root CA and optionally without hostname matching
//! - [`Prober::fetch_chain`]: insecure TLS capturing the presented chain
//!
//! Custom root CAs are handed to rustls in memory; nothing is written to disk.

#![doc(html_root_url = "https://docs.rs/trustprobe-net/0.1.0")]

mod config;
mod identity;
mod probe;
mod tls;
pub mod trust_store;

pub use config::{ProbeConfig, DEFAULT_CONNECT_TIMEOUT};
pub use identity::{ClientIdentity, ClientIdentityResolver, DirectoryIdentityStore, NoIdentities};
pub use probe::{NetworkProber, Prober, VerifiedTlsOptions};
