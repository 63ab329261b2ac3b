//! System trust store discovery and loading.

use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use trustprobe_core::{Certificate, ProbeError, Result};

/// Known root CA store locations across Linux distributions.
const CA_STORE_PATHS: &[&str] = &[
    // Debian / Ubuntu / Arch / Gentoo bundle
    "/etc/ssl/certs/ca-certificates.crt",
    // Fedora / RHEL bundle
    "/etc/pki/tls/certs/ca-bundle.crt",
    // Fedora / RHEL compatibility symlink
    "/etc/ssl/certs/ca-bundle.crt",
    // openSUSE / SLES
    "/etc/ssl/ca-bundle.pem",
    // Alpine / OpenBSD
    "/etc/ssl/cert.pem",
    // p11-kit extracted anchors (Arch, Fedora)
    "/etc/ca-certificates/extracted/tls-ca-bundle.pem",
];

/// Environment variable naming an additional CA bundle
const SSL_CERT_FILE: &str = "SSL_CERT_FILE";

/// Load the system trust anchors plus `extra` paths.
///
/// Unreadable stores and unparseable certificates are logged and skipped.
/// Certificates are deduplicated by SHA-256 fingerprint.
pub async fn load_trust_anchors(extra: &[PathBuf], skip_system: bool) -> Vec<Certificate> {
    let mut paths: Vec<PathBuf> = Vec::new();
    if !skip_system {
        paths.extend(CA_STORE_PATHS.iter().map(PathBuf::from));
        if let Some(file) = std::env::var_os(SSL_CERT_FILE) {
            paths.push(PathBuf::from(file));
        }
    }
    paths.extend(extra.iter().cloned());

    let mut certs = Vec::new();
    let mut seen_fingerprints = HashSet::new();

    for path in &paths {
        let found = match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => parse_pem_bundle(path).await,
            Ok(meta) if meta.is_dir() => parse_cert_directory(path).await,
            Ok(_) => continue,
            Err(_) => {
                debug!(path = %path.display(), "CA store path not found, skipping");
                continue;
            }
        };

        match found {
            Ok(found) => {
                for cert in found {
                    if seen_fingerprints.insert(cert.fingerprint_hex()) {
                        certs.push(cert);
                    }
                }
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to load CA store"),
        }
    }

    debug!(count = certs.len(), "loaded trust anchors");
    certs
}

/// Build a rustls root store from parsed certificates
#[must_use]
pub fn root_store<'a>(certs: impl IntoIterator<Item = &'a Certificate>) -> RootCertStore {
    let mut store = RootCertStore::empty();
    let (added, ignored) = store.add_parsable_certificates(
        certs
            .into_iter()
            .map(|cert| CertificateDer::from(cert.der.clone())),
    );
    if ignored > 0 {
        debug!(added, ignored, "some certificates are not usable as trust anchors");
    }
    store
}

/// Parse a PEM bundle file containing multiple certificates.
async fn parse_pem_bundle(path: &Path) -> Result<Vec<Certificate>> {
    let content = tokio::fs::read(path).await?;

    let pems = pem::parse_many(&content).map_err(|e| {
        ProbeError::Certificate(format!("{}: {e}", path.display()))
    })?;

    let mut certs = Vec::new();
    for p in &pems {
        if p.tag() != "CERTIFICATE" {
            continue;
        }
        match Certificate::from_der(p.contents()) {
            Ok(cert) => certs.push(cert),
            Err(e) => debug!(path = %path.display(), error = %e, "skipping cert in bundle"),
        }
    }

    Ok(certs)
}

/// Parse all .pem / .crt files in a directory.
async fn parse_cert_directory(dir: &Path) -> Result<Vec<Certificate>> {
    let mut certs = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !matches!(ext, "pem" | "crt" | "cer") {
            continue;
        }
        match parse_pem_bundle(&path).await {
            Ok(found) => certs.extend(found),
            Err(e) => debug!(path = %path.display(), error = %e, "skipping cert file"),
        }
    }

    Ok(certs)
}
