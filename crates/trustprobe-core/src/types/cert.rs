//! Parsed X.509 certificates and the leaf/root chain a server presents.

use chrono::{DateTime, TimeZone, Utc};
use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY, SHA256};
use serde::{Deserialize, Serialize};
use x509_parser::objects::{oid2abbrev, oid_registry};
use x509_parser::x509::X509Name;

use crate::error::{ProbeError, Result};

/// PEM tag of an X.509 certificate block
const PEM_CERTIFICATE: &str = "CERTIFICATE";

/// `DateTime::ISO8601` layout, e.g. `2024-03-01T12:00:00+0100`
const ISO8601: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Ordered relative distinguished names: attribute short name -> value
pub type DistinguishedName = Vec<(String, String)>;

/// A parsed X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// DER encoding
    pub der: Vec<u8>,
    /// Subject RDNs in certificate order
    pub subject: DistinguishedName,
    /// Issuer RDNs in certificate order
    pub issuer: DistinguishedName,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// SHA-256 of the DER encoding
    pub sha256: [u8; 32],
    /// SHA-1 of the DER encoding
    pub sha1: [u8; 20],
}

impl Certificate {
    /// Parse a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| ProbeError::Certificate(e.to_string()))?;

        let not_before = asn1_to_utc(cert.validity().not_before)?;
        let not_after = asn1_to_utc(cert.validity().not_after)?;

        let mut sha256 = [0u8; 32];
        sha256.copy_from_slice(digest(&SHA256, der).as_ref());
        let mut sha1 = [0u8; 20];
        sha1.copy_from_slice(digest(&SHA1_FOR_LEGACY_USE_ONLY, der).as_ref());

        Ok(Self {
            der: der.to_vec(),
            subject: rdn_list(cert.subject()),
            issuer: rdn_list(cert.issuer()),
            not_before,
            not_after,
            sha256,
            sha1,
        })
    }

    /// Parse the first `CERTIFICATE` block of a PEM document
    pub fn from_pem(text: &str) -> Result<Self> {
        let blocks =
            pem::parse_many(text.as_bytes()).map_err(|e| ProbeError::Certificate(e.to_string()))?;

        let block = blocks
            .iter()
            .find(|p| p.tag() == PEM_CERTIFICATE)
            .ok_or_else(|| ProbeError::Certificate("no CERTIFICATE block found".into()))?;

        Self::from_der(block.contents())
    }

    /// Export as a single PEM `CERTIFICATE` block
    #[must_use]
    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new(PEM_CERTIFICATE, self.der.clone()))
    }

    /// First `CN` attribute of the subject
    #[must_use]
    pub fn subject_cn(&self) -> Option<&str> {
        common_name(&self.subject)
    }

    /// First `CN` attribute of the issuer
    #[must_use]
    pub fn issuer_cn(&self) -> Option<&str> {
        common_name(&self.issuer)
    }

    /// Self-issued iff the subject CN equals the issuer CN.
    ///
    /// Two absent CNs compare equal.
    #[must_use]
    pub fn is_self_issued(&self) -> bool {
        self.subject_cn() == self.issuer_cn()
    }

    /// SHA-256 fingerprint as space-separated uppercase hex pairs
    #[must_use]
    pub fn sha256_fingerprint(&self) -> String {
        format_fingerprint(&self.sha256)
    }

    /// SHA-1 fingerprint as space-separated uppercase hex pairs
    #[must_use]
    pub fn sha1_fingerprint(&self) -> String {
        format_fingerprint(&self.sha1)
    }

    /// Compact lowercase SHA-256 hex, used as a dedup key
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.sha256)
    }
}

/// The certificates a server presented, reduced to leaf and root.
///
/// Intermediates are not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChain {
    /// End-entity certificate (first presented)
    pub leaf: Certificate,
    /// Last presented certificate, only if the chain had more than one entry
    /// and that certificate is self-issued
    pub root: Option<Certificate>,
}

impl CertificateChain {
    /// Build a chain from DER certificates in the order the server sent them
    pub fn from_presented<C: AsRef<[u8]>>(presented: &[C]) -> Result<Self> {
        let (first, rest) = presented.split_first().ok_or_else(|| {
            ProbeError::ChainDiscovery("The remote didn't present any TLS certificate".into())
        })?;

        let leaf = Certificate::from_der(first.as_ref())?;

        let root = match rest.last() {
            Some(last) => {
                let candidate = Certificate::from_der(last.as_ref())?;
                candidate.is_self_issued().then_some(candidate)
            }
            None => None,
        };

        Ok(Self { leaf, root })
    }

    /// The leaf signed itself: there is no separate CA to discover
    #[must_use]
    pub fn has_self_signed_leaf(&self) -> bool {
        self.leaf.is_self_issued()
    }
}

/// Human-readable root CA details shown to the operator before accepting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCaDetails {
    /// Subject RDNs rendered as `KEY = 'value'`
    pub subject: Vec<String>,
    /// Start of validity, ISO-8601 in the viewer's timezone
    pub valid_from: String,
    /// End of validity, ISO-8601 in the viewer's timezone
    pub valid_until: String,
    /// SHA-256 fingerprint
    pub sha256_fingerprint: String,
    /// SHA-1 fingerprint
    pub sha1_fingerprint: String,
}

impl RootCaDetails {
    /// Render the details of `cert` for a viewer in `tz`
    pub fn new<Tz>(cert: &Certificate, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            subject: cert
                .subject
                .iter()
                .map(|(key, value)| format!("{key} = '{}'", value.replace('\'', "\\'")))
                .collect(),
            valid_from: cert.not_before.with_timezone(tz).format(ISO8601).to_string(),
            valid_until: cert.not_after.with_timezone(tz).format(ISO8601).to_string(),
            sha256_fingerprint: cert.sha256_fingerprint(),
            sha1_fingerprint: cert.sha1_fingerprint(),
        }
    }
}

/// Render a digest as uppercase hex byte pairs separated by single spaces.
#[must_use]
pub fn format_fingerprint(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn common_name(name: &DistinguishedName) -> Option<&str> {
    name.iter()
        .find(|(key, _)| key == "CN")
        .map(|(_, value)| value.as_str())
}

fn rdn_list(name: &X509Name<'_>) -> DistinguishedName {
    let registry = oid_registry();
    name.iter_attributes()
        .map(|attr| {
            let oid = attr.attr_type();
            let key = oid2abbrev(oid, registry)
                .map_or_else(|_| oid.to_id_string(), ToString::to_string);
            let value = attr.as_str().map_or_else(
                |_| hex::encode(attr.attr_value().data),
                ToString::to_string,
            );
            (key, value)
        })
        .collect()
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(t.timestamp(), 0)
        .single()
        .ok_or_else(|| ProbeError::Certificate(format!("validity timestamp out of range: {t}")))
}
