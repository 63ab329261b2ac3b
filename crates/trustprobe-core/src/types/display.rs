//! Optional form fields and the set of them currently shown to the operator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::SubmittedFields;

/// An optional, conditionally displayed field.
///
/// Declaration order is the fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalField {
    /// Enforce changes without connectivity validation
    ForceCreation,
    /// Don't validate the remote's TLS certificate chain at all
    TlsServerInsecure,
    /// Ignore the remote's TLS certificate's CN
    TlsServerIgnoreCn,
    /// Discover the remote's TLS certificate's root CA
    TlsServerDiscoverRootca,
    /// Read-only details of the cached root CA
    TlsServerRootcaInfo,
    /// Trust the remote's TLS certificate's root CA
    TlsServerAcceptRootca,
}

impl OptionalField {
    /// Every field, in display order
    pub const ALL: [Self; 6] = [
        Self::ForceCreation,
        Self::TlsServerInsecure,
        Self::TlsServerIgnoreCn,
        Self::TlsServerDiscoverRootca,
        Self::TlsServerRootcaInfo,
        Self::TlsServerAcceptRootca,
    ];

    /// The error-handling options: everything except the read-only info block
    pub const ERROR_HANDLING: [Self; 5] = [
        Self::ForceCreation,
        Self::TlsServerInsecure,
        Self::TlsServerIgnoreCn,
        Self::TlsServerDiscoverRootca,
        Self::TlsServerAcceptRootca,
    ];

    /// Form field name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ForceCreation => "force_creation",
            Self::TlsServerInsecure => "tls_server_insecure",
            Self::TlsServerIgnoreCn => "tls_server_ignore_cn",
            Self::TlsServerDiscoverRootca => "tls_server_discover_rootca",
            Self::TlsServerRootcaInfo => "tls_server_rootca_info",
            Self::TlsServerAcceptRootca => "tls_server_accept_rootca",
        }
    }

    /// Short operator-facing label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ForceCreation => "Force Changes",
            Self::TlsServerInsecure => "Insecure Connection",
            Self::TlsServerIgnoreCn => "Ignore Remote CN",
            Self::TlsServerDiscoverRootca => "Discover Root CA",
            Self::TlsServerRootcaInfo => "Root CA",
            Self::TlsServerAcceptRootca => "Accept the remote's root CA",
        }
    }

    /// Whether this field is an action or checkbox the operator can set
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        !matches!(self, Self::TlsServerRootcaInfo)
    }
}

impl std::fmt::Display for OptionalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for OptionalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown optional field: {s}"))
    }
}

/// The optional fields to display after a validation pass.
///
/// Iterates in the fixed display order regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayOptions(BTreeSet<OptionalField>);

impl DisplayOptions {
    /// No optional fields
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Derive the fields present at submission time.
    ///
    /// Every checked option stays displayed. A cached root CA brings in the
    /// discover action, its details block and the accept checkbox.
    #[must_use]
    pub fn from_submission(fields: &SubmittedFields) -> Self {
        let mut display: Self = OptionalField::ERROR_HANDLING
            .into_iter()
            .filter(|field| fields.is_checked(*field))
            .collect();

        if fields.tls_server_rootca_cert.is_some() {
            display.insert(OptionalField::TlsServerDiscoverRootca);
            display.insert(OptionalField::TlsServerRootcaInfo);
            display.insert(OptionalField::TlsServerAcceptRootca);
        }

        display
    }

    /// Show `field`
    pub fn insert(&mut self, field: OptionalField) {
        self.0.insert(field);
    }

    /// Hide `field`
    pub fn remove(&mut self, field: OptionalField) {
        self.0.remove(&field);
    }

    /// Whether `field` is shown
    #[must_use]
    pub fn contains(&self, field: OptionalField) -> bool {
        self.0.contains(&field)
    }

    /// Keep exactly `allowed` among the error-handling options.
    ///
    /// The root CA details block is not an error-handling option and is left as is.
    pub fn restrict_to(&mut self, allowed: &[OptionalField]) {
        for field in OptionalField::ERROR_HANDLING {
            if allowed.contains(&field) {
                self.0.insert(field);
            } else {
                self.0.remove(&field);
            }
        }
    }

    /// Fields in display order
    pub fn iter(&self) -> impl Iterator<Item = OptionalField> + '_ {
        self.0.iter().copied()
    }

    /// Field names in display order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(OptionalField::name).collect()
    }

    /// Returns true if nothing optional is displayed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of displayed fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<OptionalField> for DisplayOptions {
    fn from_iter<I: IntoIterator<Item = OptionalField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DisplayOptions {
    type Item = OptionalField;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, OptionalField>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
