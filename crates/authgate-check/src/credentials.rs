// crates/authgate-check/src/credentials.rs
// ============================================================================
// Module: Credential Discovery
// Description: Locate the CA certificate and per-user client identities.
// Purpose: Build a read-only credential bundle from a certificate directory.
// Dependencies: std, thiserror, tracing
// ============================================================================

//! ## Overview
//! A certificate directory holds an optional `ca.crt` and any number of
//! `user.<id>.key` / `user.<id>.crt` pairs. [`discover`] scans the directory
//! once (non-recursive) and classifies entries by filename alone;
//! [`DiscoveredFiles::into_bundle`] then validates the result into a
//! [`CredentialBundle`].
//!
//! ## Invariants
//! - Each user identifier maps to exactly one key and one certificate path.
//! - Identifiers iterate in lexicographic order.
//! - A later entry for the same identifier overwrites an earlier one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Filename of the certificate authority bundle.
pub const CA_FILE_NAME: &str = "ca.crt";
/// Prefix shared by every user identity file.
const USER_PREFIX: &str = "user.";
/// Suffix of a user private key file.
const KEY_SUFFIX: &str = ".key";
/// Suffix of a user certificate file.
const CERT_SUFFIX: &str = ".crt";
/// Identities ending with this suffix are not provisioned on the gateway.
pub const UNPROVISIONED_SUFFIX: &str = ".user1";

// ============================================================================
// SECTION: Types
// ============================================================================

/// User identifier derived from a filename stem (for example `user.alice`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the gateway is expected to know this identity.
    ///
    /// Identities ending in [`UNPROVISIONED_SUFFIX`] are fixtures for a client
    /// certificate the CA signed but the gateway never enrolled.
    #[must_use]
    pub fn is_provisioned(&self) -> bool {
        !self.0.ends_with(UNPROVISIONED_SUFFIX)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key and certificate paths for one client identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredential {
    /// PEM private key path.
    pub key: PathBuf,
    /// PEM certificate path.
    pub cert: PathBuf,
}

/// Classification of a single directory entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// The CA certificate.
    CaCert,
    /// A user private key.
    UserKey(UserId),
    /// A user certificate.
    UserCert(UserId),
}

/// Raw discovery output before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredFiles {
    /// CA certificate path, when present.
    pub ca_cert: Option<PathBuf>,
    /// Private key paths by identity.
    pub keys: BTreeMap<UserId, PathBuf>,
    /// Certificate paths by identity.
    pub certs: BTreeMap<UserId, PathBuf>,
}

/// Validated, read-only credential bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialBundle {
    /// CA certificate path; `None` only for plain-HTTP targets.
    ca_cert: Option<PathBuf>,
    /// Client identities in lexicographic order.
    users: BTreeMap<UserId, UserCredential>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Credential discovery and validation errors.
///
/// # Invariants
/// - Variants are stable for CLI error mapping and tests.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The directory could not be listed.
    #[error("failed to read {path}: {source}")]
    ReadDir {
        /// Directory path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// No CA certificate was found but the target requires TLS.
    #[error("{CA_FILE_NAME} not found in {path}; required for https targets")]
    MissingCa {
        /// Directory path.
        path: String,
    },
    /// A key file has no matching certificate.
    #[error("{user} has a private key but no certificate")]
    MissingCertificate {
        /// Identity missing its certificate.
        user: UserId,
    },
    /// A certificate file has no matching key.
    #[error("{user} has a certificate but no private key")]
    MissingKey {
        /// Identity missing its key.
        user: UserId,
    },
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Classifies a directory entry name.
///
/// Returns `None` for names that are not part of the credential layout.
#[must_use]
pub fn classify(name: &str) -> Option<EntryKind> {
    if name == CA_FILE_NAME {
        return Some(EntryKind::CaCert);
    }
    if let Some(user) = user_stem(name, KEY_SUFFIX) {
        return Some(EntryKind::UserKey(user));
    }
    user_stem(name, CERT_SUFFIX).map(EntryKind::UserCert)
}

/// Returns `user.<id>` when `name` is `user.<id><suffix>` with a non-empty id.
fn user_stem(name: &str, suffix: &str) -> Option<UserId> {
    let stem = name.strip_suffix(suffix)?;
    let id = stem.strip_prefix(USER_PREFIX)?;
    if id.is_empty() {
        return None;
    }
    Some(UserId::new(stem))
}

/// Scans `dir` (non-recursive) and classifies its entries.
///
/// Subdirectories and names that are not valid UTF-8 are skipped.
///
/// # Errors
///
/// Returns [`CredentialError::ReadDir`] when the directory cannot be listed.
pub fn discover(dir: &Path) -> Result<DiscoveredFiles, CredentialError> {
    let read_err = |source| CredentialError::ReadDir {
        path: dir.display().to_string(),
        source,
    };
    let mut found = DiscoveredFiles::default();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        match classify(&name) {
            Some(EntryKind::CaCert) => found.ca_cert = Some(path),
            Some(EntryKind::UserKey(user)) => {
                found.keys.insert(user, path);
            }
            Some(EntryKind::UserCert(user)) => {
                found.certs.insert(user, path);
            }
            None => tracing::debug!(file = %name, "ignoring unrelated file"),
        }
    }
    Ok(found)
}

impl DiscoveredFiles {
    /// Validates discovery output into a [`CredentialBundle`].
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MissingCa`] when `require_ca` is set and no
    /// CA was found, and [`CredentialError::MissingCertificate`] or
    /// [`CredentialError::MissingKey`] for the first unpaired identity.
    pub fn into_bundle(
        mut self,
        dir: &Path,
        require_ca: bool,
    ) -> Result<CredentialBundle, CredentialError> {
        if require_ca && self.ca_cert.is_none() {
            return Err(CredentialError::MissingCa {
                path: dir.display().to_string(),
            });
        }
        if let Some(user) = self.certs.keys().find(|user| !self.keys.contains_key(*user)) {
            return Err(CredentialError::MissingKey {
                user: user.clone(),
            });
        }
        let mut users = BTreeMap::new();
        for (user, key) in self.keys {
            let Some(cert) = self.certs.remove(&user) else {
                return Err(CredentialError::MissingCertificate {
                    user,
                });
            };
            users.insert(
                user,
                UserCredential {
                    key,
                    cert,
                },
            );
        }
        Ok(CredentialBundle {
            ca_cert: self.ca_cert,
            users,
        })
    }
}

impl CredentialBundle {
    /// Discovers and validates credentials in one step.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the directory cannot be read or the
    /// discovered files do not form a valid bundle.
    pub fn load(dir: &Path, require_ca: bool) -> Result<Self, CredentialError> {
        discover(dir)?.into_bundle(dir, require_ca)
    }

    /// Returns the CA certificate path, if any.
    #[must_use]
    pub fn ca_cert(&self) -> Option<&Path> {
        self.ca_cert.as_deref()
    }

    /// Iterates identities in lexicographic order.
    pub fn users(&self) -> impl Iterator<Item = (&UserId, &UserCredential)> {
        self.users.iter()
    }

    /// Returns the number of client identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true when no client identities were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
