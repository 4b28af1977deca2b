//! Extension identities and request-token classification.
//!
//! Every comparison between installed, gallery and requested extensions goes
//! through the canonical `publisher.name` string produced here.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::manifest::ExtensionManifest;

/// File suffix that marks a request token as a local package file.
pub const PACKAGE_SUFFIX: &str = ".vsix";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionIdentity {
    pub publisher: String,
    pub name: String,
}

impl ExtensionIdentity {
    pub fn new(publisher: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            name: name.into(),
        }
    }

    /// Split a canonical id at its first dot.
    pub fn parse(id: &str) -> Result<Self> {
        match id.split_once('.') {
            Some((publisher, name)) if !publisher.is_empty() && !name.is_empty() => {
                Ok(Self::new(publisher, name))
            }
            _ => Err(StoreError::InvalidExtensionId(id.to_string())),
        }
    }

    pub fn matches(&self, id: &str) -> bool {
        self.to_string() == id
    }
}

impl fmt::Display for ExtensionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.publisher, self.name)
    }
}

/// Canonical `publisher.name` id of a manifest.
pub fn identity_of(manifest: &ExtensionManifest) -> String {
    manifest.identity().to_string()
}

/// True when the token names a package file rather than a registry entry.
pub fn is_package_path(token: &str) -> bool {
    token.to_ascii_lowercase().ends_with(PACKAGE_SUFFIX)
}

/// Resolve a package token against `cwd` unless it is already absolute.
pub fn resolve_package_path(cwd: &Path, token: &str) -> PathBuf {
    let path = Path::new(token);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Base name used when reporting a path install.
pub fn package_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Derive a manifest from a conventional package file name,
/// `<publisher>.<name>-<version>.vsix`.
pub fn manifest_from_package_name(path: &Path) -> Result<ExtensionManifest> {
    let invalid = |reason: &str| StoreError::InvalidPackage {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let file_name = package_file_name(path);
    if !is_package_path(&file_name) {
        return Err(invalid("expected a .vsix package file"));
    }
    let stem = &file_name[..file_name.len() - PACKAGE_SUFFIX.len()];

    // Versions never contain '-' before their pre-release part, so the first
    // '-' followed by a digit starts the version.
    let split = stem
        .match_indices('-')
        .map(|(idx, _)| idx)
        .find(|&idx| stem[idx + 1..].starts_with(|c: char| c.is_ascii_digit()))
        .ok_or_else(|| invalid("file name must be <publisher>.<name>-<version>.vsix"))?;

    let (id, version) = (&stem[..split], &stem[split + 1..]);
    let version = semver::Version::parse(version)?;
    let identity = ExtensionIdentity::parse(id)
        .map_err(|_| invalid("file name must start with <publisher>.<name>"))?;

    Ok(ExtensionManifest::new(
        identity.publisher,
        identity.name,
        version.to_string(),
    ))
}
