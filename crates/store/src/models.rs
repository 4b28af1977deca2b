use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::ExtensionIdentity;
use crate::manifest::{Checksum, ExtensionManifest};

/// An extension known to the management service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledExtension {
    pub manifest: ExtensionManifest,
    pub install_path: PathBuf,
    pub installed_at: DateTime<Utc>,
    pub source: InstallSource,
    pub checksum: Option<Checksum>,
    pub size: u64,
}

impl InstalledExtension {
    pub fn new(manifest: ExtensionManifest, install_path: PathBuf, source: InstallSource) -> Self {
        Self {
            manifest,
            install_path,
            installed_at: Utc::now(),
            source,
            checksum: None,
            size: 0,
        }
    }

    pub fn identity(&self) -> ExtensionIdentity {
        self.manifest.identity()
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }
}

/// Where an installed extension came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InstallSource {
    Package { path: PathBuf },
    Gallery { download_url: String },
}

/// A catalog entry returned by a gallery query. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryExtension {
    pub publisher: String,
    pub name: String,
    pub version: String,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl GalleryExtension {
    pub fn identity(&self) -> ExtensionIdentity {
        ExtensionIdentity::new(&self.publisher, &self.name)
    }

    pub fn manifest(&self) -> ExtensionManifest {
        let mut manifest = ExtensionManifest::new(&self.publisher, &self.name, &self.version);
        manifest.display_name = self.display_name.clone();
        manifest
    }
}

/// Query sent to the gallery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryQuery {
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl GalleryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }
}

/// First page of gallery query results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryPage {
    #[serde(rename = "results")]
    pub first_page: Vec<GalleryExtension>,
    #[serde(default)]
    pub total: usize,
}

impl GalleryPage {
    pub fn new(first_page: Vec<GalleryExtension>) -> Self {
        let total = first_page.len();
        Self { first_page, total }
    }

    pub fn first(&self) -> Option<&GalleryExtension> {
        self.first_page.first()
    }
}
