use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::identity::{manifest_from_package_name, ExtensionIdentity};
use crate::manifest::{Checksum, ChecksumAlgorithm, ExtensionManifest};
use crate::models::{GalleryExtension, InstallSource, InstalledExtension};

/// File name an installed package is stored under inside its directory.
const PACKAGE_FILE: &str = "extension.vsix";

/// Management service owning the set of installed extensions.
///
/// The orchestrator only reads snapshots through `list_installed` and asks
/// for changes through the other methods. Errors from the mutating calls are
/// surfaced to the user unchanged.
#[async_trait]
pub trait ExtensionManagement: Send + Sync {
    /// Snapshot of installed extensions, in enumeration order
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>>;

    /// Install a local package file
    async fn install(&self, path: &Path) -> Result<InstalledExtension>;

    /// Install a gallery candidate
    async fn install_from_gallery(&self, extension: &GalleryExtension)
        -> Result<InstalledExtension>;

    /// Remove an installed extension
    async fn uninstall(&self, extension: &InstalledExtension) -> Result<()>;
}

/// Problem found while validating installed extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub extension_id: String,
    pub issue_type: ValidationIssueType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueType {
    MissingFiles,
    ChecksumMismatch,
}

/// JSON-based registry data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRegistry {
    extensions: Vec<InstalledExtension>,
    last_updated: DateTime<Utc>,
    version: String,
}

impl Default for JsonRegistry {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            last_updated: Utc::now(),
            version: "1.0".to_string(),
        }
    }
}

impl JsonRegistry {
    fn position(&self, identity: &ExtensionIdentity) -> Option<usize> {
        self.extensions
            .iter()
            .position(|ext| ext.identity() == *identity)
    }
}

/// Local file-system based management service
pub struct LocalRegistryStore {
    registry_path: PathBuf,
    backup_path: PathBuf,
    install_dir: PathBuf,
    registry: RwLock<JsonRegistry>,
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl LocalRegistryStore {
    /// Create a new LocalRegistryStore rooted at `install_dir`
    pub async fn new<P: AsRef<Path>>(install_dir: P) -> Result<Self> {
        let install_dir = install_dir.as_ref().to_path_buf();
        let registry_path = install_dir.join("registry.json");
        let backup_path = install_dir.join("registry.json.backup");

        fs::create_dir_all(&install_dir)
            .await
            .map_err(|e| StoreError::IoOperation {
                operation: "create extensions directory".to_string(),
                path: install_dir.clone(),
                source: e,
            })?;

        let registry = Self::load_registry(&registry_path, &backup_path).await?;

        Ok(Self {
            registry_path,
            backup_path,
            install_dir,
            registry: RwLock::new(registry),
            #[cfg(feature = "http")]
            client: crate::gallery::create_default_client(std::time::Duration::from_secs(
                crate::gallery::DEFAULT_TIMEOUT_SECS,
            ))?,
        })
    }

    /// Use a preconfigured HTTP client for gallery downloads
    #[cfg(feature = "http")]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Get the default installation directory for the current OS
    ///
    /// Returns an error if the system directories cannot be determined
    pub fn default_install_dir() -> Result<PathBuf> {
        use directories::ProjectDirs;

        let project_dirs = ProjectDirs::from("dev", "quay", "quay").ok_or_else(|| {
            StoreError::ConfigError(
                "Could not determine system directories for current user/OS".to_string(),
            )
        })?;

        Ok(project_dirs.data_local_dir().join("extensions"))
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    async fn load_registry(registry_path: &Path, backup_path: &Path) -> Result<JsonRegistry> {
        if !registry_path.exists() {
            info!("No existing registry found, creating new one");
            return Ok(JsonRegistry::default());
        }

        match fs::read_to_string(registry_path).await {
            Ok(content) => {
                let registry: JsonRegistry = serde_json::from_str(&content)
                    .map_err(|e| StoreError::CorruptedRegistry(e.to_string()))?;
                debug!(
                    "Loaded registry with {} extensions",
                    registry.extensions.len()
                );
                Ok(registry)
            }
            Err(e) => {
                warn!("Failed to load registry ({}), checking backup", e);
                if !backup_path.exists() {
                    return Ok(JsonRegistry::default());
                }
                let backup_content = fs::read_to_string(backup_path).await?;
                let registry = serde_json::from_str(&backup_content)
                    .map_err(|e| StoreError::CorruptedRegistry(e.to_string()))?;
                info!("Restored registry from backup");
                Ok(registry)
            }
        }
    }

    /// Save registry to disk, keeping the previous file as a backup
    async fn save_registry(&self, registry: &mut JsonRegistry) -> Result<()> {
        registry.last_updated = Utc::now();

        let content = serde_json::to_string_pretty(&*registry)?;

        if self.registry_path.exists() {
            if let Err(e) = fs::copy(&self.registry_path, &self.backup_path).await {
                warn!("Failed to create backup: {}", e);
            }
        }

        fs::write(&self.registry_path, content).await?;
        debug!("Registry saved successfully");
        Ok(())
    }

    fn extension_install_path(&self, manifest: &ExtensionManifest) -> PathBuf {
        self.install_dir
            .join(format!("{}-{}", manifest.identity(), manifest.version))
    }

    /// Write the package and its manifest into a scratch directory that is
    /// only moved into place once every write has succeeded.
    async fn stage_package(
        &self,
        dir_name: &str,
        manifest: &ExtensionManifest,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let staging = self.install_dir.join(format!(".staging-{}", dir_name));
        if staging.exists() {
            fs::remove_dir_all(&staging).await?;
        }

        let written = async {
            fs::create_dir_all(&staging).await?;
            fs::write(staging.join(PACKAGE_FILE), bytes).await?;
            fs::write(
                staging.join("manifest.json"),
                serde_json::to_string_pretty(manifest)?,
            )
            .await?;
            Ok::<(), StoreError>(())
        }
        .await;

        if let Err(e) = written {
            discard_dir(&staging).await;
            return Err(e);
        }
        Ok(staging)
    }

    /// Write package bytes to disk and record the installation, replacing any
    /// previous installation of the same identity.
    ///
    /// Nothing already installed is touched until the new files are complete.
    /// If the swap or the registry save fails, the previous entry and its
    /// directory are restored.
    async fn store_package(
        &self,
        manifest: ExtensionManifest,
        bytes: Vec<u8>,
        source: InstallSource,
    ) -> Result<InstalledExtension> {
        let identity = manifest.identity();
        let install_path = self.extension_install_path(&manifest);
        let dir_name = format!("{}-{}", identity, manifest.version);
        let mut registry = self.registry.write().await;

        let staging = self.stage_package(&dir_name, &manifest, &bytes).await?;

        // Same-version reinstalls land on an existing directory; park it
        // until the new entry is saved.
        let parked = if install_path.is_dir() {
            let parked = self.install_dir.join(format!(".replaced-{}", dir_name));
            if parked.exists() {
                fs::remove_dir_all(&parked).await?;
            }
            if let Err(e) = fs::rename(&install_path, &parked).await {
                discard_dir(&staging).await;
                return Err(e.into());
            }
            Some(parked)
        } else {
            None
        };

        if let Err(e) = fs::rename(&staging, &install_path).await {
            discard_dir(&staging).await;
            restore_dir(parked.as_deref(), &install_path).await;
            return Err(StoreError::IoOperation {
                operation: "move staged extension into place".to_string(),
                path: install_path,
                source: e,
            });
        }

        let mut installed = InstalledExtension::new(manifest, install_path.clone(), source);
        installed.checksum = Some(Checksum::from_data(
            ChecksumAlgorithm::preferred(),
            &bytes,
        ));
        installed.size = bytes.len() as u64;

        let previous = match registry.position(&identity) {
            Some(index) => Some((index, registry.extensions.remove(index))),
            None => None,
        };
        registry.extensions.push(installed.clone());

        if let Err(e) = self.save_registry(&mut registry).await {
            registry.extensions.pop();
            if let Some((index, entry)) = previous {
                registry.extensions.insert(index, entry);
            }
            discard_dir(&install_path).await;
            restore_dir(parked.as_deref(), &install_path).await;
            return Err(e);
        }

        if let Some(parked) = parked {
            discard_dir(&parked).await;
        }
        if let Some((_, entry)) = previous {
            info!(
                "Replaced {}@{} with {}",
                identity,
                entry.version(),
                installed.version()
            );
            if entry.install_path != install_path && entry.install_path.exists() {
                discard_dir(&entry.install_path).await;
            }
        }

        info!(
            "Successfully installed extension: {}@{}",
            identity,
            installed.version()
        );
        Ok(installed)
    }

    /// Fetch the bytes behind a gallery download handle
    async fn fetch_package(&self, download_url: &str) -> Result<Vec<u8>> {
        match url::Url::parse(download_url) {
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| {
                    StoreError::ConfigError(format!("Invalid file URL: {}", download_url))
                })?;
                read_package(&path).await
            }
            #[cfg(feature = "http")]
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                crate::gallery::download(&self.client, url.as_str()).await
            }
            Ok(url) => Err(StoreError::ConfigError(format!(
                "Unsupported download scheme '{}'",
                url.scheme()
            ))),
            Err(_) => read_package(Path::new(download_url)).await,
        }
    }

    /// Check every installed extension's files against its record
    pub async fn validate_installations(&self) -> Result<Vec<ValidationIssue>> {
        let registry = self.registry.read().await;
        let mut issues = Vec::new();

        for extension in &registry.extensions {
            let id = extension.identity().to_string();
            let package_path = extension.install_path.join(PACKAGE_FILE);

            if !package_path.exists() {
                issues.push(ValidationIssue {
                    extension_id: id,
                    issue_type: ValidationIssueType::MissingFiles,
                    description: "Package file missing".to_string(),
                });
                continue;
            }

            if let Some(ref checksum) = extension.checksum {
                let content = fs::read(&package_path).await?;
                if !checksum.verify(&content) {
                    issues.push(ValidationIssue {
                        extension_id: id,
                        issue_type: ValidationIssueType::ChecksumMismatch,
                        description: "Package checksum verification failed".to_string(),
                    });
                }
            }
        }

        Ok(issues)
    }
}

/// Remove a directory that is no longer referenced, logging rather than
/// failing when it cannot be removed.
async fn discard_dir(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path).await {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}

/// Move a parked directory back to where it was installed.
async fn restore_dir(parked: Option<&Path>, install_path: &Path) {
    if let Some(parked) = parked {
        if let Err(e) = fs::rename(parked, install_path).await {
            warn!(
                "Failed to restore {} from {}: {}",
                install_path.display(),
                parked.display(),
                e
            );
        }
    }
}

async fn read_package(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).await.map_err(|e| StoreError::IoOperation {
        operation: "read package".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

#[async_trait]
impl ExtensionManagement for LocalRegistryStore {
    async fn list_installed(&self) -> Result<Vec<InstalledExtension>> {
        Ok(self.registry.read().await.extensions.clone())
    }

    async fn install(&self, path: &Path) -> Result<InstalledExtension> {
        let manifest = manifest_from_package_name(path)?;
        let bytes = read_package(path).await?;
        debug!("Installing {} from {}", manifest.identity(), path.display());

        self.store_package(
            manifest,
            bytes,
            InstallSource::Package {
                path: path.to_path_buf(),
            },
        )
        .await
    }

    async fn install_from_gallery(
        &self,
        extension: &GalleryExtension,
    ) -> Result<InstalledExtension> {
        debug!(
            "Downloading {}@{} from {}",
            extension.identity(),
            extension.version,
            extension.download_url
        );
        let bytes = self.fetch_package(&extension.download_url).await?;

        self.store_package(
            extension.manifest(),
            bytes,
            InstallSource::Gallery {
                download_url: extension.download_url.clone(),
            },
        )
        .await
    }

    async fn uninstall(&self, extension: &InstalledExtension) -> Result<()> {
        let identity = extension.identity();
        let mut registry = self.registry.write().await;

        let index = registry
            .position(&identity)
            .ok_or_else(|| StoreError::ExtensionNotInstalled(identity.to_string()))?;
        let removed = registry.extensions.remove(index);

        if let Err(e) = self.save_registry(&mut registry).await {
            registry.extensions.insert(index, removed);
            return Err(e);
        }
        if removed.install_path.exists() {
            discard_dir(&removed.install_path).await;
        }

        info!("Successfully uninstalled extension: {}", identity);
        Ok(())
    }
}
