use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use eyre::Result;
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Environment variable overriding the gallery service URL
pub const GALLERY_URL_ENV: &str = "QUAY_GALLERY_URL";

const DEFAULT_GALLERY_URL: &str = "https://marketplace.quay.dev/api/";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GalleryConfig {
    pub service_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    pub extensions_dir: String,
    pub user_data_dir: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_GALLERY_URL.to_string(),
            timeout_secs: quay_store::gallery::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data_dir = get_default_data_dir();
        Self {
            extensions_dir: data_dir.join("extensions").to_string_lossy().to_string(),
            user_data_dir: data_dir.join("user-data").to_string_lossy().to_string(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        get_default_config_dir().join("config.json")
    }

    /// Load the configuration, writing defaults on first use
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::get_config_path);

        let mut config: Config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).await?;
            serde_json::from_str(&content)
                .map_err(|e| eyre::eyre!("Invalid config file {}: {}", config_path.display(), e))?
        } else {
            let default_config = Self::default();
            default_config.save(&config_path).await?;
            default_config
        };

        config.apply_env(std::env::var(GALLERY_URL_ENV).ok());
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    fn apply_env(&mut self, gallery_url: Option<String>) {
        if let Some(url) = gallery_url.filter(|url| !url.trim().is_empty()) {
            tracing::debug!("Using gallery URL from {}", GALLERY_URL_ENV);
            self.gallery.service_url = url;
        }
    }

    /// Apply command-line directory overrides
    pub fn with_overrides(
        mut self,
        extensions_dir: Option<PathBuf>,
        user_data_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = extensions_dir {
            self.paths.extensions_dir = dir.to_string_lossy().to_string();
        }
        if let Some(dir) = user_data_dir {
            self.paths.user_data_dir = dir.to_string_lossy().to_string();
        }
        self
    }

    pub fn extensions_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.extensions_dir)
    }

    pub fn user_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.user_data_dir)
    }

    /// Gallery base URL, always ending in `/` so endpoints join beneath it
    pub fn gallery_url(&self) -> Result<Url> {
        let mut raw = self.gallery.service_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| eyre::eyre!("Invalid gallery URL '{}': {}", raw, e))
    }
}

/// Get the default configuration directory
fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "quay", "quay") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        // Fallback to current directory if we can't determine project dirs
        PathBuf::from(".quay").join("config")
    }
}

/// Get the default data directory
pub fn get_default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "quay", "quay") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from(".quay").join("data")
    }
}
