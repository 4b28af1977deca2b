//! Process bootstrap: directories and the extension manager wiring.

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use quay_store::{ExtensionManager, HttpGallery, LocalRegistryStore, Reporter};
use tokio::fs;

use crate::config::Config;

/// Create the directories the host expects before any command runs
pub async fn bootstrap(config: &Config) -> Result<()> {
    for dir in [config.extensions_dir(), config.user_data_dir()] {
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| eyre::eyre!("Failed to create {}: {}", dir.display(), e))?;
        tracing::debug!("Ensured directory {}", dir.display());
    }
    Ok(())
}

/// Build an extension manager backed by the local registry and HTTP gallery
pub async fn create_extension_manager(
    config: &Config,
    reporter: Arc<dyn Reporter>,
) -> Result<ExtensionManager> {
    let client = quay_store::gallery::create_default_client(Duration::from_secs(
        config.gallery.timeout_secs,
    ))?;

    let registry = LocalRegistryStore::new(config.extensions_dir())
        .await?
        .with_client(client.clone());
    let gallery = HttpGallery::with_client(client, config.gallery_url()?);

    Ok(ExtensionManager::new(
        Arc::new(registry),
        Arc::new(gallery),
        reporter,
        std::env::current_dir()?,
    ))
}
