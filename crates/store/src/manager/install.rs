use std::path::PathBuf;

use tracing::{debug, info};

use super::ExtensionManager;
use crate::error::{enrich_transport_error, Result, StoreError};
use crate::identity::{is_package_path, package_file_name, resolve_package_path};
use crate::models::GalleryQuery;
use crate::report::Outcome;
use crate::sequencer::{run_sequence, task, Task};

/// Only the first gallery entry is ever considered.
const QUERY_PAGE_SIZE: usize = 1;

impl ExtensionManager {
    /// Install every token, package files first and gallery names after.
    ///
    /// Stops at the first failure; later tokens are not attempted.
    pub async fn install(&self, tokens: &[String]) -> Result<()> {
        let (paths, names): (Vec<&String>, Vec<&String>) =
            tokens.iter().partition(|token| is_package_path(token));
        debug!(
            "Planning install of {} package(s) and {} gallery extension(s)",
            paths.len(),
            names.len()
        );

        let mut tasks: Vec<Task<'_>> = Vec::with_capacity(tokens.len());
        for token in paths {
            let path = resolve_package_path(&self.cwd, token);
            tasks.push(task(move || self.install_package(path)));
        }
        for name in names {
            tasks.push(task(move || self.install_from_gallery(name)));
        }

        run_sequence(tasks).await
    }

    async fn install_package(&self, path: PathBuf) -> Result<()> {
        info!("Installing package {}", path.display());
        self.management.install(&path).await?;
        self.reporter.report(Outcome::InstalledFromPath {
            file_name: package_file_name(&path),
        });
        Ok(())
    }

    async fn install_from_gallery(&self, name: &str) -> Result<()> {
        let installed = self.management.list_installed().await?;
        if installed.iter().any(|ext| ext.identity().matches(name)) {
            info!("Extension {} already installed, skipping", name);
            self.reporter.report(Outcome::AlreadyInstalled {
                id: name.to_string(),
            });
            return Ok(());
        }

        let query = GalleryQuery::new()
            .with_names(vec![name.to_string()])
            .page_size(QUERY_PAGE_SIZE);
        let page = self
            .gallery
            .query(&query)
            .await
            .map_err(enrich_transport_error)?;

        // First entry of the first page wins; no disambiguation.
        let candidate = page
            .first()
            .cloned()
            .ok_or_else(|| StoreError::ExtensionNotFound(name.to_string()))?;
        debug!("Resolved {} to {}@{}", name, candidate.identity(), candidate.version);

        self.management.install_from_gallery(&candidate).await?;
        self.reporter.report(Outcome::InstalledFromGallery {
            id: name.to_string(),
            version: candidate.version,
        });
        Ok(())
    }
}
