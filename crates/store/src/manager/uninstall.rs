use tracing::info;

use super::ExtensionManager;
use crate::error::{Result, StoreError};
use crate::report::Outcome;
use crate::sequencer::{run_sequence, task, Task};

impl ExtensionManager {
    /// Uninstall each id in order, stopping at the first id that fails
    pub async fn uninstall(&self, ids: &[String]) -> Result<()> {
        let tasks: Vec<Task<'_>> = ids
            .iter()
            .map(|id| task(move || self.uninstall_one(id)))
            .collect();

        run_sequence(tasks).await
    }

    async fn uninstall_one(&self, id: &str) -> Result<()> {
        let installed = self.management.list_installed().await?;
        let extension = installed
            .into_iter()
            .find(|ext| ext.identity().matches(id))
            .ok_or_else(|| StoreError::ExtensionNotInstalled(id.to_string()))?;

        info!("Uninstalling {}", id);
        self.management.uninstall(&extension).await?;
        self.reporter.report(Outcome::Uninstalled { id: id.to_string() });
        Ok(())
    }
}
