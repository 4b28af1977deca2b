//! Manager module - orchestration of extension lifecycle commands
//!
//! `ExtensionManager` turns a requested command into a list of deferred
//! tasks and runs them through the sequencer, reporting each outcome as it
//! happens. The installed set and the gallery are injected collaborators.

mod install;
mod uninstall;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::gallery::ExtensionGallery;
use crate::registry::ExtensionManagement;
use crate::report::{Outcome, Reporter};

/// Requested lifecycle command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { show_versions: bool },
    Install(Vec<String>),
    Uninstall(Vec<String>),
}

/// Central entry point for listing, installing and uninstalling extensions
pub struct ExtensionManager {
    management: Arc<dyn ExtensionManagement>,
    gallery: Arc<dyn ExtensionGallery>,
    reporter: Arc<dyn Reporter>,
    /// Base for relative package paths
    cwd: PathBuf,
}

impl ExtensionManager {
    pub fn new(
        management: Arc<dyn ExtensionManagement>,
        gallery: Arc<dyn ExtensionGallery>,
        reporter: Arc<dyn Reporter>,
        cwd: PathBuf,
    ) -> Self {
        Self {
            management,
            gallery,
            reporter,
            cwd,
        }
    }

    /// Dispatch a command. `None` completes without doing anything.
    pub async fn run(&self, command: Option<Command>) -> Result<()> {
        match command {
            Some(Command::List { show_versions }) => self.list(show_versions).await,
            Some(Command::Install(tokens)) => self.install(&tokens).await,
            Some(Command::Uninstall(ids)) => self.uninstall(&ids).await,
            None => {
                debug!("No extension command requested");
                Ok(())
            }
        }
    }

    /// Report every installed extension in the management service's order
    pub async fn list(&self, show_versions: bool) -> Result<()> {
        for extension in self.management.list_installed().await? {
            self.reporter.report(Outcome::Listed {
                identity: extension.identity(),
                version: show_versions.then(|| extension.version().to_string()),
            });
        }
        Ok(())
    }
}
