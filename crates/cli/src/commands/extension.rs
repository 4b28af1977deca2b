use eyre::Result;
use quay_store::{Command, ExtensionManager, Outcome, Reporter};

/// Prints one line per outcome on standard output
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&self, outcome: Outcome) {
        println!("{}", outcome);
    }
}

pub async fn handle_extension_command(
    command: Option<Command>,
    manager: &ExtensionManager,
) -> Result<()> {
    if let Some(ref command) = command {
        tracing::debug!("Running {:?}", command);
    }

    manager.run(command).await.map_err(|e| {
        if e.is_user_error() {
            tracing::debug!("Command rejected: {}", e);
        } else {
            tracing::warn!("Command failed: {}", e);
        }
        eyre::Report::from(e)
    })
}
