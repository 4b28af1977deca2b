use std::fmt;
use std::sync::Mutex;

use crate::identity::ExtensionIdentity;

/// Result of one successful sub-operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Listed {
        identity: ExtensionIdentity,
        version: Option<String>,
    },
    InstalledFromPath {
        file_name: String,
    },
    InstalledFromGallery {
        id: String,
        version: String,
    },
    AlreadyInstalled {
        id: String,
    },
    Uninstalled {
        id: String,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Listed {
                identity,
                version: Some(version),
            } => write!(f, "{}@{}", identity, version),
            Outcome::Listed { identity, .. } => write!(f, "{}", identity),
            Outcome::InstalledFromPath { file_name } => {
                write!(f, "Extension '{}' was successfully installed!", file_name)
            }
            Outcome::InstalledFromGallery { id, version } => {
                write!(f, "Extension '{}' v{} was successfully installed!", id, version)
            }
            Outcome::AlreadyInstalled { id } => {
                write!(f, "Extension '{}' is already installed.", id)
            }
            Outcome::Uninstalled { id } => {
                write!(f, "Extension '{}' was successfully uninstalled!", id)
            }
        }
    }
}

/// Receives outcomes as they happen
pub trait Reporter: Send + Sync {
    fn report(&self, outcome: Outcome);
}

/// Keeps every outcome in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    outcomes: Mutex<Vec<Outcome>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes
            .lock()
            .map(|outcomes| outcomes.clone())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.outcomes().iter().map(ToString::to_string).collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, outcome: Outcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(outcome);
        }
    }
}
