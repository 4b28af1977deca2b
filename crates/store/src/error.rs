use std::fmt;

use thiserror::Error;

/// Appended to lookup failures so the user learns the expected id shape.
pub const FULL_ID_HINT: &str =
    "Make sure you use the full extension ID, including the publisher, e.g.: ms-vscode.csharp";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Extension '{0}' not found. {hint}", hint = FULL_ID_HINT)]
    ExtensionNotFound(String),

    #[error("Extension '{0}' is not installed. {hint}", hint = FULL_ID_HINT)]
    ExtensionNotInstalled(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Server-supplied reason extracted from a failed gallery response.
    #[error("{0}")]
    Gallery(String),

    #[error("Invalid package '{path}': {reason}")]
    InvalidPackage {
        path: std::path::PathBuf,
        reason: String,
    },

    #[error("Invalid extension id: {0}")]
    InvalidExtensionId(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("IO operation '{operation}' failed on path '{path}': {source}")]
    IoOperation {
        operation: String,
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid version format: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("Corrupted registry: {0}")]
    CorruptedRegistry(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout error: operation timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Transport(_) | StoreError::Timeout)
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::ExtensionNotFound(_)
                | StoreError::ExtensionNotInstalled(_)
                | StoreError::InvalidPackage { .. }
                | StoreError::InvalidExtensionId(_)
        )
    }
}

/// Failure of the gallery's network transport.
///
/// `response_text` holds the body of a completed-but-unsuccessful response,
/// when the server sent one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
    pub response_text: Option<String>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            response_text: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_response_text(mut self, text: impl Into<String>) -> Self {
        self.response_text = Some(text.into());
        self
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "Network error ({}): {}", status, self.message),
            None => write!(f, "Network error: {}", self.message),
        }
    }
}

/// Replace a transport failure with the server's own `message`, if its body
/// is a JSON object carrying one. Every other error passes through untouched.
pub fn enrich_transport_error(err: StoreError) -> StoreError {
    let StoreError::Transport(transport) = &err else {
        return err;
    };
    let Some(text) = transport.response_text.as_deref() else {
        return err;
    };

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(body) => match body.get("message").and_then(|m| m.as_str()) {
            Some(message) => StoreError::Gallery(message.to_string()),
            None => err,
        },
        Err(_) => err,
    }
}
