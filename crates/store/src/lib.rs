//! Quay Store - extension lifecycle management
//!
//! This crate lists, installs and uninstalls extension packages for a host
//! application. A requested token is either a local `.vsix` package file or
//! the name of an extension in a remote gallery. Every command is planned as a
//! list of deferred tasks that run strictly one after another, so each task's
//! check-then-act against the installed set never interleaves with another.
//!
//! # Features
//!
//! - **Idempotent installs**: gallery names that are already installed are
//!   reported and skipped
//! - **Ordered execution**: package files install before any gallery lookup
//! - **Fail fast**: the first failing task aborts the rest of the command
//! - **Readable failures**: gallery error bodies are mined for a server message
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quay_store::{Command, ExtensionManager, HttpGallery, LocalRegistryStore, RecordingReporter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(LocalRegistryStore::new("./extensions").await?);
//! let gallery = Arc::new(HttpGallery::new("https://gallery.example.com/api/".parse()?)?);
//! let reporter = Arc::new(RecordingReporter::new());
//!
//! let manager = ExtensionManager::new(registry, gallery, reporter.clone(), std::env::current_dir()?);
//! manager
//!     .run(Some(Command::Install(vec!["acme.foo".to_string()])))
//!     .await?;
//!
//! for line in reporter.lines() {
//!     println!("{}", line);
//! }
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod gallery;
pub mod identity;
pub mod manager;
pub mod manifest;
pub mod models;
pub mod registry;
pub mod report;
pub mod sequencer;

// Re-export commonly used types
pub use error::{Result, StoreError, TransportError};
pub use gallery::ExtensionGallery;
#[cfg(feature = "http")]
pub use gallery::HttpGallery;
pub use identity::{identity_of, is_package_path, ExtensionIdentity};
pub use manager::{Command, ExtensionManager};
pub use manifest::ExtensionManifest;
pub use models::{GalleryExtension, GalleryPage, GalleryQuery, InstallSource, InstalledExtension};
pub use registry::{ExtensionManagement, LocalRegistryStore, ValidationIssue};
pub use report::{Outcome, RecordingReporter, Reporter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
