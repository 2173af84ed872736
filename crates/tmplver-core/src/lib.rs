//! Tmplver Core - version lifecycle management for document templates
//!
//! This crate stores and evolves the versions of a catalog of templates on
//! top of the version algebra in `tmplver-schemas`.
//!
//! # Main Components
//!
//! - **Error Handling**: Error types using `thiserror` and `anyhow`
//! - **Core Types**: Version records, snapshots and template pointers
//! - **Store**: The async persistence contract and an in-memory backend
//! - **Lifecycle**: `TemplateVersionManager`, which creates, publishes,
//!   deprecates and archives versions and diffs them
//! - **Configuration and Logging**: file/env configuration and tracing setup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tmplver_core::{
//!     DocumentSnapshot, EngineConfig, FieldDescriptor, FieldKind, MemoryStore, NewVersion, Result,
//!     TemplateVersionManager,
//! };
//!
//! async fn example() -> Result<()> {
//!     let manager = TemplateVersionManager::new(Arc::new(MemoryStore::new()), EngineConfig::default());
//!     let snapshot = DocumentSnapshot::new(vec![FieldDescriptor::required("tenant", FieldKind::Text)]);
//!
//!     manager.create_version(NewVersion::new("lease", "1.0.0", snapshot, "author")).await?;
//!     manager.publish_version("lease", "1.0.0", "reviewer").await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use config::{EngineConfig, ValidationConfig, VersionsConfig};
pub use error::{Error, Result};
pub use lifecycle::{
    MetadataField, NewVersion, TemplateVersionManager, VersionChange, VersionComparison, VersionDiff, VersionQuery,
};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use store::{
    CreateOutcome, MemoryStore, StatusUpdate, StoreError, StoreResult, TransitionOutcome, VersionFilter, VersionStore,
};
pub use types::{
    record_id, ChangelogEntry, ChangelogKind, CompatibilityInfo, DocumentSnapshot, FieldDescriptor, FieldKind,
    LifecycleStatus, TemplateMetadata, TemplatePointer, TemplateVersionRecord, Version,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
