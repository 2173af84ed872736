//! Version lifecycle management
//!
//! [`TemplateVersionManager`] creates, publishes, deprecates and archives
//! version records through a [`VersionStore`](crate::store::VersionStore),
//! keeps the per-template current-version pointer up to date and assembles
//! version-to-version diffs.

pub mod diff;
mod manager;

pub use diff::{metadata_changes, version_diff, MetadataField, VersionChange, VersionComparison, VersionDiff};
pub use manager::{NewVersion, TemplateVersionManager, VersionQuery};
