//! Error types for the Tmplver core library
//!
//! Errors are defined with thiserror; anyhow carries opaque sources from
//! configuration parsing and store backends.

use crate::store::StoreError;
use crate::types::LifecycleStatus;
use thiserror::Error;
use tmplver_schemas::VersionError;

/// Main error type for Tmplver operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed version string, raised before the store is touched
    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(#[from] VersionError),

    /// A record for this (template, version) pair already exists
    #[error("Version {version} already exists for template {template_id}")]
    VersionAlreadyExists { template_id: String, version: String },

    /// The referenced template or version is absent from the store
    #[error("Version {version} not found for template {template_id}")]
    NotFound { template_id: String, version: String },

    /// Lifecycle state machine violation
    #[error("Cannot move {template_id} v{version} from {from} to {to}")]
    InvalidTransition {
        template_id: String,
        version: String,
        from: LifecycleStatus,
        to: LifecycleStatus,
    },

    /// Publication refused because validation produced failures
    #[error("Publishing {template_id} v{version} blocked: {}", .failures.join("; "))]
    PublishBlocked {
        template_id: String,
        version: String,
        failures: Vec<String>,
    },

    /// Persistence errors, propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error without a source
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn not_found(template_id: &str, version: impl ToString) -> Self {
        Error::NotFound {
            template_id: template_id.to_string(),
            version: version.to_string(),
        }
    }
}
