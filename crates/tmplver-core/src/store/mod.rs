//! Persistence contract for version records and template pointers
//!
//! The lifecycle manager only talks to storage through [`VersionStore`].
//! Creation is an atomic create-if-absent and status changes are
//! conditional on the status the caller last observed, so no operation
//! needs to hold a lock across two round trips.

mod memory;

pub use memory::MemoryStore;

use crate::types::{LifecycleStatus, TemplatePointer, TemplateVersionRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
            source: None,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Filter applied when listing the versions of one template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionFilter {
    /// Only records in one of these statuses; `None` means any
    pub statuses: Option<Vec<LifecycleStatus>>,
    /// Skip prerelease versions
    pub stable_only: bool,
}

impl VersionFilter {
    /// Published records only
    pub fn published() -> Self {
        Self {
            statuses: Some(vec![LifecycleStatus::Published]),
            stable_only: false,
        }
    }

    pub fn stable(mut self, stable_only: bool) -> Self {
        self.stable_only = stable_only;
        self
    }

    pub fn matches(&self, record: &TemplateVersionRecord) -> bool {
        let status_ok = self
            .statuses
            .as_ref()
            .map_or(true, |statuses| statuses.contains(&record.status));
        status_ok && !(self.stable_only && record.version.is_pre_release())
    }
}

/// Result of a create-if-absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Field-level lifecycle update. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: LifecycleStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub deprecation_reason: Option<String>,
    pub deprecated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    pub fn new(status: LifecycleStatus) -> Self {
        Self {
            status,
            approved_by: None,
            approved_at: None,
            deprecation_reason: None,
            deprecated_at: None,
            archived_at: None,
        }
    }

    /// Write this update onto a record
    pub fn apply(&self, record: &mut TemplateVersionRecord) {
        record.status = self.status;
        if let Some(by) = &self.approved_by {
            record.approved_by = Some(by.clone());
        }
        if let Some(at) = self.approved_at {
            record.approved_at = Some(at);
        }
        if let Some(reason) = &self.deprecation_reason {
            record.deprecation_reason = Some(reason.clone());
        }
        if let Some(at) = self.deprecated_at {
            record.deprecated_at = Some(at);
        }
        if let Some(at) = self.archived_at {
            record.archived_at = Some(at);
        }
    }
}

/// Result of a conditional status transition
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The update was written; carries the updated record
    Applied(Box<TemplateVersionRecord>),
    Missing,
    /// The record was not in the expected status; carries the actual one
    StatusMismatch(LifecycleStatus),
}

/// Storage backend for version records and template pointers
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Fetch one record by id
    async fn get_version(&self, template_id: &str, record_id: &str) -> StoreResult<Option<TemplateVersionRecord>>;

    /// List the records of a template that match `filter`, in no particular order
    async fn list_versions(&self, template_id: &str, filter: &VersionFilter) -> StoreResult<Vec<TemplateVersionRecord>>;

    /// Insert `record` unless a record with the same id exists
    async fn create_version(&self, record: TemplateVersionRecord) -> StoreResult<CreateOutcome>;

    /// Apply `update` only if the record is currently in `expected`
    async fn transition_version(
        &self,
        template_id: &str,
        record_id: &str,
        expected: LifecycleStatus,
        update: &StatusUpdate,
    ) -> StoreResult<TransitionOutcome>;

    async fn get_template(&self, template_id: &str) -> StoreResult<Option<TemplatePointer>>;

    /// Upsert the template pointer
    async fn put_template(&self, pointer: &TemplatePointer) -> StoreResult<()>;
}
