//! In-memory store backed by tokio read-write locks

use super::{CreateOutcome, StatusUpdate, StoreResult, TransitionOutcome, VersionFilter, VersionStore};
use crate::types::{LifecycleStatus, TemplatePointer, TemplateVersionRecord};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Store keeping every record in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// template id -> record id -> record
    versions: RwLock<HashMap<String, BTreeMap<String, TemplateVersionRecord>>>,
    templates: RwLock<HashMap<String, TemplatePointer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored for a template
    pub async fn version_count(&self, template_id: &str) -> usize {
        self.versions
            .read()
            .await
            .get(template_id)
            .map_or(0, |records| records.len())
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn get_version(&self, template_id: &str, record_id: &str) -> StoreResult<Option<TemplateVersionRecord>> {
        let versions = self.versions.read().await;
        Ok(versions
            .get(template_id)
            .and_then(|records| records.get(record_id))
            .cloned())
    }

    async fn list_versions(&self, template_id: &str, filter: &VersionFilter) -> StoreResult<Vec<TemplateVersionRecord>> {
        let versions = self.versions.read().await;
        Ok(versions
            .get(template_id)
            .map(|records| records.values().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn create_version(&self, record: TemplateVersionRecord) -> StoreResult<CreateOutcome> {
        let mut versions = self.versions.write().await;
        let records = versions.entry(record.template_id.clone()).or_default();
        if records.contains_key(&record.id) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        records.insert(record.id.clone(), record);
        Ok(CreateOutcome::Created)
    }

    async fn transition_version(
        &self,
        template_id: &str,
        record_id: &str,
        expected: LifecycleStatus,
        update: &StatusUpdate,
    ) -> StoreResult<TransitionOutcome> {
        let mut versions = self.versions.write().await;
        let Some(record) = versions.get_mut(template_id).and_then(|records| records.get_mut(record_id)) else {
            return Ok(TransitionOutcome::Missing);
        };
        if record.status != expected {
            return Ok(TransitionOutcome::StatusMismatch(record.status));
        }
        update.apply(record);
        Ok(TransitionOutcome::Applied(Box::new(record.clone())))
    }

    async fn get_template(&self, template_id: &str) -> StoreResult<Option<TemplatePointer>> {
        Ok(self.templates.read().await.get(template_id).cloned())
    }

    async fn put_template(&self, pointer: &TemplatePointer) -> StoreResult<()> {
        self.templates
            .write()
            .await
            .insert(pointer.template_id.clone(), pointer.clone());
        Ok(())
    }
}
