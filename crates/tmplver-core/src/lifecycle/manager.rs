//! The lifecycle manager

use super::diff::{version_diff, VersionComparison};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::store::{CreateOutcome, StatusUpdate, TransitionOutcome, VersionFilter, VersionStore};
use crate::types::{
    record_id, ChangelogEntry, CompatibilityInfo, DocumentSnapshot, FieldDescriptor, LifecycleStatus,
    TemplatePointer, TemplateVersionRecord, Version,
};
use chrono::Utc;
use std::sync::Arc;
use tmplver_schemas::{
    diff_fields, has_failures, suggest_next, Baseline, ChangeSet, CompatibilityValidator, ValidationResult,
};
use tracing::{debug, info, instrument, warn};

/// Input for [`TemplateVersionManager::create_version`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewVersion {
    pub template_id: String,
    /// Unparsed version string
    pub version: String,
    pub snapshot: DocumentSnapshot,
    pub changelog: Vec<ChangelogEntry>,
    pub created_by: String,
    /// Explicit breaking flag. When absent it is derived from a diff against
    /// the latest published snapshot.
    pub breaking: Option<bool>,
    /// Explicit compatibility statement, otherwise derived from `breaking`
    pub compatibility: Option<CompatibilityInfo>,
}

impl NewVersion {
    pub fn new(
        template_id: impl Into<String>,
        version: impl Into<String>,
        snapshot: DocumentSnapshot,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            version: version.into(),
            snapshot,
            changelog: Vec::new(),
            created_by: created_by.into(),
            breaking: None,
            compatibility: None,
        }
    }

    pub fn with_changelog(mut self, changelog: Vec<ChangelogEntry>) -> Self {
        self.changelog = changelog;
        self
    }

    pub fn with_breaking(mut self, breaking: bool) -> Self {
        self.breaking = Some(breaking);
        self
    }

    pub fn with_compatibility(mut self, compatibility: CompatibilityInfo) -> Self {
        self.compatibility = Some(compatibility);
        self
    }
}

/// Filters for [`TemplateVersionManager::get_versions`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionQuery {
    pub statuses: Option<Vec<LifecycleStatus>>,
    /// Maximum number of records, applied after filtering
    pub limit: Option<usize>,
    pub stable_only: bool,
}

impl VersionQuery {
    pub fn with_statuses(mut self, statuses: impl Into<Vec<LifecycleStatus>>) -> Self {
        self.statuses = Some(statuses.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn stable_only(mut self) -> Self {
        self.stable_only = true;
        self
    }
}

/// Orchestrates version records for a catalog of templates
pub struct TemplateVersionManager<S: VersionStore> {
    store: Arc<S>,
    config: EngineConfig,
    validator: CompatibilityValidator,
}

impl<S: VersionStore> TemplateVersionManager<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let validator = CompatibilityValidator::new(config.validation.mode);
        Self {
            store,
            config,
            validator,
        }
    }

    /// Replace the compatibility validator, e.g. to add custom rules
    pub fn with_validator(mut self, validator: CompatibilityValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a draft version.
    ///
    /// The version string is checked before the store is touched. The
    /// insert is a single create-if-absent, so of two concurrent creations
    /// of the same version exactly one succeeds.
    ///
    /// The pointer is rebuilt after the record is written. If that rebuild
    /// fails the error is returned, but the draft stays persisted; a later
    /// [`refresh_current_version`](Self::refresh_current_version) repairs the
    /// pointer, and retrying the create reports `VersionAlreadyExists`.
    #[instrument(skip(self, request), fields(template_id = %request.template_id, version = %request.version))]
    pub async fn create_version(&self, request: NewVersion) -> Result<TemplateVersionRecord> {
        let version = Version::parse(&request.version)?;
        let template_id = request.template_id;

        let breaking = match request.breaking {
            Some(breaking) => breaking,
            None => self
                .get_latest_version(&template_id, false)
                .await?
                .map_or(false, |latest| {
                    diff_fields(latest.fields(), &request.snapshot.fields).has_breaking_changes()
                }),
        };

        let record = TemplateVersionRecord {
            id: record_id(&template_id, &version),
            template_id: template_id.clone(),
            version,
            status: LifecycleStatus::Draft,
            snapshot: request.snapshot,
            changelog: request.changelog,
            breaking,
            compatibility: request
                .compatibility
                .unwrap_or_else(|| CompatibilityInfo::from_breaking(breaking)),
            created_by: request.created_by,
            created_at: Utc::now(),
            approved_by: None,
            approved_at: None,
            deprecation_reason: None,
            deprecated_at: None,
            archived_at: None,
        };

        match self.store.create_version(record.clone()).await? {
            CreateOutcome::Created => {}
            CreateOutcome::AlreadyExists => {
                return Err(Error::VersionAlreadyExists {
                    template_id,
                    version: record.version.to_string(),
                });
            }
        }
        info!(record_id = %record.id, breaking, "Created draft version");

        self.refresh_current_version(&template_id).await?;
        Ok(record)
    }

    /// Fetch one version of a template
    #[instrument(skip(self))]
    pub async fn get_version(&self, template_id: &str, version: &str) -> Result<Option<TemplateVersionRecord>> {
        let version = Version::parse(version)?;
        self.fetch(template_id, &version).await
    }

    /// List versions newest first. Filters apply before the limit.
    #[instrument(skip(self))]
    pub async fn get_versions(&self, template_id: &str, query: &VersionQuery) -> Result<Vec<TemplateVersionRecord>> {
        let filter = VersionFilter {
            statuses: query.statuses.clone(),
            stable_only: query.stable_only,
        };
        let mut records = self.store.list_versions(template_id, &filter).await?;
        records.sort_by(|a, b| b.version.cmp(&a.version));

        if let Some(limit) = query.limit.or(self.config.versions.default_list_limit) {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Highest published version, read fresh from the store
    #[instrument(skip(self))]
    pub async fn get_latest_version(&self, template_id: &str, stable_only: bool) -> Result<Option<TemplateVersionRecord>> {
        let published = self
            .store
            .list_versions(template_id, &VersionFilter::published().stable(stable_only))
            .await?;
        Ok(published.into_iter().max_by(|a, b| a.version.cmp(&b.version)))
    }

    /// Move a draft to published.
    ///
    /// The draft is validated against the latest published version first.
    /// With `enforce_on_publish` any failure blocks the transition.
    ///
    /// An error from the pointer rebuild that follows the transition does not
    /// undo it: the record is already published, and
    /// [`refresh_current_version`](Self::refresh_current_version) repairs the
    /// pointer.
    #[instrument(skip(self))]
    pub async fn publish_version(
        &self,
        template_id: &str,
        version: &str,
        published_by: &str,
    ) -> Result<TemplateVersionRecord> {
        let version = Version::parse(version)?;
        let record = self
            .fetch(template_id, &version)
            .await?
            .ok_or_else(|| Error::not_found(template_id, &version))?;
        if record.status != LifecycleStatus::Draft {
            return Err(invalid_transition(&record, record.status, LifecycleStatus::Published));
        }

        let results = self.validate_compatibility(template_id, &record.version, record.fields()).await?;
        if self.config.validation.enforce_on_publish && has_failures(&results) {
            let failures: Vec<String> = results
                .iter()
                .filter(|r| r.is_failure())
                .map(|r| format!("{}: {}", r.rule, r.message))
                .collect();
            warn!(failures = ?failures, "Publication blocked by validation");
            return Err(Error::PublishBlocked {
                template_id: template_id.to_string(),
                version: record.version.to_string(),
                failures,
            });
        }

        let now = Utc::now();
        let mut update = StatusUpdate::new(LifecycleStatus::Published);
        update.approved_by = Some(published_by.to_string());
        update.approved_at = Some(now);

        let published = self.apply_transition(&record, update).await?;
        info!(record_id = %published.id, "Published version");

        self.refresh_current_version(template_id).await?;
        Ok(published)
    }

    /// Move a published version to deprecated.
    ///
    /// The current-version pointer is left alone; readers of the latest
    /// version skip deprecated records anyway.
    #[instrument(skip(self))]
    pub async fn deprecate_version(
        &self,
        template_id: &str,
        version: &str,
        reason: Option<&str>,
    ) -> Result<TemplateVersionRecord> {
        let version = Version::parse(version)?;
        let mut update = StatusUpdate::new(LifecycleStatus::Deprecated);
        update.deprecation_reason = reason.map(str::to_string);
        update.deprecated_at = Some(Utc::now());

        let deprecated = self.transition(template_id, &version, update).await?;
        info!(record_id = %deprecated.id, "Deprecated version");
        Ok(deprecated)
    }

    /// Move a published or deprecated version to archived
    #[instrument(skip(self))]
    pub async fn archive_version(&self, template_id: &str, version: &str) -> Result<TemplateVersionRecord> {
        let version = Version::parse(version)?;
        let mut update = StatusUpdate::new(LifecycleStatus::Archived);
        update.archived_at = Some(Utc::now());

        let archived = self.transition(template_id, &version, update).await?;
        info!(record_id = %archived.id, "Archived version");
        Ok(archived)
    }

    /// Rebuild the template pointer from the published records and store it
    #[instrument(skip(self))]
    pub async fn refresh_current_version(&self, template_id: &str) -> Result<TemplatePointer> {
        let published = self.store.list_versions(template_id, &VersionFilter::published()).await?;
        let mut known_versions: Vec<Version> = published.into_iter().map(|r| r.version).collect();
        known_versions.sort();

        let current_version = known_versions.last().cloned();
        let pointer = TemplatePointer {
            template_id: template_id.to_string(),
            latest_version_record_id: current_version.as_ref().map(|v| record_id(template_id, v)),
            current_version,
            known_versions,
            last_updated: Utc::now(),
        };
        self.store.put_template(&pointer).await?;

        debug!(
            current_version = ?pointer.current_version.as_ref().map(|v| v.to_string()),
            known = pointer.known_versions.len(),
            "Recomputed current version"
        );
        Ok(pointer)
    }

    /// The cached template pointer, if one was ever written
    #[instrument(skip(self))]
    pub async fn get_template(&self, template_id: &str) -> Result<Option<TemplatePointer>> {
        Ok(self.store.get_template(template_id).await?)
    }

    /// Fetch two versions and diff them
    #[instrument(skip(self))]
    pub async fn compare_versions(&self, template_id: &str, from: &str, to: &str) -> Result<VersionComparison> {
        let (from, to) = self.fetch_pair(template_id, from, to).await?;
        let diff = version_diff(&from, &to);
        Ok(VersionComparison { from, to, diff })
    }

    /// Suggest the version after the latest published one.
    ///
    /// Falls back to the configured initial version when nothing is published.
    #[instrument(skip(self))]
    pub async fn suggest_next_version(&self, template_id: &str, changes: ChangeSet) -> Result<Version> {
        match self.get_latest_version(template_id, false).await? {
            Some(latest) => Ok(suggest_next(&latest.version, changes)?),
            None => self.config.versions.initial_version(),
        }
    }

    /// Suggest the next version for a proposed field list
    #[instrument(skip(self, fields))]
    pub async fn suggest_next_version_for(&self, template_id: &str, fields: &[FieldDescriptor]) -> Result<Version> {
        match self.get_latest_version(template_id, false).await? {
            Some(latest) => {
                let changes = ChangeSet::from_diff(&diff_fields(latest.fields(), fields));
                Ok(suggest_next(&latest.version, changes)?)
            }
            None => self.config.versions.initial_version(),
        }
    }

    /// Validate a proposal against the latest published version.
    ///
    /// Validation itself never fails; only store errors are returned.
    #[instrument(skip(self, proposed_fields), fields(proposed = %proposed_version))]
    pub async fn validate_compatibility(
        &self,
        template_id: &str,
        proposed_version: &Version,
        proposed_fields: &[FieldDescriptor],
    ) -> Result<Vec<ValidationResult>> {
        let latest = self.get_latest_version(template_id, false).await?;
        let baseline = latest.as_ref().map(|record| Baseline {
            version: &record.version,
            fields: record.fields(),
        });
        let results = self.validator.validate(baseline, proposed_version, proposed_fields);
        debug!(results = results.len(), failures = has_failures(&results), "Validated proposal");
        Ok(results)
    }

    /// Markdown migration guide between two stored versions
    #[instrument(skip(self))]
    pub async fn migration_guide(&self, template_id: &str, from: &str, to: &str) -> Result<String> {
        let (from, to) = self.fetch_pair(template_id, from, to).await?;
        Ok(tmplver_schemas::migration_guide(
            &from.version,
            &to.version,
            from.fields(),
            to.fields(),
        ))
    }

    async fn fetch(&self, template_id: &str, version: &Version) -> Result<Option<TemplateVersionRecord>> {
        Ok(self.store.get_version(template_id, &record_id(template_id, version)).await?)
    }

    /// Parse both versions, then fetch them concurrently
    async fn fetch_pair(
        &self,
        template_id: &str,
        from: &str,
        to: &str,
    ) -> Result<(TemplateVersionRecord, TemplateVersionRecord)> {
        let from = Version::parse(from)?;
        let to = Version::parse(to)?;
        let (from_record, to_record) = tokio::join!(self.fetch(template_id, &from), self.fetch(template_id, &to));
        let from_record = from_record?.ok_or_else(|| Error::not_found(template_id, &from))?;
        let to_record = to_record?.ok_or_else(|| Error::not_found(template_id, &to))?;
        Ok((from_record, to_record))
    }

    async fn transition(&self, template_id: &str, version: &Version, update: StatusUpdate) -> Result<TemplateVersionRecord> {
        let record = self
            .fetch(template_id, version)
            .await?
            .ok_or_else(|| Error::not_found(template_id, version))?;
        self.apply_transition(&record, update).await
    }

    /// Conditional write from the status `record` was read in
    async fn apply_transition(&self, record: &TemplateVersionRecord, update: StatusUpdate) -> Result<TemplateVersionRecord> {
        let to = update.status;
        if !record.status.can_transition_to(to) {
            return Err(invalid_transition(record, record.status, to));
        }
        match self
            .store
            .transition_version(&record.template_id, &record.id, record.status, &update)
            .await?
        {
            TransitionOutcome::Applied(updated) => Ok(*updated),
            TransitionOutcome::Missing => Err(Error::not_found(&record.template_id, &record.version)),
            TransitionOutcome::StatusMismatch(actual) => Err(invalid_transition(record, actual, to)),
        }
    }
}

fn invalid_transition(record: &TemplateVersionRecord, from: LifecycleStatus, to: LifecycleStatus) -> Error {
    Error::InvalidTransition {
        template_id: record.template_id.clone(),
        version: record.version.to_string(),
        from,
        to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::FieldKind;
    use tmplver_schemas::{ValidationMode, ValidationStatus};

    fn manager() -> TemplateVersionManager<MemoryStore> {
        TemplateVersionManager::new(Arc::new(MemoryStore::new()), EngineConfig::default())
    }

    fn snapshot(fields: Vec<FieldDescriptor>) -> DocumentSnapshot {
        DocumentSnapshot::new(fields)
    }

    async fn publish(manager: &TemplateVersionManager<MemoryStore>, version: &str, fields: Vec<FieldDescriptor>) {
        manager
            .create_version(NewVersion::new("nda", version, snapshot(fields), "author"))
            .await
            .unwrap();
        manager.publish_version("nda", version, "reviewer").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_version_rejected_before_store() {
        let manager = manager();
        let err = manager
            .create_version(NewVersion::new("nda", "1.0", DocumentSnapshot::default(), "author"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidVersionFormat(_)));
        assert_eq!(manager.store().version_count("nda").await, 0);
        assert!(manager.get_template("nda").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_breaking_flag_derived_from_latest_published() {
        let manager = manager();
        publish(&manager, "1.0.0", vec![FieldDescriptor::required("q1", FieldKind::Text)]).await;

        let record = manager
            .create_version(NewVersion::new(
                "nda",
                "2.0.0",
                snapshot(vec![FieldDescriptor::required("q1", FieldKind::Number)]),
                "author",
            ))
            .await
            .unwrap();
        assert!(record.breaking);
        assert!(!record.compatibility.backward_compatible);
        assert!(record.compatibility.migration_required);

        let record = manager
            .create_version(
                NewVersion::new("nda", "2.1.0", snapshot(Vec::new()), "author").with_breaking(false),
            )
            .await
            .unwrap();
        assert!(!record.breaking);
    }

    #[tokio::test]
    async fn test_basic_mode_skips_advisory_rules() {
        let mut config = EngineConfig::default();
        config.validation.mode = ValidationMode::Basic;
        let manager = TemplateVersionManager::new(Arc::new(MemoryStore::new()), config);
        publish(&manager, "1.0.0", vec![FieldDescriptor::optional("q1", FieldKind::Text)]).await;

        let proposed = Version::parse("2.0.0-rc.1").unwrap();
        let results = manager
            .validate_compatibility("nda", &proposed, &[FieldDescriptor::optional("q1", FieldKind::Text)])
            .await
            .unwrap();
        assert!(results.iter().all(|r| r.status == ValidationStatus::Pass));
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_publish_not_enforced_allows_failures() {
        let mut config = EngineConfig::default();
        config.validation.enforce_on_publish = false;
        let manager = TemplateVersionManager::new(Arc::new(MemoryStore::new()), config);
        publish(&manager, "1.0.0", vec![FieldDescriptor::required("q1", FieldKind::Text)]).await;

        manager
            .create_version(NewVersion::new("nda", "1.1.0", snapshot(Vec::new()), "author"))
            .await
            .unwrap();
        let published = manager.publish_version("nda", "1.1.0", "reviewer").await.unwrap();
        assert_eq!(published.status, LifecycleStatus::Published);
    }

    #[tokio::test]
    async fn test_get_versions_default_limit() {
        let mut config = EngineConfig::default();
        config.versions.default_list_limit = Some(2);
        let manager = TemplateVersionManager::new(Arc::new(MemoryStore::new()), config);
        for version in ["1.0.0", "1.2.0", "1.1.0"] {
            manager
                .create_version(NewVersion::new("nda", version, DocumentSnapshot::default(), "author"))
                .await
                .unwrap();
        }

        let listed = manager.get_versions("nda", &VersionQuery::default()).await.unwrap();
        let versions: Vec<String> = listed.iter().map(|r| r.version.to_string()).collect();
        assert_eq!(versions, vec!["1.2.0", "1.1.0"]);

        let listed = manager
            .get_versions("nda", &VersionQuery::default().with_limit(10))
            .await
            .unwrap();
        assert_eq!(listed.len(), 3);
    }
}
