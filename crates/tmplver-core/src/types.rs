//! Core data types for template version records
//!
//! Records are serde-serialisable so store backends can persist them as
//! documents. Content fields are frozen after creation; only the lifecycle
//! status and its metadata change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use tmplver_schemas::{ChangelogEntry, ChangelogKind, FieldDescriptor, FieldKind, Version};

/// Position of a version record in its one-way lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Draft,
    Published,
    Deprecated,
    Archived,
}

impl LifecycleStatus {
    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(self, next: LifecycleStatus) -> bool {
        use LifecycleStatus::*;
        matches!(
            (self, next),
            (Draft, Published) | (Published, Deprecated) | (Published, Archived) | (Deprecated, Archived)
        )
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleStatus::Draft => write!(f, "draft"),
            LifecycleStatus::Published => write!(f, "published"),
            LifecycleStatus::Deprecated => write!(f, "deprecated"),
            LifecycleStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Scalar template metadata compared by the version diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMetadata {
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    /// Price in minor currency units
    pub base_price: Option<i64>,
    pub jurisdiction: Option<String>,
}

/// The document content a version freezes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub metadata: TemplateMetadata,
    pub fields: Vec<FieldDescriptor>,
}

impl DocumentSnapshot {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            metadata: TemplateMetadata::default(),
            fields,
        }
    }

    pub fn with_metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Compatibility statement attached to a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityInfo {
    pub backward_compatible: bool,
    pub forward_compatible: bool,
    pub migration_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_guide: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deprecated_features: Vec<String>,
}

impl CompatibilityInfo {
    /// Default statement derived from the breaking flag
    pub fn from_breaking(breaking: bool) -> Self {
        Self {
            backward_compatible: !breaking,
            forward_compatible: false,
            migration_required: breaking,
            migration_guide: None,
            deprecated_features: Vec::new(),
        }
    }
}

/// A stored version of one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVersionRecord {
    pub id: String,
    pub template_id: String,
    pub version: Version,
    pub status: LifecycleStatus,
    pub snapshot: DocumentSnapshot,
    pub changelog: Vec<ChangelogEntry>,
    pub breaking: bool,
    pub compatibility: CompatibilityInfo,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub deprecation_reason: Option<String>,
    pub deprecated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl TemplateVersionRecord {
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.snapshot.fields
    }
}

/// Record id for a version of a template.
///
/// Build metadata is left out so that versions which compare equal share
/// one id.
pub fn record_id(template_id: &str, version: &Version) -> String {
    let mut id = format!(
        "{}-v{}.{}.{}",
        template_id,
        version.major(),
        version.minor(),
        version.patch()
    );
    if let Some(pre) = version.pre_release() {
        id.push('-');
        id.push_str(pre);
    }
    id
}

/// Cached per-template pointer to the current published version.
///
/// Always recomputable from the published records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePointer {
    pub template_id: String,
    /// Published versions, ascending
    pub known_versions: Vec<Version>,
    pub current_version: Option<Version>,
    pub latest_version_record_id: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transitions() {
        use LifecycleStatus::*;
        assert!(Draft.can_transition_to(Published));
        assert!(Published.can_transition_to(Deprecated));
        assert!(Published.can_transition_to(Archived));
        assert!(Deprecated.can_transition_to(Archived));

        assert!(!Draft.can_transition_to(Archived));
        assert!(!Draft.can_transition_to(Deprecated));
        assert!(!Published.can_transition_to(Draft));
        assert!(!Deprecated.can_transition_to(Published));
        assert!(!Archived.can_transition_to(Deprecated));
        assert!(!Published.can_transition_to(Published));
    }

    #[test]
    fn test_record_id_ignores_build_metadata() {
        let v = Version::parse("1.2.0-rc.1+sha.5114f85").unwrap();
        assert_eq!(record_id("lease", &v), "lease-v1.2.0-rc.1");
        assert_eq!(record_id("lease", &Version::new(2, 0, 0)), "lease-v2.0.0");
    }

    #[test]
    fn test_compatibility_from_breaking() {
        let info = CompatibilityInfo::from_breaking(true);
        assert!(!info.backward_compatible);
        assert!(info.migration_required);
        assert!(!info.forward_compatible);
    }

    #[test]
    fn test_snapshot_deserializes_without_metadata() {
        let snapshot: DocumentSnapshot = serde_json::from_value(json!({
            "fields": [{"id": "q1", "kind": "text", "required": true}]
        }))
        .unwrap();
        assert_eq!(snapshot.metadata, TemplateMetadata::default());
        assert_eq!(snapshot.fields.len(), 1);
    }
}
