//! Version-to-version diffs for display

use crate::types::{ChangelogEntry, TemplateMetadata, TemplateVersionRecord, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use tmplver_schemas::{change_kind, diff_fields, ChangeKind, SchemaDiff};

/// Scalar metadata attribute that can differ between versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Name,
    Description,
    Category,
    BasePrice,
    Jurisdiction,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetadataField::Name => "name",
            MetadataField::Description => "description",
            MetadataField::Category => "category",
            MetadataField::BasePrice => "base_price",
            MetadataField::Jurisdiction => "jurisdiction",
        };
        f.write_str(name)
    }
}

/// Which two versions were compared and the magnitude of the step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionChange {
    pub from: Version,
    pub to: Version,
    pub kind: ChangeKind,
}

/// Everything that changed between two stored versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDiff {
    pub version_change: VersionChange,
    pub schema_changes: SchemaDiff,
    pub metadata_changes: Vec<MetadataField>,
    /// Changelog of the target version
    pub changelog: Vec<ChangelogEntry>,
    /// Breaking flag of the target version
    pub breaking: bool,
}

/// Result of comparing two stored versions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionComparison {
    pub from: TemplateVersionRecord,
    pub to: TemplateVersionRecord,
    pub diff: VersionDiff,
}

/// Metadata attributes whose values differ, in declaration order
pub fn metadata_changes(from: &TemplateMetadata, to: &TemplateMetadata) -> Vec<MetadataField> {
    let checks = [
        (MetadataField::Name, from.name != to.name),
        (MetadataField::Description, from.description != to.description),
        (MetadataField::Category, from.category != to.category),
        (MetadataField::BasePrice, from.base_price != to.base_price),
        (MetadataField::Jurisdiction, from.jurisdiction != to.jurisdiction),
    ];
    checks
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
}

/// Assemble the diff between two records of the same template
pub fn version_diff(from: &TemplateVersionRecord, to: &TemplateVersionRecord) -> VersionDiff {
    VersionDiff {
        version_change: VersionChange {
            from: from.version.clone(),
            to: to.version.clone(),
            kind: change_kind(&from.version, &to.version),
        },
        schema_changes: diff_fields(from.fields(), to.fields()),
        metadata_changes: metadata_changes(&from.snapshot.metadata, &to.snapshot.metadata),
        changelog: to.changelog.clone(),
        breaking: to.breaking,
    }
}
