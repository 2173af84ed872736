//! Changelog entries and changelog drafting from schema diffs
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

use crate::diff::{ChangeImpact, FieldChange, SchemaDiff};
use crate::versioning::ChangeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a changelog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangelogKind {
    Added,
    Removed,
    Changed,
    Fixed,
    Deprecated,
    Security,
}

impl fmt::Display for ChangelogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangelogKind::Added => "added",
            ChangelogKind::Removed => "removed",
            ChangelogKind::Changed => "changed",
            ChangelogKind::Fixed => "fixed",
            ChangelogKind::Deprecated => "deprecated",
            ChangelogKind::Security => "security",
        };
        f.write_str(name)
    }
}

/// A human-authored note on what changed in a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub kind: ChangelogKind,
    pub description: String,
    /// Declared impact tier
    pub impact: ChangeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_fields: Vec<String>,
}

impl ChangelogEntry {
    pub fn new(kind: ChangelogKind, description: impl Into<String>, impact: ChangeKind) -> Self {
        Self {
            kind,
            description: description.into(),
            impact,
            affected_fields: Vec::new(),
        }
    }

    pub fn with_affected_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

fn grouped_entry(
    changes: &[&FieldChange],
    kind: ChangelogKind,
    heading: &str,
    impact: ChangeKind,
) -> Option<ChangelogEntry> {
    if changes.is_empty() {
        return None;
    }
    let descriptions: Vec<String> = changes.iter().map(|c| c.to_string()).collect();
    Some(
        ChangelogEntry::new(kind, format!("{}: {}", heading, descriptions.join(", ")), impact)
            .with_affected_fields(changes.iter().map(|c| c.field_id.clone())),
    )
}

/// Draft changelog entries for a diff: one per impact tier that has changes
pub fn changelog_from_diff(diff: &SchemaDiff) -> Vec<ChangelogEntry> {
    let breaking: Vec<&FieldChange> = diff.changes_with_impact(ChangeImpact::Breaking).collect();
    let features: Vec<&FieldChange> = diff.changes_with_impact(ChangeImpact::Feature).collect();
    let cosmetic: Vec<&FieldChange> = diff.changes_with_impact(ChangeImpact::Cosmetic).collect();

    [
        grouped_entry(&breaking, ChangelogKind::Changed, "Breaking changes", ChangeKind::Major),
        grouped_entry(&features, ChangelogKind::Added, "New features", ChangeKind::Minor),
        grouped_entry(&cosmetic, ChangelogKind::Fixed, "Fixes", ChangeKind::Patch),
    ]
    .into_iter()
    .flatten()
    .collect()
}
