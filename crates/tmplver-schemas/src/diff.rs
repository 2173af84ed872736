//! Structural diff between two template field lists
//!
//! Fields are matched by `id`. The comparison is flat: a field is added,
//! removed, or modified in one or more of its attributes, and each change is
//! classified by how it affects callers that fill the template in.
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

use crate::fields::FieldDescriptor;
use crate::versioning::ChangeSet;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How a field changed between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldChangeType {
    Added,
    Removed,
    Modified,
}

/// A field attribute that can differ between snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAttribute {
    Kind,
    Required,
    Label,
    Placeholder,
    Tooltip,
    Options,
}

impl fmt::Display for FieldAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldAttribute::Kind => "kind",
            FieldAttribute::Required => "required",
            FieldAttribute::Label => "label",
            FieldAttribute::Placeholder => "placeholder",
            FieldAttribute::Tooltip => "tooltip",
            FieldAttribute::Options => "options",
        };
        f.write_str(name)
    }
}

/// Effect of a change on consumers of the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeImpact {
    /// Presentation only
    Cosmetic,
    /// New capability that existing inputs still satisfy
    Feature,
    /// Previously valid inputs may no longer be valid
    Breaking,
}

/// A single field-level change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field_id: String,
    pub change: FieldChangeType,
    /// Attributes that differ; empty for additions and removals
    pub attributes: Vec<FieldAttribute>,
    pub impact: ChangeImpact,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.change {
            FieldChangeType::Added if self.impact == ChangeImpact::Breaking => {
                write!(f, "added required field '{}'", self.field_id)
            }
            FieldChangeType::Added => write!(f, "added field '{}'", self.field_id),
            FieldChangeType::Removed => write!(f, "removed field '{}'", self.field_id),
            FieldChangeType::Modified => {
                let attributes: Vec<String> = self.attributes.iter().map(|a| a.to_string()).collect();
                write!(f, "changed {} of field '{}'", attributes.join(", "), self.field_id)
            }
        }
    }
}

/// Result of comparing two field lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    /// Subset of the ids above whose change can break existing inputs
    pub breaking: Vec<String>,
    /// Per-field detail behind the id lists
    pub changes: Vec<FieldChange>,
}

/// Change counts for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total_changes: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub breaking: usize,
}

impl SchemaDiff {
    /// Compare `from` to `to`
    pub fn between(from: &[FieldDescriptor], to: &[FieldDescriptor]) -> Self {
        diff_fields(from, to)
    }

    /// True when the two snapshots have identical fields
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn has_breaking_changes(&self) -> bool {
        !self.breaking.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            total_changes: self.added.len() + self.removed.len() + self.modified.len(),
            added: self.added.len(),
            removed: self.removed.len(),
            modified: self.modified.len(),
            breaking: self.breaking.len(),
        }
    }

    /// Changes with the given impact, in diff order
    pub fn changes_with_impact(&self, impact: ChangeImpact) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter().filter(move |c| c.impact == impact)
    }

    fn record(&mut self, change: FieldChange) {
        let id = change.field_id.clone();
        if change.impact == ChangeImpact::Breaking {
            self.breaking.push(id.clone());
        }
        match change.change {
            FieldChangeType::Added => self.added.push(id),
            FieldChangeType::Removed => self.removed.push(id),
            FieldChangeType::Modified => self.modified.push(id),
        }
        self.changes.push(change);
    }
}

impl ChangeSet {
    /// Derive change flags from a schema diff.
    ///
    /// Breaking changes set `breaking`, additions and option changes set
    /// `features`, presentation-only changes set `fixes`.
    pub fn from_diff(diff: &SchemaDiff) -> Self {
        Self {
            breaking: diff.has_breaking_changes(),
            features: diff.changes_with_impact(ChangeImpact::Feature).next().is_some(),
            fixes: diff.changes_with_impact(ChangeImpact::Cosmetic).next().is_some(),
        }
    }
}

/// Keep the first occurrence of each id, preserving order
fn index_fields(fields: &[FieldDescriptor]) -> (Vec<&FieldDescriptor>, HashMap<&str, &FieldDescriptor>) {
    let mut seen = HashSet::new();
    let mut ordered = Vec::with_capacity(fields.len());
    let mut by_id = HashMap::with_capacity(fields.len());
    for field in fields {
        if seen.insert(field.id.as_str()) {
            ordered.push(field);
            by_id.insert(field.id.as_str(), field);
        }
    }
    (ordered, by_id)
}

fn differing_attributes(from: &FieldDescriptor, to: &FieldDescriptor) -> Vec<FieldAttribute> {
    let mut attributes = Vec::new();
    if from.kind != to.kind {
        attributes.push(FieldAttribute::Kind);
    }
    if from.required != to.required {
        attributes.push(FieldAttribute::Required);
    }
    if from.options != to.options {
        attributes.push(FieldAttribute::Options);
    }
    if from.label != to.label {
        attributes.push(FieldAttribute::Label);
    }
    if from.placeholder != to.placeholder {
        attributes.push(FieldAttribute::Placeholder);
    }
    if from.tooltip != to.tooltip {
        attributes.push(FieldAttribute::Tooltip);
    }
    attributes
}

fn modification_impact(attributes: &[FieldAttribute]) -> ChangeImpact {
    attributes
        .iter()
        .map(|attribute| match attribute {
            FieldAttribute::Kind | FieldAttribute::Required => ChangeImpact::Breaking,
            FieldAttribute::Options => ChangeImpact::Feature,
            FieldAttribute::Label | FieldAttribute::Placeholder | FieldAttribute::Tooltip => {
                ChangeImpact::Cosmetic
            }
        })
        .max()
        .unwrap_or(ChangeImpact::Cosmetic)
}

/// Compare two field lists by id.
///
/// - present only in `to`: added, breaking when required
/// - present only in `from`: removed, always breaking
/// - present in both with differing attributes: modified, breaking when
///   `kind` or `required` differ
pub fn diff_fields(from: &[FieldDescriptor], to: &[FieldDescriptor]) -> SchemaDiff {
    let (from_fields, from_by_id) = index_fields(from);
    let (to_fields, to_by_id) = index_fields(to);
    let mut diff = SchemaDiff::default();

    for field in &to_fields {
        if !from_by_id.contains_key(field.id.as_str()) {
            diff.record(FieldChange {
                field_id: field.id.clone(),
                change: FieldChangeType::Added,
                attributes: Vec::new(),
                impact: if field.required {
                    ChangeImpact::Breaking
                } else {
                    ChangeImpact::Feature
                },
            });
        }
    }

    for field in &from_fields {
        if !to_by_id.contains_key(field.id.as_str()) {
            diff.record(FieldChange {
                field_id: field.id.clone(),
                change: FieldChangeType::Removed,
                attributes: Vec::new(),
                impact: ChangeImpact::Breaking,
            });
        }
    }

    for field in &to_fields {
        if let Some(previous) = from_by_id.get(field.id.as_str()) {
            let attributes = differing_attributes(previous, field);
            if !attributes.is_empty() {
                let impact = modification_impact(&attributes);
                diff.record(FieldChange {
                    field_id: field.id.clone(),
                    change: FieldChangeType::Modified,
                    attributes,
                    impact,
                });
            }
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKind;
    use pretty_assertions::assert_eq;

    fn text(id: &str, required: bool) -> FieldDescriptor {
        FieldDescriptor::new(id, FieldKind::Text, required)
    }

    #[test]
    fn test_identical_snapshots() {
        let fields = vec![text("q1", true), text("q2", false)];
        let diff = diff_fields(&fields, &fields);
        assert!(diff.is_empty());
        assert_eq!(diff.summary(), DiffSummary::default());
    }

    #[test]
    fn test_removed_field_is_breaking() {
        let from = vec![text("q1", true), text("q2", false)];
        let to = vec![text("q1", true)];
        let diff = diff_fields(&from, &to);
        assert_eq!(diff.removed, vec!["q2"]);
        assert_eq!(diff.breaking, vec!["q2"]);
        assert!(diff.added.is_empty());
        assert!(diff.modified.is_empty());
    }

    #[test]
    fn test_added_fields() {
        let from = vec![text("q1", true)];
        let to = vec![text("q1", true), text("notes", false), text("tax_id", true)];
        let diff = diff_fields(&from, &to);
        assert_eq!(diff.added, vec!["notes", "tax_id"]);
        assert_eq!(diff.breaking, vec!["tax_id"]);
    }

    #[test]
    fn test_kind_and_required_changes_are_breaking() {
        let from = vec![text("q1", true), text("q2", false), text("q3", true)];
        let to = vec![
            FieldDescriptor::required("q1", FieldKind::Number),
            text("q2", true),
            text("q3", true).with_label("Renamed"),
        ];
        let diff = diff_fields(&from, &to);
        assert_eq!(diff.modified, vec!["q1", "q2", "q3"]);
        assert_eq!(diff.breaking, vec!["q1", "q2"]);

        let q3 = diff.changes.iter().find(|c| c.field_id == "q3").unwrap();
        assert_eq!(q3.attributes, vec![FieldAttribute::Label]);
        assert_eq!(q3.impact, ChangeImpact::Cosmetic);
    }

    #[test]
    fn test_option_changes_are_features() {
        let from = vec![FieldDescriptor::optional("state", FieldKind::Select).with_options(["CA"])];
        let to = vec![FieldDescriptor::optional("state", FieldKind::Select).with_options(["CA", "NY"])];
        let diff = diff_fields(&from, &to);
        assert_eq!(diff.modified, vec!["state"]);
        assert!(diff.breaking.is_empty());
        assert_eq!(diff.changes[0].impact, ChangeImpact::Feature);
    }

    #[test]
    fn test_order_insensitive() {
        let from = vec![text("a", true), text("b", false)];
        let to = vec![text("b", false), text("a", true)];
        assert!(diff_fields(&from, &to).is_empty());
    }

    #[test]
    fn test_duplicate_ids_use_first_occurrence() {
        let from = vec![text("a", true), text("a", false)];
        let to = vec![text("a", true)];
        assert!(diff_fields(&from, &to).is_empty());
    }

    #[test]
    fn test_summary_and_change_set() {
        let from = vec![text("q1", true), text("q2", false)];
        let to = vec![text("q1", true).with_tooltip("help"), text("q3", false)];
        let diff = SchemaDiff::between(&from, &to);

        assert_eq!(
            diff.summary(),
            DiffSummary {
                total_changes: 3,
                added: 1,
                removed: 1,
                modified: 1,
                breaking: 1,
            }
        );
        assert_eq!(ChangeSet::from_diff(&diff), ChangeSet::new(true, true, true));
    }

    #[test]
    fn test_change_descriptions() {
        let from = vec![text("q1", true), text("q2", false)];
        let to = vec![FieldDescriptor::optional("q1", FieldKind::Date), text("q9", true)];
        let diff = diff_fields(&from, &to);
        let descriptions: Vec<String> = diff.changes.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            descriptions,
            vec![
                "added required field 'q9'",
                "removed field 'q2'",
                "changed kind, required of field 'q1'",
            ]
        );
    }
}
