//! Migration hints and guides between two template snapshots
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

use crate::diff::{diff_fields, ChangeImpact, FieldAttribute, FieldChange, FieldChangeType};
use crate::fields::FieldDescriptor;
use crate::versioning::Version;
use serde::{Deserialize, Serialize};

/// What a template consumer has to do about one field change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationHint {
    pub field_id: String,
    pub change: FieldChange,
    pub description: String,
    pub action_required: String,
}

impl MigrationHint {
    pub fn is_breaking(&self) -> bool {
        self.change.impact == ChangeImpact::Breaking
    }
}

fn describe_field(field: Option<&FieldDescriptor>) -> String {
    match field {
        Some(f) => format!(
            "{} {} field",
            if f.required { "required" } else { "optional" },
            f.kind
        ),
        None => "field".to_string(),
    }
}

fn hint_for(change: &FieldChange, before: Option<&FieldDescriptor>, after: Option<&FieldDescriptor>) -> MigrationHint {
    let id = &change.field_id;
    let (description, action_required) = match change.change {
        FieldChangeType::Added => (
            format!("Added {} '{}'", describe_field(after), id),
            if change.impact == ChangeImpact::Breaking {
                format!("Supply a value for '{}' in every submission", id)
            } else {
                "No action required - field is optional".to_string()
            },
        ),
        FieldChangeType::Removed => (
            format!("Removed {} '{}'", describe_field(before), id),
            format!("Stop supplying '{}'; stored answers for it are no longer used", id),
        ),
        FieldChangeType::Modified => {
            let mut actions = Vec::new();
            for attribute in &change.attributes {
                match (attribute, before, after) {
                    (FieldAttribute::Kind, Some(b), Some(a)) => {
                        actions.push(format!("Convert existing '{}' values from {} to {}", id, b.kind, a.kind));
                    }
                    (FieldAttribute::Required, _, Some(a)) if a.required => {
                        actions.push(format!("Supply a value for '{}', which is now required", id));
                    }
                    (FieldAttribute::Required, _, Some(_)) => {
                        actions.push(format!("Handle submissions that omit '{}', which is now optional", id));
                    }
                    (FieldAttribute::Options, _, _) => {
                        actions.push(format!("Check stored '{}' answers against the new option list", id));
                    }
                    _ => {}
                }
            }
            let attributes: Vec<String> = change.attributes.iter().map(|a| a.to_string()).collect();
            (
                format!("Changed {} of '{}'", attributes.join(", "), id),
                if actions.is_empty() {
                    "No action required - presentation only".to_string()
                } else {
                    actions.join("; ")
                },
            )
        }
    };

    MigrationHint {
        field_id: id.clone(),
        change: change.clone(),
        description,
        action_required,
    }
}

fn find_field<'a>(fields: &'a [FieldDescriptor], id: &str) -> Option<&'a FieldDescriptor> {
    fields.iter().find(|f| f.id == id)
}

/// Migration hints for moving from `from` to `to`, in diff order
pub fn migration_hints(from: &[FieldDescriptor], to: &[FieldDescriptor]) -> Vec<MigrationHint> {
    let diff = diff_fields(from, to);
    diff.changes
        .iter()
        .map(|change| {
            hint_for(
                change,
                find_field(from, &change.field_id),
                find_field(to, &change.field_id),
            )
        })
        .collect()
}

/// Render a markdown migration guide between two snapshots
pub fn migration_guide(
    from_version: &Version,
    to_version: &Version,
    from: &[FieldDescriptor],
    to: &[FieldDescriptor],
) -> String {
    let hints = migration_hints(from, to);
    let (breaking, non_breaking): (Vec<&MigrationHint>, Vec<&MigrationHint>) =
        hints.iter().partition(|h| h.is_breaking());

    let mut guide = format!("# Migration Guide: v{} to v{}\n\n", from_version, to_version);

    if breaking.is_empty() {
        guide.push_str("No breaking changes\n\n");
    } else {
        guide.push_str(&format!("{} breaking change(s)\n\n", breaking.len()));
        guide.push_str("## Breaking Changes\n\n");
        for hint in &breaking {
            guide.push_str(&format!("### {}\n", hint.field_id));
            guide.push_str(&format!("- **Change**: {}\n", hint.change));
            guide.push_str(&format!("- **Description**: {}\n", hint.description));
            guide.push_str(&format!("- **Action Required**: {}\n\n", hint.action_required));
        }
    }

    if !non_breaking.is_empty() {
        guide.push_str("## Non-Breaking Changes\n\n");
        for hint in &non_breaking {
            guide.push_str(&format!("### {}\n", hint.field_id));
            guide.push_str(&format!("- **Change**: {}\n", hint.change));
            guide.push_str(&format!("- **Description**: {}\n\n", hint.description));
        }
    }

    guide
}
