//! Tmplver Schemas - version identifiers and schema compatibility for document templates
//!
//! This crate is pure and synchronous. It provides:
//! - **Version identifiers**: `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` parsing,
//!   formatting, a total order, range predicates and increments
//! - **Field schemas**: the `FieldDescriptor` unit a template snapshot is made of
//! - **Schema diffing**: added/removed/modified fields and the breaking subset
//! - **Compatibility rules**: a validation pipeline that checks a proposed
//!   version against the latest published one
//! - **Changelogs and migration guides** drafted from a diff
//!
//! ## Quick Start
//!
//! ```rust
//! use tmplver_schemas::{CompatibilityValidator, Baseline, FieldDescriptor, FieldKind, Version};
//!
//! let published = Version::parse("1.0.0").unwrap();
//! let before = vec![FieldDescriptor::required("q1", FieldKind::Text)];
//! let after = vec![FieldDescriptor::required("q1", FieldKind::Number)];
//!
//! let validator = CompatibilityValidator::default();
//! let baseline = Baseline { version: &published, fields: &before };
//! let results = validator.validate(Some(baseline), &Version::parse("1.1.0").unwrap(), &after);
//!
//! // Changing a field's kind is breaking and needs a major bump
//! assert!(tmplver_schemas::has_failures(&results));
//! ```
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

pub mod changelog;
pub mod compatibility;
pub mod diff;
pub mod fields;
pub mod migration;
pub mod versioning;

mod prop_tests;
#[cfg(test)]
mod proptest_strategies;

// Re-export commonly used types for convenience
pub use changelog::{changelog_from_diff, ChangelogEntry, ChangelogKind};
pub use compatibility::{
    has_failures, Baseline, CompatibilityRule, CompatibilityValidator, RuleContext, Severity,
    ValidationMode, ValidationResult, ValidationStatus,
};
pub use diff::{diff_fields, ChangeImpact, DiffSummary, FieldAttribute, FieldChange, FieldChangeType, SchemaDiff};
pub use fields::{FieldDescriptor, FieldKind};
pub use migration::{migration_guide, migration_hints, MigrationHint};
pub use versioning::{
    are_compatible, change_kind, compare, increment, latest, satisfies_range, sort, suggest_next,
    ChangeKind, ChangeSet, FormatOptions, IncrementKind, Version, VersionError, VersionRange,
};
