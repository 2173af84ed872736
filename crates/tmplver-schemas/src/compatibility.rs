//! Compatibility validation between a proposed version and the latest published one
//!
//! The validator runs an ordered list of rules. Rules never fail as an
//! operation; they report `pass`, `fail`, `warn` or `info` results and the
//! caller decides what blocks.
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

use crate::diff::{diff_fields, SchemaDiff};
use crate::fields::FieldDescriptor;
use crate::versioning::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const RULE_FIRST_VERSION: &str = "first-version";
pub const RULE_VERSION_INCREMENT: &str = "version-increment";
pub const RULE_BREAKING_CHANGES: &str = "breaking-changes";
pub const RULE_PRERELEASE_VERSION: &str = "prerelease-version";
pub const RULE_MAJOR_WITHOUT_BREAKING: &str = "major-without-breaking";

/// Which rules run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Version increment and breaking-change rules only
    Basic,
    /// Basic rules plus advisory rules
    #[default]
    Strict,
}

/// Outcome of a single rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pass,
    Fail,
    Warn,
    Info,
}

/// Severity levels for validation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Pass => write!(f, "pass"),
            ValidationStatus::Fail => write!(f, "fail"),
            ValidationStatus::Warn => write!(f, "warn"),
            ValidationStatus::Info => write!(f, "info"),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Result of one validation rule. Returned to callers, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule: String,
    pub status: ValidationStatus,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    pub fn new(rule: &str, status: ValidationStatus, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            status,
            message: message.into(),
            severity,
            timestamp: Utc::now(),
        }
    }

    pub fn pass(rule: &str, message: impl Into<String>) -> Self {
        Self::new(rule, ValidationStatus::Pass, Severity::Info, message)
    }

    pub fn fail(rule: &str, message: impl Into<String>) -> Self {
        Self::new(rule, ValidationStatus::Fail, Severity::Error, message)
    }

    pub fn warn(rule: &str, message: impl Into<String>) -> Self {
        Self::new(rule, ValidationStatus::Warn, Severity::Warning, message)
    }

    pub fn info(rule: &str, message: impl Into<String>) -> Self {
        Self::new(rule, ValidationStatus::Info, Severity::Info, message)
    }

    pub fn is_failure(&self) -> bool {
        self.status == ValidationStatus::Fail
    }
}

/// True if any result is a `fail`
pub fn has_failures(results: &[ValidationResult]) -> bool {
    results.iter().any(ValidationResult::is_failure)
}

/// The latest published snapshot a proposal is checked against
#[derive(Debug, Clone, Copy)]
pub struct Baseline<'a> {
    pub version: &'a Version,
    pub fields: &'a [FieldDescriptor],
}

/// Everything a rule can look at
#[derive(Debug)]
pub struct RuleContext<'a> {
    pub baseline: Baseline<'a>,
    pub proposed_version: &'a Version,
    pub proposed_fields: &'a [FieldDescriptor],
    /// Diff from the baseline fields to the proposed fields
    pub diff: SchemaDiff,
}

/// A single compatibility rule
pub trait CompatibilityRule: Send + Sync {
    /// Rule tag reported in results
    fn name(&self) -> &'static str;

    /// Advisory rules only run in strict mode and never emit `fail`
    fn is_advisory(&self) -> bool {
        false
    }

    /// Evaluate the rule; `None` means nothing to report
    fn check(&self, context: &RuleContext<'_>) -> Option<ValidationResult>;
}

/// The proposal must sort strictly above the baseline
#[derive(Debug, Default)]
pub struct VersionIncrementRule;

impl CompatibilityRule for VersionIncrementRule {
    fn name(&self) -> &'static str {
        RULE_VERSION_INCREMENT
    }

    fn check(&self, context: &RuleContext<'_>) -> Option<ValidationResult> {
        let (proposed, current) = (context.proposed_version, context.baseline.version);
        Some(if proposed > current {
            ValidationResult::pass(
                self.name(),
                format!("Version {} is greater than current version {}", proposed, current),
            )
        } else {
            ValidationResult::fail(
                self.name(),
                format!("New version {} must be greater than current version {}", proposed, current),
            )
        })
    }
}

/// Breaking field changes require a major bump
#[derive(Debug, Default)]
pub struct BreakingChangesRule;

impl CompatibilityRule for BreakingChangesRule {
    fn name(&self) -> &'static str {
        RULE_BREAKING_CHANGES
    }

    fn check(&self, context: &RuleContext<'_>) -> Option<ValidationResult> {
        let breaking = &context.diff.breaking;
        if !breaking.is_empty() && context.proposed_version.major() == context.baseline.version.major() {
            return Some(ValidationResult::fail(
                self.name(),
                format!(
                    "Breaking changes detected but major version was not incremented (fields: {})",
                    breaking.join(", ")
                ),
            ));
        }
        Some(ValidationResult::pass(
            self.name(),
            if breaking.is_empty() {
                "No breaking changes detected".to_string()
            } else {
                format!("Breaking changes accompanied by a major version bump ({} field(s))", breaking.len())
            },
        ))
    }
}

/// Flags prerelease proposals
#[derive(Debug, Default)]
pub struct PrereleaseRule;

impl CompatibilityRule for PrereleaseRule {
    fn name(&self) -> &'static str {
        RULE_PRERELEASE_VERSION
    }

    fn is_advisory(&self) -> bool {
        true
    }

    fn check(&self, context: &RuleContext<'_>) -> Option<ValidationResult> {
        context.proposed_version.pre_release().map(|pre| {
            ValidationResult::info(
                self.name(),
                format!("Version {} is a prerelease ({}) and may be unstable", context.proposed_version, pre),
            )
        })
    }
}

/// Warns about a major bump with nothing breaking behind it
#[derive(Debug, Default)]
pub struct MajorWithoutBreakingRule;

impl CompatibilityRule for MajorWithoutBreakingRule {
    fn name(&self) -> &'static str {
        RULE_MAJOR_WITHOUT_BREAKING
    }

    fn is_advisory(&self) -> bool {
        true
    }

    fn check(&self, context: &RuleContext<'_>) -> Option<ValidationResult> {
        let bumped = context.proposed_version.major() > context.baseline.version.major();
        (bumped && context.diff.breaking.is_empty()).then(|| {
            ValidationResult::warn(
                self.name(),
                format!(
                    "Major version bumped from {} to {} without breaking field changes",
                    context.baseline.version.major(),
                    context.proposed_version.major()
                ),
            )
        })
    }
}

/// Ordered rule pipeline
pub struct CompatibilityValidator {
    mode: ValidationMode,
    rules: Vec<Box<dyn CompatibilityRule>>,
}

impl CompatibilityValidator {
    /// Create a validator with the built-in rules
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            rules: vec![
                Box::new(VersionIncrementRule),
                Box::new(BreakingChangesRule),
                Box::new(PrereleaseRule),
                Box::new(MajorWithoutBreakingRule),
            ],
        }
    }

    /// Append a custom rule after the built-in ones
    pub fn with_rule(mut self, rule: impl CompatibilityRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate a proposal against the latest published snapshot, if any.
    ///
    /// Without a baseline the result is a single `first-version` pass.
    pub fn validate(
        &self,
        baseline: Option<Baseline<'_>>,
        proposed_version: &Version,
        proposed_fields: &[FieldDescriptor],
    ) -> Vec<ValidationResult> {
        let Some(baseline) = baseline else {
            return vec![ValidationResult::pass(RULE_FIRST_VERSION, "First version of template")];
        };

        let context = RuleContext {
            baseline,
            proposed_version,
            proposed_fields,
            diff: diff_fields(baseline.fields, proposed_fields),
        };

        self.rules
            .iter()
            .filter(|rule| self.mode == ValidationMode::Strict || !rule.is_advisory())
            .filter_map(|rule| rule.check(&context))
            .collect()
    }
}

impl Default for CompatibilityValidator {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

impl fmt::Debug for CompatibilityValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("CompatibilityValidator")
            .field("mode", &self.mode)
            .field("rules", &names)
            .finish()
    }
}
