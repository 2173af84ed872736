//! Version identifier parsing, formatting and ordering
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn version_regex() -> &'static Regex {
    VERSION_REGEX.get_or_init(|| {
        Regex::new(
            r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(?:-((?:0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*)(?:\.(?:0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*))*))?(?:\+([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$",
        )
        .expect("version pattern is a valid regex")
    })
}

/// A template version identifier: `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
///
/// Values are immutable once constructed. Build metadata is carried for
/// display but never participates in ordering or equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    pre_release: Option<String>,
    build_metadata: Option<String>,
    raw: String,
}

/// Rendering options for [`Version::format`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Prepend a `v`
    pub include_prefix: bool,
    /// Render `MAJOR.MINOR` only
    pub short: bool,
}

impl Version {
    /// Create a release version with no prerelease or build suffix
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self::from_parts(major, minor, patch, None, None)
    }

    /// Create a version with a prerelease suffix
    pub fn with_pre_release(major: u64, minor: u64, patch: u64, pre_release: impl Into<String>) -> Result<Self, VersionError> {
        let candidate = format!("{}.{}.{}-{}", major, minor, patch, pre_release.into());
        Self::parse(&candidate)
    }

    pub(crate) fn from_parts(
        major: u64,
        minor: u64,
        patch: u64,
        pre_release: Option<String>,
        build_metadata: Option<String>,
    ) -> Self {
        let mut raw = format!("{}.{}.{}", major, minor, patch);
        if let Some(ref pre) = pre_release {
            raw.push('-');
            raw.push_str(pre);
        }
        if let Some(ref build) = build_metadata {
            raw.push('+');
            raw.push_str(build);
        }
        Self {
            major,
            minor,
            patch,
            pre_release,
            build_metadata,
            raw,
        }
    }

    /// Parse a version string.
    ///
    /// No `v` prefix, whitespace, or leading zeros in the numeric core are
    /// accepted, so the input is always reproduced exactly by [`fmt::Display`].
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let captures = version_regex()
            .captures(input)
            .ok_or_else(|| VersionError::invalid(input, describe_mismatch(input)))?;

        let component = |index: usize, name: &'static str| -> Result<u64, VersionError> {
            captures[index]
                .parse::<u64>()
                .map_err(|_| VersionError::invalid(input, format!("{} component does not fit in 64 bits", name)))
        };

        Ok(Self {
            major: component(1, "major")?,
            minor: component(2, "minor")?,
            patch: component(3, "patch")?,
            pre_release: captures.get(4).map(|m| m.as_str().to_string()),
            build_metadata: captures.get(5).map(|m| m.as_str().to_string()),
            raw: input.to_string(),
        })
    }

    /// Non-throwing probe equivalent to `parse(input).is_ok()`
    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn pre_release(&self) -> Option<&str> {
        self.pre_release.as_deref()
    }

    pub fn build_metadata(&self) -> Option<&str> {
        self.build_metadata.as_deref()
    }

    /// The exact string this version was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Check if this is a prerelease version
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    /// A stable version carries no prerelease suffix
    pub fn is_stable(&self) -> bool {
        !self.is_pre_release()
    }

    /// Render the version for display. `short` takes precedence over the prefix.
    pub fn format(&self, options: FormatOptions) -> String {
        if options.short {
            return format!("{}.{}", self.major, self.minor);
        }
        let prefix = if options.include_prefix { "v" } else { "" };
        format!("{}{}", prefix, self.raw)
    }
}

/// Best-effort explanation of why `input` is not a version
fn describe_mismatch(input: &str) -> String {
    if input.is_empty() {
        return "empty version string".to_string();
    }
    let core = input
        .split(|c| c == '-' || c == '+')
        .next()
        .unwrap_or(input);
    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() != 3 {
        return format!("expected MAJOR.MINOR.PATCH, found {} core segment(s)", parts.len());
    }
    for (name, part) in ["major", "minor", "patch"].iter().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return format!("{} component '{}' is not a non-negative integer", name, part);
        }
        if part.len() > 1 && part.starts_with('0') {
            return format!("{} component '{}' has a leading zero", name, part);
        }
    }
    if let Some((_, rest)) = input.split_once('-') {
        let pre = rest.split('+').next().unwrap_or(rest);
        if let Some(part) = pre
            .split('.')
            .find(|p| p.len() > 1 && p.starts_with('0') && p.bytes().all(|b| b.is_ascii_digit()))
        {
            return format!("numeric prerelease identifier '{}' has a leading zero", part);
        }
    }
    "prerelease and build metadata must be dot-separated [0-9A-Za-z-] identifiers".to_string()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.raw
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                // A release outranks every prerelease of the same core
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_pre_release(a, b),
            })
    }
}

/// Compare two prerelease strings segment by segment.
///
/// Numeric segments compare by value and always sort below alphanumeric
/// ones; a missing segment sorts lowest.
fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_identifier(x, y) {
                Ordering::Equal => continue,
                ord => return ord,
            },
        }
    }
}

fn compare_identifier(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());
    match (numeric(a), numeric(b)) {
        (true, true) => {
            // Numeric identifiers carry no leading zeros, so length orders by
            // magnitude and long digit runs cannot overflow
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Version parsing and arithmetic errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version format: '{input}' ({reason})")]
    InvalidFormat { input: String, reason: String },

    #[error("Version overflow: incrementing the {component} component of '{input}' exceeds u64")]
    Overflow { input: String, component: &'static str },
}

impl VersionError {
    pub(crate) fn invalid(input: &str, reason: impl Into<String>) -> Self {
        VersionError::InvalidFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
