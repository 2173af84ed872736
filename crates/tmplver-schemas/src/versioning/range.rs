//! Version range predicates
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

use crate::versioning::version::{Version, VersionError};
use std::fmt;

/// Version range specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// Any version (`*`)
    Any,
    /// Exact version match, ignoring build metadata
    Exact(Version),
    /// `>=X`
    GreaterOrEqual(Version),
    /// `>X`
    GreaterThan(Version),
    /// `<=X`
    LessOrEqual(Version),
    /// `<X`
    LessThan(Version),
    /// `~X`: at least X, below the next minor
    Tilde(Version),
    /// `^X`: at least X, below the next major
    Caret(Version),
}

impl VersionRange {
    /// Parse a version range string.
    ///
    /// An unrecognised operator is not an error in itself: the whole string is
    /// then parsed as an exact version, which fails for anything malformed.
    pub fn parse(range_str: &str) -> Result<Self, VersionError> {
        let range_str = range_str.trim();

        if range_str == "*" {
            return Ok(VersionRange::Any);
        }

        // Two-character operators must be tried before their one-character prefixes
        if let Some(rest) = range_str.strip_prefix(">=") {
            return Ok(VersionRange::GreaterOrEqual(Version::parse(rest.trim())?));
        }
        if let Some(rest) = range_str.strip_prefix("<=") {
            return Ok(VersionRange::LessOrEqual(Version::parse(rest.trim())?));
        }
        if let Some(rest) = range_str.strip_prefix('>') {
            return Ok(VersionRange::GreaterThan(Version::parse(rest.trim())?));
        }
        if let Some(rest) = range_str.strip_prefix('<') {
            return Ok(VersionRange::LessThan(Version::parse(rest.trim())?));
        }
        if let Some(rest) = range_str.strip_prefix('~') {
            return Ok(VersionRange::Tilde(Version::parse(rest.trim())?));
        }
        if let Some(rest) = range_str.strip_prefix('^') {
            return Ok(VersionRange::Caret(Version::parse(rest.trim())?));
        }

        Ok(VersionRange::Exact(Version::parse(range_str)?))
    }

    /// Check if a version matches this range
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            VersionRange::Any => true,
            VersionRange::Exact(v) => version == v,
            VersionRange::GreaterOrEqual(v) => version >= v,
            VersionRange::GreaterThan(v) => version > v,
            VersionRange::LessOrEqual(v) => version <= v,
            VersionRange::LessThan(v) => version < v,
            VersionRange::Tilde(v) => {
                // Bounds that cannot be represented are treated as unbounded
                let upper = v
                    .minor()
                    .checked_add(1)
                    .map(|minor| Version::new(v.major(), minor, 0));
                version >= v && upper.map_or(true, |upper| *version < upper)
            }
            VersionRange::Caret(v) => {
                let upper = v.major().checked_add(1).map(|major| Version::new(major, 0, 0));
                version >= v && upper.map_or(true, |upper| *version < upper)
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Any => write!(f, "*"),
            VersionRange::Exact(v) => write!(f, "{}", v),
            VersionRange::GreaterOrEqual(v) => write!(f, ">={}", v),
            VersionRange::GreaterThan(v) => write!(f, ">{}", v),
            VersionRange::LessOrEqual(v) => write!(f, "<={}", v),
            VersionRange::LessThan(v) => write!(f, "<{}", v),
            VersionRange::Tilde(v) => write!(f, "~{}", v),
            VersionRange::Caret(v) => write!(f, "^{}", v),
        }
    }
}

/// Check whether `version` satisfies `range`.
///
/// A range that cannot be parsed is satisfied by nothing.
pub fn satisfies_range(version: &Version, range: &str) -> bool {
    VersionRange::parse(range)
        .map(|range| range.matches(version))
        .unwrap_or(false)
}
