//! Template versioning primitives
//!
//! This module provides:
//! - Version identifier parsing, validation and formatting
//! - A total order over versions and sorting helpers
//! - Range predicates (`*`, comparisons, `~`, `^`, exact)
//! - Increments and next-version suggestions
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

pub mod increment;
pub mod range;
pub mod version;

pub use increment::{increment, suggest_next, ChangeSet, IncrementKind};
pub use range::{satisfies_range, VersionRange};
pub use version::{FormatOptions, Version, VersionError};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Compare two versions. Build metadata never participates.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}

/// Sort versions ascending. The sort is stable, so duplicates keep their input order.
pub fn sort(versions: &[Version]) -> Vec<Version> {
    let mut sorted = versions.to_vec();
    sorted.sort();
    sorted
}

/// The greatest version, or `None` for an empty slice
pub fn latest(versions: &[Version]) -> Option<&Version> {
    versions.iter().max()
}

/// Check whether a string is a valid version identifier
pub fn is_valid(input: &str) -> bool {
    Version::is_valid(input)
}

/// Parse and render a version string in one step
pub fn format_version(input: &str, options: FormatOptions) -> Result<String, VersionError> {
    Ok(Version::parse(input)?.format(options))
}

/// Versions without a prerelease suffix, in input order
pub fn stable_versions(versions: &[Version]) -> Vec<Version> {
    versions.iter().filter(|v| v.is_stable()).cloned().collect()
}

/// Versions carrying a prerelease suffix, in input order
pub fn prerelease_versions(versions: &[Version]) -> Vec<Version> {
    versions.iter().filter(|v| v.is_pre_release()).cloned().collect()
}

/// Magnitude of a version change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Patch => write!(f, "patch"),
            ChangeKind::Minor => write!(f, "minor"),
            ChangeKind::Major => write!(f, "major"),
        }
    }
}

/// Classify a change by the leading component that differs.
///
/// Versions that share major and minor (including prerelease-only and
/// identical pairs) classify as `Patch`.
pub fn change_kind(from: &Version, to: &Version) -> ChangeKind {
    if from.major() != to.major() {
        ChangeKind::Major
    } else if from.minor() != to.minor() {
        ChangeKind::Minor
    } else {
        ChangeKind::Patch
    }
}

/// Check if two versions are compatible at a given level.
///
/// `Major` requires the same major, `Minor` the same major.minor and `Patch`
/// the same numeric core.
pub fn are_compatible(a: &Version, b: &Version, level: ChangeKind) -> bool {
    match level {
        ChangeKind::Major => a.major() == b.major(),
        ChangeKind::Minor => a.major() == b.major() && a.minor() == b.minor(),
        ChangeKind::Patch => a.major() == b.major() && a.minor() == b.minor() && a.patch() == b.patch(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(inputs: &[&str]) -> Vec<Version> {
        inputs.iter().map(|s| Version::parse(s).unwrap()).collect()
    }

    fn raws(versions: &[Version]) -> Vec<&str> {
        versions.iter().map(|v| v.raw()).collect()
    }

    #[test]
    fn test_sort_ascending() {
        let input = versions(&["2.0.0", "1.0.0-alpha", "1.10.0", "1.2.0", "1.0.0"]);
        assert_eq!(
            raws(&sort(&input)),
            vec!["1.0.0-alpha", "1.0.0", "1.2.0", "1.10.0", "2.0.0"]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_versions() {
        let input = versions(&["1.0.0+b", "0.9.0", "1.0.0+a"]);
        assert_eq!(raws(&sort(&input)), vec!["0.9.0", "1.0.0+b", "1.0.0+a"]);
    }

    #[test]
    fn test_latest() {
        assert!(latest(&[]).is_none());
        let input = versions(&["1.0.0", "3.0.0-rc.1", "2.9.9"]);
        assert_eq!(latest(&input).unwrap().raw(), "3.0.0-rc.1");
    }

    #[test]
    fn test_compare_values() {
        let a = Version::parse("1.0.0-alpha").unwrap();
        let b = Version::parse("1.0.0-beta").unwrap();
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&b, &a), Ordering::Greater);

        let a1 = Version::parse("1.0.0-alpha.1").unwrap();
        let a2 = Version::parse("1.0.0-alpha.2").unwrap();
        assert_eq!(compare(&a1, &a2), Ordering::Less);
    }

    #[test]
    fn test_stability_filters() {
        let input = versions(&["1.0.0", "1.1.0-beta", "1.1.0", "2.0.0-rc.1"]);
        assert_eq!(raws(&stable_versions(&input)), vec!["1.0.0", "1.1.0"]);
        assert_eq!(raws(&prerelease_versions(&input)), vec!["1.1.0-beta", "2.0.0-rc.1"]);
    }

    #[test]
    fn test_format_version() {
        let opts = FormatOptions { include_prefix: true, short: false };
        assert_eq!(format_version("1.2.3", opts).unwrap(), "v1.2.3");
        assert!(format_version("1.2", opts).is_err());
        assert!(is_valid("0.0.1-rc.1+sha.abc"));
        assert!(!is_valid("1.2"));
    }

    #[test]
    fn test_change_kind() {
        let v = |s: &str| Version::parse(s).unwrap();
        assert_eq!(change_kind(&v("1.2.3"), &v("2.0.0")), ChangeKind::Major);
        assert_eq!(change_kind(&v("2.0.0"), &v("1.9.0")), ChangeKind::Major);
        assert_eq!(change_kind(&v("1.2.3"), &v("1.3.0")), ChangeKind::Minor);
        assert_eq!(change_kind(&v("1.2.3"), &v("1.2.4")), ChangeKind::Patch);
        assert_eq!(change_kind(&v("1.2.3-rc.1"), &v("1.2.3")), ChangeKind::Patch);
    }

    #[test]
    fn test_are_compatible() {
        let v = |s: &str| Version::parse(s).unwrap();
        assert!(are_compatible(&v("1.2.3"), &v("1.9.0"), ChangeKind::Major));
        assert!(!are_compatible(&v("1.2.3"), &v("1.9.0"), ChangeKind::Minor));
        assert!(are_compatible(&v("1.2.3"), &v("1.2.9"), ChangeKind::Minor));
        assert!(!are_compatible(&v("1.2.3"), &v("1.2.9"), ChangeKind::Patch));
        assert!(are_compatible(&v("1.2.3-rc.1"), &v("1.2.3"), ChangeKind::Patch));
    }
}
