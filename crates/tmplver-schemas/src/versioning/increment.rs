//! Version arithmetic: increments and next-version suggestions
//!
//! Copyright (c) 2025 Tmplver Team
//! Licensed under the Apache-2.0 license

use crate::versioning::version::{Version, VersionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of a version to bump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncrementKind {
    Major,
    Minor,
    Patch,
    Prerelease,
}

impl fmt::Display for IncrementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncrementKind::Major => write!(f, "major"),
            IncrementKind::Minor => write!(f, "minor"),
            IncrementKind::Patch => write!(f, "patch"),
            IncrementKind::Prerelease => write!(f, "prerelease"),
        }
    }
}

/// Kinds of change that drive a next-version suggestion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub breaking: bool,
    pub features: bool,
    pub fixes: bool,
}

impl ChangeSet {
    pub fn new(breaking: bool, features: bool, fixes: bool) -> Self {
        Self {
            breaking,
            features,
            fixes,
        }
    }

    /// The increment this change set calls for.
    ///
    /// Breaking changes win over features, features over fixes; a change set
    /// with nothing in it still yields a patch bump.
    pub fn increment_kind(&self) -> IncrementKind {
        if self.breaking {
            IncrementKind::Major
        } else if self.features {
            IncrementKind::Minor
        } else {
            IncrementKind::Patch
        }
    }
}

fn bump(value: u64, version: &Version, component: &'static str) -> Result<u64, VersionError> {
    value.checked_add(1).ok_or_else(|| VersionError::Overflow {
        input: version.raw().to_string(),
        component,
    })
}

/// Increment a version. The result always sorts strictly above the input.
pub fn increment(version: &Version, kind: IncrementKind) -> Result<Version, VersionError> {
    let (major, minor, patch) = (version.major(), version.minor(), version.patch());
    match kind {
        IncrementKind::Major => Ok(Version::new(bump(major, version, "major")?, 0, 0)),
        IncrementKind::Minor => Ok(Version::new(major, bump(minor, version, "minor")?, 0)),
        IncrementKind::Patch => Ok(Version::new(major, minor, bump(patch, version, "patch")?)),
        IncrementKind::Prerelease => {
            let pre_release = match version.pre_release() {
                Some(pre) => next_pre_release(pre),
                None => {
                    let patch = bump(patch, version, "patch")?;
                    return Ok(Version::from_parts(major, minor, patch, Some("alpha.0".to_string()), None));
                }
            };
            Ok(Version::from_parts(major, minor, patch, Some(pre_release), None))
        }
    }
}

/// `alpha.3` becomes `alpha.4`; anything without a numeric tail gets `.1` appended
fn next_pre_release(pre: &str) -> String {
    if let Some((identifier, tail)) = pre.rsplit_once('.') {
        if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            if let Some(next) = tail.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
                return format!("{}.{}", identifier, next);
            }
        }
    }
    format!("{}.1", pre)
}

/// Suggest the next version for a set of changes
pub fn suggest_next(current: &Version, changes: ChangeSet) -> Result<Version, VersionError> {
    increment(current, changes.increment_kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_core_increments() {
        let base = v("1.2.3-beta.1+build.5");
        assert_eq!(increment(&base, IncrementKind::Major).unwrap().raw(), "2.0.0");
        assert_eq!(increment(&base, IncrementKind::Minor).unwrap().raw(), "1.3.0");
        assert_eq!(increment(&base, IncrementKind::Patch).unwrap().raw(), "1.2.4");
    }

    #[test]
    fn test_prerelease_increments() {
        assert_eq!(increment(&v("1.2.3"), IncrementKind::Prerelease).unwrap().raw(), "1.2.4-alpha.0");
        assert_eq!(increment(&v("1.2.3-alpha.0"), IncrementKind::Prerelease).unwrap().raw(), "1.2.3-alpha.1");
        assert_eq!(increment(&v("1.2.3-rc.9"), IncrementKind::Prerelease).unwrap().raw(), "1.2.3-rc.10");
        assert_eq!(increment(&v("1.2.3-beta"), IncrementKind::Prerelease).unwrap().raw(), "1.2.3-beta.1");
        assert_eq!(increment(&v("1.2.3-1"), IncrementKind::Prerelease).unwrap().raw(), "1.2.3-1.1");
    }

    #[test]
    fn test_increments_are_monotonic() {
        for input in ["0.0.0", "1.2.3", "1.2.3-alpha", "1.2.3-alpha.7", "1.2.3-x.7.z", "4.0.0+meta"] {
            let base = v(input);
            for kind in [IncrementKind::Major, IncrementKind::Minor, IncrementKind::Patch, IncrementKind::Prerelease] {
                let next = increment(&base, kind).unwrap();
                assert!(next > base, "{} of {} gave {}", kind, base, next);
            }
        }
    }

    #[test]
    fn test_overflow_is_reported() {
        let top = Version::new(u64::MAX, 0, 0);
        assert!(matches!(
            increment(&top, IncrementKind::Major),
            Err(VersionError::Overflow { component: "major", .. })
        ));
    }

    #[test]
    fn test_suggest_next_priority() {
        let current = v("1.4.2");
        assert_eq!(suggest_next(&current, ChangeSet::new(true, true, true)).unwrap().raw(), "2.0.0");
        assert_eq!(suggest_next(&current, ChangeSet::new(false, true, true)).unwrap().raw(), "1.5.0");
        assert_eq!(suggest_next(&current, ChangeSet::new(false, false, true)).unwrap().raw(), "1.4.3");
        assert_eq!(suggest_next(&current, ChangeSet::default()).unwrap().raw(), "1.4.3");
    }
}
