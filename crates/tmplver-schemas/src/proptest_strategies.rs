//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random but valid
//! versions and field snapshots.

#![cfg(test)]

use crate::fields::{FieldDescriptor, FieldKind};
use crate::versioning::Version;
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

/// Strategy for generating field kinds
pub fn field_kind_strategy() -> impl Strategy<Value = FieldKind> {
    prop_oneof![
        Just(FieldKind::Text),
        Just(FieldKind::Textarea),
        Just(FieldKind::Number),
        Just(FieldKind::Date),
        Just(FieldKind::Boolean),
        Just(FieldKind::Select),
        Just(FieldKind::Address),
    ]
}

/// Strategy for a single prerelease or build identifier
fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..20).prop_map(|n| n.to_string()),
        "(alpha|beta|rc|pre)",
        "[a-z][a-z0-9-]{0,6}",
    ]
}

/// Strategy for dot-separated identifier lists
fn dotted_strategy() -> impl Strategy<Value = String> {
    vec(identifier_strategy(), 1..4).prop_map(|parts| parts.join("."))
}

/// Strategy for generating valid version strings
pub fn version_string_strategy() -> impl Strategy<Value = String> {
    (
        0u64..5,
        0u64..5,
        0u64..5,
        option::of(dotted_strategy()),
        option::of(dotted_strategy()),
    )
        .prop_map(|(major, minor, patch, pre, build)| {
            let mut s = format!("{}.{}.{}", major, minor, patch);
            if let Some(pre) = pre {
                s.push('-');
                s.push_str(&pre);
            }
            if let Some(build) = build {
                s.push('+');
                s.push_str(&build);
            }
            s
        })
}

/// Strategy for generating versions
pub fn version_strategy() -> impl Strategy<Value = Version> {
    version_string_strategy().prop_map(|s| Version::parse(&s).expect("strategy yields valid versions"))
}

/// Strategy for generating fields with ids from a small pool so snapshots overlap
pub fn field_strategy() -> impl Strategy<Value = FieldDescriptor> {
    (
        "q[0-9]",
        field_kind_strategy(),
        any::<bool>(),
        option::of("[A-Z][a-z]{1,8}"),
    )
        .prop_map(|(id, kind, required, label)| {
            let mut field = FieldDescriptor::new(id, kind, required);
            field.label = label;
            field
        })
}

/// Strategy for generating a snapshot with unique field ids
pub fn snapshot_strategy() -> impl Strategy<Value = Vec<FieldDescriptor>> {
    vec(field_strategy(), 0..8).prop_map(|fields| {
        let mut seen = std::collections::HashSet::new();
        fields.into_iter().filter(|f| seen.insert(f.id.clone())).collect()
    })
}
