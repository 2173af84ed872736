//! Property-based tests for version ordering, arithmetic and schema diffs

#[cfg(test)]
mod tests {
    use crate::diff::diff_fields;
    use crate::proptest_strategies::*;
    use crate::versioning::{increment, satisfies_range, FormatOptions, IncrementKind, Version};
    use proptest::prelude::*;
    use std::cmp::Ordering;

    fn increment_kind_strategy() -> impl Strategy<Value = IncrementKind> {
        prop_oneof![
            Just(IncrementKind::Major),
            Just(IncrementKind::Minor),
            Just(IncrementKind::Patch),
            Just(IncrementKind::Prerelease),
        ]
    }

    proptest! {
        #[test]
        fn prop_compare_is_antisymmetric(a in version_strategy(), b in version_strategy()) {
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }

        #[test]
        fn prop_compare_is_transitive(
            a in version_strategy(),
            b in version_strategy(),
            c in version_strategy(),
        ) {
            let mut sorted = [a, b, c];
            sorted.sort();
            prop_assert!(sorted[0] <= sorted[1]);
            prop_assert!(sorted[1] <= sorted[2]);
            prop_assert!(sorted[0] <= sorted[2]);
        }

        #[test]
        fn prop_order_is_transitive_pairwise(
            a in version_strategy(),
            b in version_strategy(),
            c in version_strategy(),
        ) {
            if a.cmp(&b) != Ordering::Greater && b.cmp(&c) != Ordering::Greater {
                prop_assert_ne!(a.cmp(&c), Ordering::Greater);
            }
        }

        #[test]
        fn prop_parse_format_round_trip(input in version_string_strategy()) {
            let version = Version::parse(&input).unwrap();
            let formatted = version.format(FormatOptions::default());
            prop_assert_eq!(&formatted, &input);

            let reparsed = Version::parse(&formatted).unwrap();
            prop_assert_eq!(reparsed.major(), version.major());
            prop_assert_eq!(reparsed.minor(), version.minor());
            prop_assert_eq!(reparsed.patch(), version.patch());
            prop_assert_eq!(reparsed.pre_release(), version.pre_release());
            prop_assert_eq!(reparsed.build_metadata(), version.build_metadata());
        }

        #[test]
        fn prop_parse_never_panics(input in ".{0,40}") {
            let _ = Version::parse(&input);
            let _ = satisfies_range(&Version::new(1, 0, 0), &input);
        }

        #[test]
        fn prop_increment_is_monotonic(v in version_strategy(), kind in increment_kind_strategy()) {
            let next = increment(&v, kind).unwrap();
            prop_assert_eq!(next.cmp(&v), Ordering::Greater);
        }

        #[test]
        fn prop_caret_contains_tilde(v in version_strategy(), base in version_strategy()) {
            let tilde = format!("~{}", base);
            let caret = format!("^{}", base);
            if satisfies_range(&v, &tilde) {
                prop_assert!(satisfies_range(&v, &caret));
            }
        }

        #[test]
        fn prop_diff_of_identical_snapshots_is_empty(fields in snapshot_strategy()) {
            prop_assert!(diff_fields(&fields, &fields).is_empty());
        }

        #[test]
        fn prop_removed_fields_are_breaking(from in snapshot_strategy(), to in snapshot_strategy()) {
            let diff = diff_fields(&from, &to);
            for id in &diff.removed {
                prop_assert!(diff.breaking.contains(id));
            }
            for field in to.iter().filter(|f| !f.required) {
                if diff.added.contains(&field.id) {
                    prop_assert!(!diff.breaking.contains(&field.id));
                }
            }
        }

        #[test]
        fn prop_breaking_is_subset(from in snapshot_strategy(), to in snapshot_strategy()) {
            let diff = diff_fields(&from, &to);
            for id in &diff.breaking {
                prop_assert!(
                    diff.added.contains(id) || diff.removed.contains(id) || diff.modified.contains(id)
                );
            }
        }
    }
}
