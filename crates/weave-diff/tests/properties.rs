//! Property-based tests for the diff engine.
//!
//! These tests verify the laws the merge layer relies on:
//!  - Symmetry: what `diff(a, b)` reports as added, `diff(b, a)` reports as removed
//!  - Completeness: writing every target-side leaf onto the source yields the target
//!  - No base, no conflicts

use proptest::prelude::*;
use serde_json::{json, Value};
use weave_diff::{apply_changes, diff, DiffKind};

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (0i64..5).prop_map(|n| json!(n)),
        "[a-c]{1,2}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn object_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", value_strategy(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

proptest! {
    #[test]
    fn added_iff_removed_in_reverse(a in object_strategy(), b in object_strategy()) {
        let forward = diff(&a, &b, None);
        let backward = diff(&b, &a, None);

        for d in &forward {
            if d.kind == DiffKind::Added {
                let mirrored = backward
                    .iter()
                    .find(|r| r.path == d.path)
                    .expect("path missing from reverse diff");
                prop_assert_eq!(mirrored.kind, DiffKind::Removed);
                prop_assert_eq!(&mirrored.source_value, &d.target_value);
            }
        }
        for r in &backward {
            if r.kind == DiffKind::Removed {
                prop_assert!(forward
                    .iter()
                    .any(|d| d.path == r.path && d.kind == DiffKind::Added));
            }
        }
        prop_assert_eq!(forward.len(), backward.len());
    }

    #[test]
    fn no_base_means_no_conflicts(a in object_strategy(), b in object_strategy()) {
        prop_assert!(diff(&a, &b, None).iter().all(|d| !d.kind.is_conflict()));
    }

    #[test]
    fn applying_target_side_reproduces_target(a in object_strategy(), b in object_strategy()) {
        let diffs = diff(&a, &b, None);
        let mut rebuilt = a.clone();
        apply_changes(&mut rebuilt, diffs.into_iter().map(|d| (d.path, d.target_value))).unwrap();
        prop_assert_eq!(rebuilt, b);
    }

    #[test]
    fn diff_against_itself_is_empty(a in object_strategy(), base in object_strategy()) {
        prop_assert!(diff(&a, &a, Some(&base)).is_empty());
    }

    #[test]
    fn conflicts_require_both_sides_to_move(
        base in object_strategy(),
        a in object_strategy(),
        b in object_strategy(),
    ) {
        for d in diff(&a, &b, Some(&base)) {
            if d.kind == DiffKind::Conflict {
                prop_assert_ne!(&d.source_value, &d.base_value);
                prop_assert_ne!(&d.target_value, &d.base_value);
                prop_assert_ne!(&d.source_value, &d.target_value);
            }
        }
    }
}
