//! Structural comparison of two snapshots, optionally against a base.
//!
//! Objects are walked over the union of their keys and arrays index by
//! index; anything else (including two containers of different shape) is
//! compared as a leaf. Absence is its own value: a key missing on one side
//! compares unequal to any value present on the other, including `null`.

use crate::path::{Path, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// How a leaf differs between source and target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Absent in source, present in target.
    Added,
    /// Present in source, absent in target.
    Removed,
    /// Different on both sides, but not a conflict.
    Changed,
    /// Both sides moved away from a known base, in different directions.
    Conflict,
}

impl DiffKind {
    pub fn is_conflict(&self) -> bool {
        matches!(self, DiffKind::Conflict)
    }
}

/// One differing leaf.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathDiff {
    pub path: Path,
    pub kind: DiffKind,
    pub source_value: Option<Value>,
    pub target_value: Option<Value>,
    /// Base value at this path; `None` when absent or when no base was given.
    pub base_value: Option<Value>,
}

/// Base snapshot as seen at one path during the walk.
#[derive(Clone, Copy)]
enum Base<'a> {
    /// No base snapshot at all.
    Unknown,
    /// The base exists; the path may still be absent in it.
    Known(Option<&'a Value>),
}

impl<'a> Base<'a> {
    fn child(self, segment: &PathSegment) -> Base<'a> {
        match self {
            Base::Unknown => Base::Unknown,
            Base::Known(value) => Base::Known(value.and_then(|v| child(v, segment))),
        }
    }

    fn value(self) -> Option<&'a Value> {
        match self {
            Base::Unknown => None,
            Base::Known(value) => value,
        }
    }
}

fn child<'v>(value: &'v Value, segment: &PathSegment) -> Option<&'v Value> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Array(items), PathSegment::Index(idx)) => items.get(*idx),
        _ => None,
    }
}

/// Compare `source` against `target`, classifying every differing leaf.
///
/// With a `base`, a leaf where both sides moved away from the base to
/// different values is a [`DiffKind::Conflict`]. Without one, differing
/// leaves are only ever added, removed or changed. Unchanged leaves are
/// omitted. Results come out in traversal order, object keys sorted.
pub fn diff(source: &Value, target: &Value, base: Option<&Value>) -> Vec<PathDiff> {
    let base = match base {
        Some(value) => Base::Known(Some(value)),
        None => Base::Unknown,
    };

    let mut out = Vec::new();
    let mut path = Path::root();
    walk(&mut path, Some(source), Some(target), base, &mut out);
    out
}

fn walk(
    path: &mut Path,
    source: Option<&Value>,
    target: Option<&Value>,
    base: Base<'_>,
    out: &mut Vec<PathDiff>,
) {
    if source == target {
        return;
    }

    match (source, target) {
        (Some(Value::Object(s)), Some(Value::Object(t))) => {
            let keys: BTreeSet<&String> = s.keys().chain(t.keys()).collect();
            for key in keys {
                let segment = PathSegment::Key(key.clone());
                let child_base = base.child(&segment);
                path.push(segment);
                walk(path, s.get(key), t.get(key), child_base, out);
                path.pop();
            }
        }
        (Some(Value::Array(s)), Some(Value::Array(t))) => {
            for idx in 0..s.len().max(t.len()) {
                let segment = PathSegment::Index(idx);
                let child_base = base.child(&segment);
                path.push(segment);
                walk(path, s.get(idx), t.get(idx), child_base, out);
                path.pop();
            }
        }
        _ => out.push(classify(path.clone(), source, target, base)),
    }
}

fn classify(path: Path, source: Option<&Value>, target: Option<&Value>, base: Base<'_>) -> PathDiff {
    let kind = match base {
        Base::Known(b) if b != source && b != target => DiffKind::Conflict,
        _ if source.is_none() => DiffKind::Added,
        _ if target.is_none() => DiffKind::Removed,
        _ => DiffKind::Changed,
    };

    PathDiff {
        path,
        kind,
        source_value: source.cloned(),
        target_value: target.cloned(),
        base_value: base.value().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_values_have_no_diff() {
        let v = json!({"a": [1, 2, {"b": null}], "c": "x"});
        assert!(diff(&v, &v, None).is_empty());
        assert!(diff(&v, &v, Some(&json!({}))).is_empty());
    }

    #[test]
    fn test_added_removed_changed() {
        let source = json!({"keep": 1, "gone": true, "edit": "a"});
        let target = json!({"keep": 1, "new": [1], "edit": "b"});

        let diffs = diff(&source, &target, None);
        assert_eq!(diffs.len(), 3);

        assert_eq!(diffs[0].path, Path::key("edit"));
        assert_eq!(diffs[0].kind, DiffKind::Changed);
        assert_eq!(diffs[0].source_value, Some(json!("a")));
        assert_eq!(diffs[0].target_value, Some(json!("b")));

        assert_eq!(diffs[1].path, Path::key("gone"));
        assert_eq!(diffs[1].kind, DiffKind::Removed);
        assert_eq!(diffs[1].target_value, None);

        assert_eq!(diffs[2].path, Path::key("new"));
        assert_eq!(diffs[2].kind, DiffKind::Added);
        assert_eq!(diffs[2].source_value, None);
        assert_eq!(diffs[2].target_value, Some(json!([1])));
    }

    #[test]
    fn test_nested_paths() {
        let source = json!({"user": {"name": "ada", "tags": ["a", "b"]}});
        let target = json!({"user": {"name": "ada", "tags": ["a", "c", "d"]}});

        let diffs = diff(&source, &target, None);
        let paths: Vec<String> = diffs.iter().map(|d| d.path.to_string()).collect();
        assert_eq!(paths, vec!["user.tags.1", "user.tags.2"]);
        assert_eq!(diffs[0].kind, DiffKind::Changed);
        assert_eq!(diffs[1].kind, DiffKind::Added);
    }

    #[test]
    fn test_shape_mismatch_is_a_leaf() {
        let diffs = diff(&json!({"a": {"x": 1}}), &json!({"a": [1]}), None);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, Path::key("a"));
        assert_eq!(diffs[0].kind, DiffKind::Changed);
    }

    #[test]
    fn test_root_primitives() {
        let diffs = diff(&json!(1), &json!(2), None);
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].path.is_root());
    }

    #[test]
    fn test_null_differs_from_absent() {
        let diffs = diff(&json!({}), &json!({"a": null}), None);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DiffKind::Added);
        assert_eq!(diffs[0].target_value, Some(Value::Null));
    }

    #[test]
    fn test_conflict_against_base() {
        let base = json!({"x": 1});
        let diffs = diff(&json!({"x": 2}), &json!({"x": 3}), Some(&base));

        assert_eq!(diffs.len(), 1);
        let d = &diffs[0];
        assert_eq!(d.path, Path::key("x"));
        assert_eq!(d.kind, DiffKind::Conflict);
        assert_eq!(d.source_value, Some(json!(2)));
        assert_eq!(d.target_value, Some(json!(3)));
        assert_eq!(d.base_value, Some(json!(1)));
    }

    #[test]
    fn test_one_sided_changes_are_not_conflicts() {
        let base = json!({"x": 1, "y": 1});
        let diffs = diff(&json!({"x": 2, "y": 1}), &json!({"x": 1, "y": 2}), Some(&base));

        assert_eq!(diffs.len(), 2);
        assert!(diffs.iter().all(|d| d.kind == DiffKind::Changed));
        assert!(diffs.iter().all(|d| d.base_value == Some(json!(1))));
    }

    #[test]
    fn test_without_base_nothing_conflicts() {
        let diffs = diff(&json!({"x": 2}), &json!({"x": 3}), None);
        assert_eq!(diffs[0].kind, DiffKind::Changed);
        assert_eq!(diffs[0].base_value, None);
    }

    #[test]
    fn test_delete_versus_modify_conflicts() {
        let base = json!({"a": 1});
        let diffs = diff(&json!({}), &json!({"a": 2}), Some(&base));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DiffKind::Conflict);
        assert_eq!(diffs[0].source_value, None);
    }

    #[test]
    fn test_both_added_differently_conflicts() {
        let base = json!({});
        let diffs = diff(&json!({"k": "s"}), &json!({"k": "t"}), Some(&base));
        assert_eq!(diffs[0].kind, DiffKind::Conflict);
        assert_eq!(diffs[0].base_value, None);
    }

    #[test]
    fn test_base_shape_change_below_path() {
        // Base had a primitive where both sides now hold objects.
        let base = json!({"cfg": 0});
        let source = json!({"cfg": {"a": 1}});
        let target = json!({"cfg": {"a": 2}});
        let diffs = diff(&source, &target, Some(&base));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, Path::parse("cfg.a"));
        assert_eq!(diffs[0].kind, DiffKind::Conflict);
    }
}
