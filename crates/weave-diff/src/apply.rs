//! Reading and writing snapshot values by path.
//!
//! Merges are materialized by writing chosen leaf values onto a clone of
//! the target snapshot. Writes create missing intermediate containers;
//! they refuse to descend through a primitive.

use crate::error::{DiffError, Result};
use crate::path::{Path, PathSegment};
use serde_json::{Map, Value};

/// Read the value at `path`, if present.
pub fn get_path<'v>(value: &'v Value, path: &Path) -> Option<&'v Value> {
    path.segments()
        .iter()
        .try_fold(value, |current, segment| match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get(key),
            (Value::Array(items), PathSegment::Index(idx)) => items.get(*idx),
            _ => None,
        })
}

/// Write `new_value` at `path`.
///
/// Missing or `null` intermediates become an object (for a key segment) or
/// an array (for an index segment). Arrays written past their end are
/// padded with `null`. Writing at the root replaces the whole value.
pub fn set_path(value: &mut Value, path: &Path, new_value: Value) -> Result<()> {
    let mut current = value;

    for (depth, segment) in path.segments().iter().enumerate() {
        if current.is_null() {
            *current = match segment {
                PathSegment::Key(_) => Value::Object(Map::new()),
                PathSegment::Index(_) => Value::Array(Vec::new()),
            };
        }

        current = match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => {
                map.entry(key.clone()).or_insert(Value::Null)
            }
            (Value::Array(items), PathSegment::Index(idx)) => {
                if items.len() <= *idx {
                    items.resize(*idx + 1, Value::Null);
                }
                &mut items[*idx]
            }
            (other, _) => {
                return Err(DiffError::TypeMismatch {
                    path: Path::new(path.segments()[..depth].to_vec()).to_string(),
                    found: type_name(other).to_string(),
                })
            }
        };
    }

    *current = new_value;
    Ok(())
}

/// Remove the value at `path`, returning it.
///
/// Removing an array element shifts the following elements down. Absent
/// paths are left alone. The root cannot be removed.
pub fn remove_path(value: &mut Value, path: &Path) -> Result<Option<Value>> {
    let (last, parent_path) = match (path.last(), path.parent()) {
        (Some(last), Some(parent)) => (last, parent),
        _ => return Err(DiffError::InvalidPath("cannot remove the root".to_string())),
    };

    let parent = match get_path_mut(value, &parent_path) {
        Some(parent) => parent,
        None => return Ok(None),
    };

    Ok(match (parent, last) {
        (Value::Object(map), PathSegment::Key(key)) => map.remove(key),
        (Value::Array(items), PathSegment::Index(idx)) if *idx < items.len() => {
            Some(items.remove(*idx))
        }
        _ => None,
    })
}

/// Write a batch of leaf values; `None` removes the leaf.
///
/// Writes are applied first in ascending path order, then removals in
/// descending order so that removing array elements never shifts an index
/// still waiting to be removed.
pub fn apply_changes<I>(value: &mut Value, changes: I) -> Result<()>
where
    I: IntoIterator<Item = (Path, Option<Value>)>,
{
    let mut writes = Vec::new();
    let mut removals = Vec::new();
    for (path, leaf) in changes {
        match leaf {
            Some(v) => writes.push((path, v)),
            None => removals.push(path),
        }
    }

    writes.sort_by(|a, b| a.0.cmp(&b.0));
    for (path, v) in writes {
        set_path(value, &path, v)?;
    }

    removals.sort();
    for path in removals.iter().rev() {
        remove_path(value, path)?;
    }

    Ok(())
}

fn get_path_mut<'v>(value: &'v mut Value, path: &Path) -> Option<&'v mut Value> {
    path.segments()
        .iter()
        .try_fold(value, |current, segment| match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key),
            (Value::Array(items), PathSegment::Index(idx)) => items.get_mut(*idx),
            _ => None,
        })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
