//! # weave-diff
//!
//! Path-addressed structural diff for Timeweave snapshots.
//!
//! Snapshots are compared as `serde_json::Value` trees. Every differing
//! leaf is reported once with its path and the values on each side:
//!
//! - `Added` / `Removed` when a side lacks the leaf
//! - `Changed` when both sides hold different values
//! - `Conflict` when a base is supplied and both sides moved away from it
//!   to different values
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use weave_diff::{diff, DiffKind, Path};
//!
//! let base = json!({"x": 1});
//! let diffs = diff(&json!({"x": 2}), &json!({"x": 3}), Some(&base));
//!
//! assert_eq!(diffs.len(), 1);
//! assert_eq!(diffs[0].path, Path::key("x"));
//! assert_eq!(diffs[0].kind, DiffKind::Conflict);
//! ```

pub mod apply;
pub mod diff;
pub mod error;
pub mod path;

pub use apply::{apply_changes, get_path, remove_path, set_path};
pub use diff::{diff, DiffKind, PathDiff};
pub use error::{DiffError, Result};
pub use path::{Path, PathSegment};
