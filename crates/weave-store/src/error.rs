//! Error types for the store layer.

use thiserror::Error;
use weave_diff::{DiffError, Path};
use weave_graph::{GraphError, UniverseId};

/// Errors that can occur in store operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error("Unknown branch: {0}")]
    UnknownBranch(UniverseId),

    #[error("Cannot merge a universe into itself")]
    SelfMerge,

    #[error("Unresolved conflicts at: {}", join_paths(.0))]
    UnresolvedConflicts(Vec<Path>),

    #[error("Merge preview is stale: a head moved since it was computed")]
    StalePreview,

    #[error("Store already exists: {0}")]
    DuplicateStore(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn join_paths(paths: &[Path]) -> String {
    paths.iter().map(|p| format!("[{}]", p)).collect::<Vec<_>>().join(", ")
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
