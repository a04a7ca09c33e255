//! Error types for path reads and writes.

use thiserror::Error;

/// Errors that can occur while applying values at a path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Type mismatch at {path}: cannot descend into {found}")]
    TypeMismatch { path: String, found: String },
}

pub type Result<T> = std::result::Result<T, DiffError>;
