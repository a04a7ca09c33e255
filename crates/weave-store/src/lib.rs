//! # weave-store
//!
//! Branchable causal state store for Timeweave.
//!
//! This crate provides:
//! - [`CausalStore`]: one key's append-only history, split into universes
//! - Universes (branches) with create, switch, list and linear history
//! - Merge previews with ours/theirs/three-way strategies
//! - Per-path conflict resolution and explicit merge execution
//! - [`StoreRegistry`]: an owned collection of stores keyed by name
//!
//! ## Merging
//!
//! Merges fold a source universe into a target universe:
//!
//! 1. [`CausalStore::preview_merge`] diffs both heads against their common
//!    ancestor and splits the result into changes and conflicts
//! 2. [`MergePreview::resolve`] records a decision for a conflicting path
//! 3. [`CausalStore::execute_merge`] appends one merge event to the target
//!
//! Nothing merges on its own; every merge is a caller's explicit request.

pub mod config;
pub mod error;
pub mod merge;
pub mod registry;
pub mod store;
pub mod universe;

pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{Result, StoreError};
pub use merge::{MergePreview, MergeStrategy, Resolution};
pub use registry::StoreRegistry;
pub use store::{CausalStore, Snapshot};
pub use universe::{Universe, Universes};

// Re-export commonly used types from the lower layers
pub use weave_diff::{DiffKind, Path, PathDiff, PathSegment};
pub use weave_graph::{CausalEvent, EventId, EventKind, EventStore, UniverseId};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::merge::{MergePreview, MergeStrategy, Resolution};
    pub use crate::store::CausalStore;
    pub use crate::error::StoreError;
    pub use weave_diff::Path;
    pub use weave_graph::{EventId, EventStore, UniverseId};
}
