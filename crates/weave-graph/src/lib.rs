//! # weave-graph
//!
//! Append-only causal event graph for the Timeweave store.
//!
//! This crate provides:
//! - ULID-based event and universe identifiers
//! - Immutable causal events carrying full state snapshots
//! - An arena-backed DAG with validated insertion
//! - Ancestor, descendant and common-ancestor queries
//!
//! ## Invariants
//!
//! 1. Every parent of an event exists before the event is inserted
//! 2. Ids are always fresh, so the graph cannot contain a cycle
//! 3. Timestamps strictly increase along every causal path
//! 4. Events are never mutated or removed once stored
//!
//! ## Example
//!
//! ```rust
//! use weave_graph::{EventBuilder, EventStore, MemoryEventGraph};
//!
//! // Create a graph with a root event
//! let (mut graph, root) = MemoryEventGraph::with_root(EventBuilder::set(0)).unwrap();
//!
//! // Two writes forked from the root
//! let a = graph.insert(EventBuilder::set(1).with_parent(root)).unwrap().id;
//! let b = graph.insert(EventBuilder::set(2).with_parent(root)).unwrap().id;
//!
//! // Join them in a merge event
//! let merged = graph.insert(EventBuilder::merge(3, a, b)).unwrap().id;
//!
//! assert_eq!(graph.common_ancestor(&a, &b), Some(root));
//! assert_eq!(graph.tips(), vec![merged]);
//! ```

mod event;
mod graph;
mod id;

pub use event::{CausalEvent, EventBuilder, EventKind};
pub use graph::{EventStore, GraphError, GraphStats, MemoryEventGraph};
pub use id::{EventId, UniverseId};

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
