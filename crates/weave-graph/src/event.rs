//! Causal event definition and builder.
//!
//! Each event in the graph records:
//! - A unique id assigned at insertion
//! - The universe and store it belongs to
//! - A full snapshot of the state after the transition
//! - References to parent events (causal predecessors)
//! - A timestamp, monotonic along every causal path

use crate::id::{EventId, UniverseId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of transition an event records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// An ordinary state write (or the store root).
    Set,

    /// The first event of a freshly forked universe.
    BranchPoint,

    /// The result of merging one universe into another.
    Merge,
}

impl EventKind {
    /// Check whether `count` parents is a legal arity for this kind.
    pub fn accepts_parents(&self, count: usize) -> bool {
        match self {
            EventKind::Set | EventKind::BranchPoint => count <= 1,
            EventKind::Merge => count == 2,
        }
    }

    /// Human readable arity, used in error messages.
    pub fn expected_parents(&self) -> &'static str {
        match self {
            EventKind::Set | EventKind::BranchPoint => "0 or 1",
            EventKind::Merge => "2",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Set => write!(f, "set"),
            EventKind::BranchPoint => write!(f, "branch-point"),
            EventKind::Merge => write!(f, "merge"),
        }
    }
}

/// An immutable, timestamped state snapshot with explicit parents.
///
/// `caused_by[0]` is the primary parent: following it from any event walks
/// the linear history of the universe the event was written in. For merge
/// events `caused_by[1]` is the merged-in head and is provenance only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CausalEvent<S> {
    /// Assigned by the graph on insertion.
    pub id: EventId,

    /// The universe this event was written in.
    pub universe_id: UniverseId,

    /// The logical key of the store that owns the graph.
    pub store_key: String,

    pub kind: EventKind,

    /// Full state after this event (not a delta).
    pub value: S,

    /// Microseconds since the Unix epoch, strictly increasing per graph.
    pub timestamp: u64,

    /// Parent events. Empty only for the store root.
    pub caused_by: Vec<EventId>,
}

impl<S> CausalEvent<S> {
    /// Check if this is a root event (no parents).
    pub fn is_root(&self) -> bool {
        self.caused_by.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.kind == EventKind::Merge
    }

    /// The parent followed for linear history.
    pub fn primary_parent(&self) -> Option<EventId> {
        self.caused_by.first().copied()
    }

    /// The merged-in parent of a merge event.
    pub fn secondary_parent(&self) -> Option<EventId> {
        self.caused_by.get(1).copied()
    }

    pub fn has_parent(&self, id: &EventId) -> bool {
        self.caused_by.contains(id)
    }
}

/// Builder for candidate events.
///
/// The id and timestamp are not set here; the graph assigns both when the
/// candidate is inserted.
#[derive(Clone, Debug)]
pub struct EventBuilder<S> {
    pub(crate) kind: EventKind,
    pub(crate) value: S,
    pub(crate) universe_id: UniverseId,
    pub(crate) store_key: String,
    pub(crate) caused_by: Vec<EventId>,
}

impl<S> EventBuilder<S> {
    /// Start a candidate of the given kind carrying `value`.
    pub fn new(kind: EventKind, value: S) -> Self {
        EventBuilder {
            kind,
            value,
            universe_id: UniverseId::default(),
            store_key: String::new(),
            caused_by: Vec::new(),
        }
    }

    /// Candidate for an ordinary write.
    pub fn set(value: S) -> Self {
        Self::new(EventKind::Set, value)
    }

    /// Candidate for the first event of a forked universe.
    pub fn branch_point(value: S, source_head: EventId) -> Self {
        Self::new(EventKind::BranchPoint, value).with_parent(source_head)
    }

    /// Candidate for a merge of `source_head` into `target_head`.
    pub fn merge(value: S, target_head: EventId, source_head: EventId) -> Self {
        Self::new(EventKind::Merge, value).with_parents(vec![target_head, source_head])
    }

    /// Set the parent events, replacing any already set.
    pub fn with_parents(mut self, parents: Vec<EventId>) -> Self {
        self.caused_by = parents;
        self
    }

    /// Append a single parent.
    pub fn with_parent(mut self, parent: EventId) -> Self {
        self.caused_by.push(parent);
        self
    }

    pub fn with_universe(mut self, universe_id: UniverseId) -> Self {
        self.universe_id = universe_id;
        self
    }

    pub fn with_store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = key.into();
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn parents(&self) -> &[EventId] {
        &self.caused_by
    }

    /// Finish the candidate with the id and timestamp chosen by the graph.
    pub(crate) fn finish(self, id: EventId, timestamp: u64) -> CausalEvent<S> {
        CausalEvent {
            id,
            universe_id: self.universe_id,
            store_key: self.store_key,
            kind: self.kind,
            value: self.value,
            timestamp,
            caused_by: self.caused_by,
        }
    }
}
