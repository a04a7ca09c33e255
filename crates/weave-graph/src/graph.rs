//! Event graph trait and in-memory implementation.
//!
//! The graph is an arena keyed by [`EventId`]. Parent links live on the
//! events themselves; the reverse (child) links are kept in a separate index
//! that is maintained on every insertion. Tips (events without children) are
//! tracked the same way.

use crate::event::{CausalEvent, EventBuilder, EventKind};
use crate::id::EventId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};
use thiserror::Error;
use tracing::trace;

/// Errors that can occur during graph operations.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// One or more referenced parents are not in the graph.
    #[error("parent events not found: {}", short_list(.0))]
    ParentNotFound(Vec<EventId>),

    /// The parent count does not match what the event kind requires.
    #[error("{kind} event requires {expected} parents, found {found}")]
    InvalidParentArity {
        kind: EventKind,
        expected: &'static str,
        found: usize,
    },

    /// Event not found in the graph.
    #[error("event not found: {0}")]
    EventNotFound(EventId),
}

fn short_list(ids: &[EventId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

/// Trait for append-only causal event storage.
pub trait EventStore<S> {
    /// Get an event by id.
    fn get(&self, id: &EventId) -> Option<&CausalEvent<S>>;

    /// Validate and store a candidate, returning the stored event.
    ///
    /// The graph assigns the id and timestamp. Nothing is written if
    /// validation fails.
    fn insert(&mut self, candidate: EventBuilder<S>) -> Result<&CausalEvent<S>, GraphError>;

    /// Check if an event exists.
    fn contains(&self, id: &EventId) -> bool;

    /// All proper ancestors of an event, in breadth-first discovery order.
    fn ancestors(&self, id: &EventId) -> Vec<EventId>;

    /// All proper descendants of an event, in breadth-first discovery order.
    fn descendants(&self, id: &EventId) -> Vec<EventId>;

    /// Immediate children of an event, sorted by id.
    fn children(&self, id: &EventId) -> Vec<EventId>;

    /// Events without children, sorted by id.
    fn tips(&self) -> Vec<EventId>;

    /// All events, parents before children.
    fn topological_order(&self) -> Vec<EventId>;

    /// Total number of events.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an event by id, failing with [`GraphError::EventNotFound`].
    fn event(&self, id: &EventId) -> Result<&CausalEvent<S>, GraphError> {
        self.get(id).ok_or(GraphError::EventNotFound(*id))
    }

    /// Check whether `ancestor` is a proper ancestor of `id`.
    fn is_ancestor(&self, ancestor: &EventId, id: &EventId) -> bool {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<EventId> = match self.get(id) {
            Some(event) => event.caused_by.iter().copied().collect(),
            None => return false,
        };

        while let Some(current) = queue.pop_front() {
            if current == *ancestor {
                return true;
            }
            if seen.insert(current) {
                if let Some(event) = self.get(&current) {
                    queue.extend(event.caused_by.iter().copied());
                }
            }
        }

        false
    }

    /// Nearest event reachable from both `a` and `b` (each counts as its
    /// own ancestor).
    ///
    /// Among all common ancestors the one with the greatest timestamp wins;
    /// ties go to the lexicographically smaller id so the answer is
    /// deterministic.
    fn common_ancestor(&self, a: &EventId, b: &EventId) -> Option<EventId> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }

        let mut from_a: HashSet<EventId> = self.ancestors(a).into_iter().collect();
        from_a.insert(*a);

        let mut from_b = self.ancestors(b);
        from_b.push(*b);

        from_b
            .into_iter()
            .filter(|id| from_a.contains(id))
            .filter_map(|id| self.get(&id).map(|event| (event.timestamp, id)))
            .max_by(|(ts_x, id_x), (ts_y, id_y)| ts_x.cmp(ts_y).then_with(|| id_y.cmp(id_x)))
            .map(|(_, id)| id)
    }
}

/// In-memory implementation of [`EventStore`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryEventGraph<S> {
    /// All events indexed by id.
    events: HashMap<EventId, CausalEvent<S>>,

    /// Reverse index: parent -> children.
    children_index: HashMap<EventId, BTreeSet<EventId>>,

    /// Events without children.
    tips: BTreeSet<EventId>,

    /// Last timestamp handed out; the next one is strictly greater.
    last_timestamp: u64,
}

impl<S> Default for MemoryEventGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MemoryEventGraph<S> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        MemoryEventGraph {
            events: HashMap::new(),
            children_index: HashMap::new(),
            tips: BTreeSet::new(),
            last_timestamp: 0,
        }
    }

    /// Create a graph holding a single root `Set` event.
    pub fn with_root(candidate: EventBuilder<S>) -> Result<(Self, EventId), GraphError> {
        let mut graph = Self::new();
        let id = graph.insert(candidate.with_parents(Vec::new()))?.id;
        Ok((graph, id))
    }

    /// Events without parents.
    pub fn roots(&self) -> Vec<EventId> {
        let mut roots: Vec<EventId> = self
            .events
            .values()
            .filter(|event| event.is_root())
            .map(|event| event.id)
            .collect();
        roots.sort();
        roots
    }

    /// Iterate over all events in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &CausalEvent<S>> {
        self.events.values()
    }

    /// Get statistics about the graph.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_events: self.events.len(),
            tip_count: self.tips.len(),
            merge_count: self.events.values().filter(|e| e.is_merge()).count(),
            max_depth: self.compute_max_depth(),
            avg_branching: self.compute_branching_stats(),
        }
    }

    /// Pick a timestamp later than every parent and every earlier event.
    fn next_timestamp(&mut self, parents: &[EventId]) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0);
        let parent_max = parents
            .iter()
            .filter_map(|p| self.events.get(p))
            .map(|e| e.timestamp)
            .max()
            .unwrap_or(0);

        let timestamp = now
            .max(self.last_timestamp.saturating_add(1))
            .max(parent_max.saturating_add(1));
        self.last_timestamp = timestamp;
        timestamp
    }

    fn validate(&self, candidate: &EventBuilder<S>) -> Result<(), GraphError> {
        let kind = candidate.kind;
        let parents = &candidate.caused_by;

        let distinct = parents.iter().collect::<HashSet<_>>().len() == parents.len();
        if !kind.accepts_parents(parents.len()) || !distinct {
            return Err(GraphError::InvalidParentArity {
                kind,
                expected: kind.expected_parents(),
                found: parents.len(),
            });
        }

        let missing: Vec<EventId> = parents
            .iter()
            .filter(|p| !self.events.contains_key(p))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(GraphError::ParentNotFound(missing));
        }

        Ok(())
    }

    fn compute_max_depth(&self) -> usize {
        let mut depths: HashMap<EventId, usize> = HashMap::new();

        for id in self.topological_order() {
            if let Some(event) = self.events.get(&id) {
                let parent_depth = event
                    .caused_by
                    .iter()
                    .filter_map(|p| depths.get(p))
                    .max()
                    .copied()
                    .unwrap_or(0);
                depths.insert(id, parent_depth + 1);
            }
        }

        depths.values().max().copied().unwrap_or(0)
    }

    fn compute_branching_stats(&self) -> f64 {
        if self.children_index.is_empty() {
            return 0.0;
        }

        let total_children: usize = self.children_index.values().map(|c| c.len()).sum();

        total_children as f64 / self.children_index.len() as f64
    }
}

impl<S> EventStore<S> for MemoryEventGraph<S> {
    fn get(&self, id: &EventId) -> Option<&CausalEvent<S>> {
        self.events.get(id)
    }

    fn insert(&mut self, candidate: EventBuilder<S>) -> Result<&CausalEvent<S>, GraphError> {
        self.validate(&candidate)?;

        let id = EventId::new();
        let timestamp = self.next_timestamp(&candidate.caused_by);
        let event = candidate.finish(id, timestamp);

        for parent in &event.caused_by {
            self.children_index.entry(*parent).or_default().insert(id);
            self.tips.remove(parent);
        }
        self.tips.insert(id);

        trace!(
            event = %id,
            kind = %event.kind,
            universe = %event.universe_id,
            parents = event.caused_by.len(),
            "inserted event"
        );

        let stored = self.events.entry(id).or_insert(event);
        Ok(&*stored)
    }

    fn contains(&self, id: &EventId) -> bool {
        self.events.contains_key(id)
    }

    fn ancestors(&self, id: &EventId) -> Vec<EventId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut queue = VecDeque::new();

        if let Some(event) = self.events.get(id) {
            queue.extend(event.caused_by.iter().copied());
        }

        while let Some(current) = queue.pop_front() {
            if current != *id && seen.insert(current) {
                result.push(current);
                if let Some(event) = self.events.get(&current) {
                    queue.extend(event.caused_by.iter().copied());
                }
            }
        }

        result
    }

    fn descendants(&self, id: &EventId) -> Vec<EventId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut queue: VecDeque<EventId> = self.children(id).into();

        while let Some(current) = queue.pop_front() {
            if current != *id && seen.insert(current) {
                result.push(current);
                queue.extend(self.children(&current));
            }
        }

        result
    }

    fn children(&self, id: &EventId) -> Vec<EventId> {
        self.children_index
            .get(id)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default()
    }

    fn tips(&self) -> Vec<EventId> {
        self.tips.iter().copied().collect()
    }

    fn topological_order(&self) -> Vec<EventId> {
        // Kahn's algorithm; ready events are released oldest first.
        let mut in_degree: HashMap<EventId, usize> = HashMap::new();
        let mut ready = BinaryHeap::new();
        let mut result = Vec::with_capacity(self.events.len());

        for (id, event) in &self.events {
            let degree = event
                .caused_by
                .iter()
                .filter(|p| self.events.contains_key(p))
                .count();
            in_degree.insert(*id, degree);

            if degree == 0 {
                ready.push(Reverse((event.timestamp, *id)));
            }
        }

        while let Some(Reverse((_, id))) = ready.pop() {
            result.push(id);

            for child in self.children_index.get(&id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        if let Some(event) = self.events.get(child) {
                            ready.push(Reverse((event.timestamp, *child)));
                        }
                    }
                }
            }
        }

        result
    }

    fn len(&self) -> usize {
        self.events.len()
    }
}

/// Statistics about an event graph.
#[derive(Clone, Debug)]
pub struct GraphStats {
    pub total_events: usize,
    pub tip_count: usize,
    pub merge_count: usize,
    pub max_depth: usize,
    pub avg_branching: f64,
}
