//! The causal store: one event graph, many universes.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::merge::{MergePreview, MergeSides, MergeStrategy};
use crate::universe::{Universe, Universes};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use weave_graph::{CausalEvent, EventBuilder, EventId, EventStore, MemoryEventGraph, UniverseId};

/// State that can live in a store.
///
/// Snapshots are compared structurally through their `serde_json`
/// representation, so any serializable value with equality works.
pub trait Snapshot: Clone + PartialEq + Serialize + DeserializeOwned {}

impl<T> Snapshot for T where T: Clone + PartialEq + Serialize + DeserializeOwned {}

/// A branchable, append-only log of state snapshots for one key.
///
/// All mutation goes through `&mut self`: the store has a single writer.
/// Share it between tasks by putting it behind one owner (a mutex or an
/// actor).
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use weave_store::{CausalStore, Resolution, MergeStrategy};
/// use weave_diff::Path;
///
/// let mut store = CausalStore::new("counter", json!({"count": 0})).unwrap();
/// let main = store.current_universe_id();
///
/// store.set(json!({"count": 1})).unwrap();
/// let b1 = store.create_universe("b1", main).unwrap();
///
/// store.switch_to(b1).unwrap();
/// store.set(json!({"count": 5})).unwrap();
/// store.switch_to(main).unwrap();
/// store.set(json!({"count": 10})).unwrap();
///
/// let mut preview = store.preview_merge(b1, main, MergeStrategy::ThreeWay).unwrap();
/// preview.resolve(Path::key("count"), Resolution::AcceptSource).unwrap();
/// store.execute_merge(b1, main, &preview).unwrap();
///
/// assert_eq!(store.get().unwrap(), &json!({"count": 5}));
/// ```
#[derive(Clone, Debug)]
pub struct CausalStore<S> {
    key: String,
    config: StoreConfig,
    graph: MemoryEventGraph<S>,
    universes: Universes,
    current: UniverseId,
}

impl<S: Snapshot> CausalStore<S> {
    /// Create a store with the default configuration.
    pub fn new(key: impl Into<String>, initial: S) -> Result<Self> {
        Self::with_config(key, initial, StoreConfig::default())
    }

    /// Create a store whose initial universe starts at `initial`.
    pub fn with_config(key: impl Into<String>, initial: S, config: StoreConfig) -> Result<Self> {
        let key = key.into();
        let main = UniverseId::new();

        let (graph, root) = MemoryEventGraph::with_root(
            EventBuilder::set(initial)
                .with_universe(main)
                .with_store_key(key.clone()),
        )?;

        let mut universes = Universes::new();
        universes.register(Universe::new(main, config.initial_universe.clone(), root));

        debug!(store = %key, universe = %main, root = %root, "created store");

        Ok(Self {
            key,
            config,
            graph,
            universes,
            current: main,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read-only access to the underlying event graph.
    pub fn graph(&self) -> &MemoryEventGraph<S> {
        &self.graph
    }

    // === Branches ===

    /// Fork a new universe off `fork_from`'s current head.
    ///
    /// The new universe starts with a branch-point event carrying the source
    /// head's value. The current universe does not change.
    pub fn create_universe(&mut self, name: impl Into<String>, fork_from: UniverseId) -> Result<UniverseId> {
        let source_head = self.head_of(fork_from)?;
        let value = self.graph.event(&source_head)?.value.clone();

        let id = UniverseId::new();
        let name = name.into();
        let first = self
            .graph
            .insert(
                EventBuilder::branch_point(value, source_head)
                    .with_universe(id)
                    .with_store_key(self.key.clone()),
            )?
            .id;

        debug!(store = %self.key, universe = %id, name = %name, from = %fork_from, "created universe");
        self.universes.register(Universe::new(id, name, first));
        Ok(id)
    }

    /// Make `id` the universe used by [`set`](Self::set) and [`get`](Self::get).
    pub fn switch_to(&mut self, id: UniverseId) -> Result<()> {
        if !self.universes.contains(&id) {
            return Err(StoreError::UnknownBranch(id));
        }
        debug!(store = %self.key, universe = %id, "switched universe");
        self.current = id;
        Ok(())
    }

    /// All universes in creation order.
    pub fn list_universes(&self) -> Vec<&Universe> {
        self.universes.iter().collect()
    }

    pub fn universe(&self, id: UniverseId) -> Option<&Universe> {
        self.universes.get(&id)
    }

    pub fn universe_by_name(&self, name: &str) -> Option<&Universe> {
        self.universes.by_name(name)
    }

    pub fn current_universe_id(&self) -> UniverseId {
        self.current
    }

    pub fn current_universe(&self) -> Option<&Universe> {
        self.universes.get(&self.current)
    }

    /// Head event of a universe.
    pub fn head_of(&self, id: UniverseId) -> Result<EventId> {
        self.universes
            .get(&id)
            .map(|u| u.head)
            .ok_or(StoreError::UnknownBranch(id))
    }

    /// Linear history of a universe, oldest first.
    ///
    /// Walks primary parents from the head back to the store root, so a
    /// forked universe's history includes its source's events up to the
    /// fork. Merged-in parents are not followed.
    pub fn history_of(&self, id: UniverseId) -> Result<Vec<&CausalEvent<S>>> {
        let mut cursor = Some(self.head_of(id)?);
        let mut history = Vec::new();

        while let Some(event_id) = cursor {
            let event = self.graph.event(&event_id)?;
            history.push(event);
            cursor = event.primary_parent();
        }

        history.reverse();
        Ok(history)
    }

    // === State ===

    /// Record a new snapshot in the current universe.
    pub fn set(&mut self, value: S) -> Result<&CausalEvent<S>> {
        self.set_in(self.current, value)
    }

    /// Record a new snapshot in `universe` without switching to it.
    pub fn set_in(&mut self, universe: UniverseId, value: S) -> Result<&CausalEvent<S>> {
        let head = self.head_of(universe)?;
        let id = self
            .graph
            .insert(
                EventBuilder::set(value)
                    .with_parent(head)
                    .with_universe(universe)
                    .with_store_key(self.key.clone()),
            )?
            .id;

        self.universes.advance(&universe, id);
        debug!(store = %self.key, universe = %universe, event = %id, "set");
        Ok(self.graph.event(&id)?)
    }

    /// Value at the current universe's head.
    pub fn get(&self) -> Result<&S> {
        self.get_in(self.current)
    }

    /// Value at `universe`'s head.
    pub fn get_in(&self, universe: UniverseId) -> Result<&S> {
        let head = self.head_of(universe)?;
        Ok(&self.graph.event(&head)?.value)
    }

    /// Value recorded by a specific event.
    pub fn value_at(&self, id: &EventId) -> Result<&S> {
        Ok(&self.graph.event(id)?.value)
    }

    // === Queries ===

    pub fn get_event(&self, id: &EventId) -> Option<&CausalEvent<S>> {
        self.graph.get(id)
    }

    pub fn ancestors_of(&self, id: &EventId) -> Vec<EventId> {
        self.graph.ancestors(id)
    }

    pub fn descendants_of(&self, id: &EventId) -> Vec<EventId> {
        self.graph.descendants(id)
    }

    pub fn common_ancestor(&self, a: &EventId, b: &EventId) -> Option<EventId> {
        self.graph.common_ancestor(a, b)
    }

    // === Merging ===

    /// Preview merging `source` into `target` with the configured default
    /// strategy.
    pub fn preview(&self, source: UniverseId, target: UniverseId) -> Result<MergePreview> {
        self.preview_merge(source, target, self.config.default_strategy)
    }

    /// Diff `source` against `target` relative to their common ancestor.
    pub fn preview_merge(
        &self,
        source: UniverseId,
        target: UniverseId,
        strategy: MergeStrategy,
    ) -> Result<MergePreview> {
        let source_head = self.head_of(source)?;
        let target_head = self.head_of(target)?;
        let base = self.graph.common_ancestor(&source_head, &target_head);

        let base_value = match base {
            Some(id) => Some(serde_json::to_value(&self.graph.event(&id)?.value)?),
            None => None,
        };

        let preview = MergePreview::compute(
            MergeSides {
                source,
                target,
                source_head,
                target_head,
                base,
                source_value: serde_json::to_value(&self.graph.event(&source_head)?.value)?,
                target_value: serde_json::to_value(&self.graph.event(&target_head)?.value)?,
                base_value,
            },
            strategy,
        )?;

        debug!(
            store = %self.key,
            source = %source,
            target = %target,
            conflicts = preview.conflicts.len(),
            changes = preview.changes.len(),
            "previewed merge"
        );
        Ok(preview)
    }

    /// Record the merge described by `preview` as a new event in `target`.
    ///
    /// The merge event's parents are `[target_head, source_head]`. The source
    /// universe is never modified.
    pub fn execute_merge(
        &mut self,
        source: UniverseId,
        target: UniverseId,
        preview: &MergePreview,
    ) -> Result<&CausalEvent<S>> {
        let (source_head, target_head, value) = self
            .check_merge(source, target, preview)
            .map_err(|err| {
                warn!(store = %self.key, source = %source, target = %target, error = %err, "merge rejected");
                err
            })?;

        let id = self
            .graph
            .insert(
                EventBuilder::merge(value, target_head, source_head)
                    .with_universe(target)
                    .with_store_key(self.key.clone()),
            )?
            .id;

        self.universes.advance(&target, id);
        info!(
            store = %self.key,
            source = %source,
            target = %target,
            event = %id,
            resolutions = preview.resolutions().len(),
            "merged universes"
        );
        Ok(self.graph.event(&id)?)
    }

    /// Preview and execute in one step; fails if anything needs resolving.
    pub fn merge(
        &mut self,
        source: UniverseId,
        target: UniverseId,
        strategy: MergeStrategy,
    ) -> Result<&CausalEvent<S>> {
        let preview = self.preview_merge(source, target, strategy)?;
        self.execute_merge(source, target, &preview)
    }

    fn check_merge(
        &self,
        source: UniverseId,
        target: UniverseId,
        preview: &MergePreview,
    ) -> Result<(EventId, EventId, S)> {
        if source == target {
            return Err(StoreError::SelfMerge);
        }
        let source_head = self.head_of(source)?;
        let target_head = self.head_of(target)?;

        if preview.source() != source
            || preview.target() != target
            || preview.source_head() != source_head
            || preview.target_head() != target_head
        {
            return Err(StoreError::StalePreview);
        }

        let state = preview.ensure_mergeable()?;
        let value: S = serde_json::from_value(state.clone())?;
        Ok((source_head, target_head, value))
    }
}
