//! Merge previews, strategies and conflict resolution.
//!
//! A merge always folds a *source* universe into a *target* universe.
//! "Ours" is the target side and "theirs" is the source side, as in git when
//! merging a branch into the checked-out one.
//!
//! A [`MergePreview`] is a pure value: computing or resolving it never
//! touches the store. Only [`CausalStore::execute_merge`] writes, and it
//! refuses previews whose heads have moved since they were computed.
//!
//! [`CausalStore::execute_merge`]: crate::CausalStore::execute_merge

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use weave_diff::{apply_changes, diff, get_path, DiffKind, Path, PathDiff};
use weave_graph::{EventId, UniverseId};

/// How non-conflicting changes (and, for `Ours`/`Theirs`, conflicts) are
/// decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Target wins everywhere; the source contributes nothing unless a
    /// resolution says otherwise.
    Ours,
    /// Source wins on every differing path.
    Theirs,
    /// Each side keeps the paths only it changed relative to the common
    /// ancestor; true conflicts must be resolved by the caller.
    #[default]
    ThreeWay,
}

impl MergeStrategy {
    /// Whether conflicts are settled by the strategy itself.
    pub fn resolves_conflicts(&self) -> bool {
        !matches!(self, MergeStrategy::ThreeWay)
    }
}

/// Caller decision for one path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "value")]
pub enum Resolution {
    AcceptSource,
    AcceptTarget,
    AcceptBase,
    /// Use this exact value.
    Manual(Value),
}

/// The outcome of diffing two universes, plus any resolutions supplied so
/// far.
#[derive(Clone, Debug, PartialEq)]
pub struct MergePreview {
    source: UniverseId,
    target: UniverseId,
    source_head: EventId,
    target_head: EventId,
    base: Option<EventId>,
    strategy: MergeStrategy,

    /// Paths both sides changed differently since the common ancestor.
    pub conflicts: Vec<PathDiff>,
    /// Added, removed and changed paths.
    pub changes: Vec<PathDiff>,

    resolutions: BTreeMap<Path, Resolution>,
    source_value: Value,
    target_value: Value,
    base_value: Option<Value>,

    can_auto_merge: bool,
    preview_state: Option<Value>,
}

/// Inputs needed to build a preview; gathered by the store.
pub(crate) struct MergeSides {
    pub source: UniverseId,
    pub target: UniverseId,
    pub source_head: EventId,
    pub target_head: EventId,
    pub base: Option<EventId>,
    pub source_value: Value,
    pub target_value: Value,
    pub base_value: Option<Value>,
}

impl MergePreview {
    pub(crate) fn compute(sides: MergeSides, strategy: MergeStrategy) -> Result<Self> {
        let (conflicts, changes): (Vec<PathDiff>, Vec<PathDiff>) = diff(
            &sides.source_value,
            &sides.target_value,
            sides.base_value.as_ref(),
        )
        .into_iter()
        .partition(|d| d.kind == DiffKind::Conflict);

        let mut preview = MergePreview {
            source: sides.source,
            target: sides.target,
            source_head: sides.source_head,
            target_head: sides.target_head,
            base: sides.base,
            strategy,
            conflicts,
            changes,
            resolutions: BTreeMap::new(),
            source_value: sides.source_value,
            target_value: sides.target_value,
            base_value: sides.base_value,
            can_auto_merge: false,
            preview_state: None,
        };

        let state = preview.materialize(&preview.resolutions)?;
        preview.can_auto_merge = state.is_some();
        preview.preview_state = state;
        Ok(preview)
    }

    /// Record a resolution for `path` and recompute the merged state.
    ///
    /// A later resolution for the same path replaces the earlier one. The
    /// preview is left untouched if the resolution cannot be applied.
    pub fn resolve(&mut self, path: Path, resolution: Resolution) -> Result<()> {
        let mut resolutions = self.resolutions.clone();
        resolutions.insert(path, resolution);

        let state = self.materialize(&resolutions)?;
        self.resolutions = resolutions;
        self.can_auto_merge = state.is_some();
        self.preview_state = state;
        Ok(())
    }

    /// Conflict paths that still need a resolution.
    pub fn unresolved(&self) -> Vec<Path> {
        Self::unresolved_with(&self.conflicts, self.strategy, &self.resolutions)
    }

    pub fn can_auto_merge(&self) -> bool {
        self.can_auto_merge
    }

    /// The state a merge would record; `None` while conflicts remain.
    pub fn preview_state(&self) -> Option<&Value> {
        self.preview_state.as_ref()
    }

    pub fn resolutions(&self) -> &BTreeMap<Path, Resolution> {
        &self.resolutions
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    pub fn source(&self) -> UniverseId {
        self.source
    }

    pub fn target(&self) -> UniverseId {
        self.target
    }

    pub fn source_head(&self) -> EventId {
        self.source_head
    }

    pub fn target_head(&self) -> EventId {
        self.target_head
    }

    /// Common ancestor used as the merge base.
    pub fn base(&self) -> Option<EventId> {
        self.base
    }

    /// Check whether there is nothing to merge.
    pub fn is_noop(&self) -> bool {
        self.conflicts.is_empty() && self.changes.is_empty()
    }

    pub(crate) fn ensure_mergeable(&self) -> Result<&Value> {
        match self.preview_state.as_ref() {
            Some(state) if self.can_auto_merge => Ok(state),
            _ => Err(StoreError::UnresolvedConflicts(self.unresolved())),
        }
    }

    fn unresolved_with(
        conflicts: &[PathDiff],
        strategy: MergeStrategy,
        resolutions: &BTreeMap<Path, Resolution>,
    ) -> Vec<Path> {
        if strategy.resolves_conflicts() {
            return Vec::new();
        }
        conflicts
            .iter()
            .filter(|c| !resolutions.contains_key(&c.path))
            .map(|c| c.path.clone())
            .collect()
    }

    /// Build the merged state, or `None` if conflicts are unresolved.
    fn materialize(&self, resolutions: &BTreeMap<Path, Resolution>) -> Result<Option<Value>> {
        if !Self::unresolved_with(&self.conflicts, self.strategy, resolutions).is_empty() {
            return Ok(None);
        }

        let mut leaves: BTreeMap<Path, Option<Value>> = BTreeMap::new();

        for change in &self.changes {
            if let Some(leaf) = self.pick_change(change) {
                leaves.insert(change.path.clone(), leaf);
            }
        }

        if self.strategy == MergeStrategy::Theirs {
            for conflict in &self.conflicts {
                leaves.insert(conflict.path.clone(), conflict.source_value.clone());
            }
        }

        // A resolution owns its whole subtree.
        leaves.retain(|path, _| !resolutions.keys().any(|resolved| path.starts_with(resolved)));

        let mut state = self.target_value.clone();
        apply_changes(&mut state, leaves)?;
        apply_changes(
            &mut state,
            resolutions
                .iter()
                .map(|(path, resolution)| (path.clone(), self.resolved_value(path, resolution))),
        )?;
        Ok(Some(state))
    }

    /// Leaf value to write for a non-conflicting change; `None` keeps the
    /// target's value.
    fn pick_change(&self, change: &PathDiff) -> Option<Option<Value>> {
        match self.strategy {
            MergeStrategy::Ours => None,
            MergeStrategy::Theirs => Some(change.source_value.clone()),
            MergeStrategy::ThreeWay if self.base_value.is_some() => {
                // Not a conflict, so at most one side moved off the base.
                if change.target_value == change.base_value {
                    Some(change.source_value.clone())
                } else {
                    None
                }
            }
            // Without a base, keep whatever either side has and let the
            // source win where both hold a value.
            MergeStrategy::ThreeWay => match change.kind {
                DiffKind::Added => None,
                DiffKind::Removed | DiffKind::Changed | DiffKind::Conflict => {
                    Some(change.source_value.clone())
                }
            },
        }
    }

    fn resolved_value(&self, path: &Path, resolution: &Resolution) -> Option<Value> {
        match resolution {
            Resolution::AcceptSource => get_path(&self.source_value, path).cloned(),
            Resolution::AcceptTarget => get_path(&self.target_value, path).cloned(),
            Resolution::AcceptBase => self
                .base_value
                .as_ref()
                .and_then(|base| get_path(base, path))
                .cloned(),
            Resolution::Manual(value) => Some(value.clone()),
        }
    }
}
