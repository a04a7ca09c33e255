//! Universes: named timelines sharing one event graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use weave_graph::{EventId, UniverseId};

/// A named branch with a moving head.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    pub id: UniverseId,
    pub name: String,
    /// Most recent event written in this universe.
    pub head: EventId,
    /// First event of this universe (the branch point, or the store root).
    pub root: EventId,
    pub created_at: DateTime<Utc>,
}

impl Universe {
    pub(crate) fn new(id: UniverseId, name: impl Into<String>, first_event: EventId) -> Self {
        Self {
            id,
            name: name.into(),
            head: first_event,
            root: first_event,
            created_at: Utc::now(),
        }
    }
}

/// Registry of universes, kept in creation order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Universes {
    by_id: HashMap<UniverseId, Universe>,
    order: Vec<UniverseId>,
}

impl Universes {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, universe: Universe) {
        let id = universe.id;
        if self.by_id.insert(id, universe).is_none() {
            self.order.push(id);
        }
    }

    /// Move a universe's head. Returns false if the universe is unknown.
    pub(crate) fn advance(&mut self, id: &UniverseId, head: EventId) -> bool {
        match self.by_id.get_mut(id) {
            Some(universe) => {
                universe.head = head;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &UniverseId) -> Option<&Universe> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &UniverseId) -> bool {
        self.by_id.contains_key(id)
    }

    /// First universe created with this name.
    pub fn by_name(&self, name: &str) -> Option<&Universe> {
        self.iter().find(|u| u.name == name)
    }

    /// Iterate in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Universe> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_advance() {
        let mut universes = Universes::new();
        let first = EventId::new();
        let main = UniverseId::new();
        universes.register(Universe::new(main, "main", first));

        let next = EventId::new();
        assert!(universes.advance(&main, next));
        let u = universes.get(&main).unwrap();
        assert_eq!(u.head, next);
        assert_eq!(u.root, first);

        assert!(!universes.advance(&UniverseId::new(), next));
    }

    #[test]
    fn test_creation_order_and_names() {
        let mut universes = Universes::new();
        let ids: Vec<UniverseId> = (0..3).map(|_| UniverseId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            universes.register(Universe::new(*id, format!("u{}", i), EventId::new()));
        }

        let listed: Vec<UniverseId> = universes.iter().map(|u| u.id).collect();
        assert_eq!(listed, ids);
        assert_eq!(universes.by_name("u1").map(|u| u.id), Some(ids[1]));
        assert!(universes.by_name("nope").is_none());
        assert_eq!(universes.len(), 3);
    }
}
