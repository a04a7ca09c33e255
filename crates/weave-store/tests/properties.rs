//! Property-based tests over random store workloads.
//!
//! A script of writes, forks and merges is replayed against a fresh store;
//! afterwards every graph and universe invariant is checked.

use proptest::prelude::*;
use serde_json::{json, Value};
use weave_store::{CausalStore, EventKind, EventStore, MergeStrategy, StoreError, UniverseId};

#[derive(Clone, Debug)]
enum Op {
    Set(usize, Value),
    Fork(usize),
    Merge(usize, usize, MergeStrategy),
}

fn state_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-c]", 0i64..4, 0..3).prop_map(|m| json!(m))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let strategy = prop_oneof![
        Just(MergeStrategy::Ours),
        Just(MergeStrategy::Theirs),
        Just(MergeStrategy::ThreeWay),
    ];
    prop_oneof![
        4 => (any::<usize>(), state_strategy()).prop_map(|(u, v)| Op::Set(u, v)),
        1 => any::<usize>().prop_map(Op::Fork),
        2 => (any::<usize>(), any::<usize>(), strategy).prop_map(|(s, t, st)| Op::Merge(s, t, st)),
    ]
}

fn run(ops: &[Op]) -> (CausalStore<Value>, Vec<UniverseId>) {
    let mut store = CausalStore::new("prop", json!({})).unwrap();
    let mut universes = vec![store.current_universe_id()];

    for op in ops {
        match op {
            Op::Set(u, value) => {
                let universe = universes[u % universes.len()];
                store.set_in(universe, value.clone()).unwrap();
            }
            Op::Fork(u) => {
                let from = universes[u % universes.len()];
                let name = format!("u{}", universes.len());
                universes.push(store.create_universe(name, from).unwrap());
            }
            Op::Merge(s, t, strategy) => {
                let source = universes[s % universes.len()];
                let target = universes[t % universes.len()];
                let source_head = store.head_of(source).unwrap();
                let target_head = store.head_of(target).unwrap();

                let outcome = store
                    .merge(source, target, *strategy)
                    .map(|event| (event.caused_by.clone(), event.universe_id));

                match outcome {
                    Ok((parents, universe)) => {
                        assert_eq!(parents, vec![target_head, source_head]);
                        assert_eq!(universe, target);
                    }
                    Err(StoreError::SelfMerge) => assert_eq!(source, target),
                    Err(StoreError::UnresolvedConflicts(paths)) => {
                        assert_eq!(*strategy, MergeStrategy::ThreeWay);
                        assert!(!paths.is_empty());
                        assert_eq!(store.head_of(target).unwrap(), target_head);
                    }
                    Err(other) => panic!("unexpected merge error: {other}"),
                }
                if source != target {
                    assert_eq!(store.head_of(source).unwrap(), source_head);
                }
            }
        }
    }

    (store, universes)
}

proptest! {
    #[test]
    fn graph_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (store, _) = run(&ops);
        let graph = store.graph();

        let roots: Vec<_> = graph.iter().filter(|e| e.is_root()).collect();
        prop_assert_eq!(roots.len(), 1);

        for event in graph.iter() {
            prop_assert!(event.kind.accepts_parents(event.caused_by.len()));
            if event.kind == EventKind::Merge {
                prop_assert_eq!(event.caused_by.len(), 2);
            }
            for parent in &event.caused_by {
                let parent = graph.get(parent);
                prop_assert!(parent.is_some());
                prop_assert!(event.timestamp >= parent.unwrap().timestamp);
            }
            prop_assert!(!graph.ancestors(&event.id).contains(&event.id));
        }
    }

    #[test]
    fn heads_reachable_from_universe_roots(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (store, universes) = run(&ops);
        let store_root = store.graph().roots()[0];

        for id in universes {
            let universe = store.universe(id).unwrap();
            let history = store.history_of(id).unwrap();

            prop_assert_eq!(history.first().map(|e| e.id), Some(store_root));
            prop_assert_eq!(history.last().map(|e| e.id), Some(universe.head));
            prop_assert!(history.iter().any(|e| e.id == universe.root));

            // Past the universe root, the primary chain stays in the universe.
            let start = history.iter().position(|e| e.id == universe.root).unwrap();
            prop_assert!(history[start..].iter().all(|e| e.universe_id == id));
        }
    }

    #[test]
    fn forks_start_from_source_value(
        ops in prop::collection::vec(op_strategy(), 0..20),
        pick in any::<usize>(),
    ) {
        let (mut store, universes) = run(&ops);
        let from = universes[pick % universes.len()];
        let expected = store.get_in(from).unwrap().clone();

        let fork = store.create_universe("fork", from).unwrap();
        store.switch_to(fork).unwrap();
        prop_assert_eq!(store.get().unwrap(), &expected);
    }
}
