//! Randomized checks of reachability and trace equivalence.
//!
//! Graphs are generated from fixed seeds and may contain cycles, self loops,
//! repeated labels, and states the initial state never reaches. Oracle
//! answers are compared against a transitive closure computed directly.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use std::collections::BTreeSet;

use evstruct_graph::reachability::{is_immediate_predecessor, reachable};
use evstruct_graph::{TransitionGraph, trace_divergence, trace_equivalent};
use evstruct_types::{Event, StateId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const ACTIONS: [&str; 4] = ["a", "b", "c", "d"];

fn random_graph(rng: &mut SmallRng) -> TransitionGraph {
    let states: u32 = rng.random_range(2..=6);
    let edges: usize = rng.random_range(0..=10);
    let mut builder = TransitionGraph::builder();
    builder.add_actions(ACTIONS).unwrap();
    builder.add_states((0..states).map(StateId::new)).unwrap();
    builder.set_initial(StateId::new(0)).unwrap();
    for _ in 0..edges {
        let source = StateId::new(rng.random_range(0..states));
        let target = StateId::new(rng.random_range(0..states));
        let action = ACTIONS[rng.random_range(0..ACTIONS.len())];
        builder.add_transition(source, action, target).unwrap();
    }
    builder.build().unwrap()
}

/// States reachable from `from` in zero or more steps.
fn closure(graph: &TransitionGraph, from: StateId) -> BTreeSet<StateId> {
    let mut seen = BTreeSet::from([from]);
    let mut changed = true;
    while changed {
        changed = false;
        for transition in graph.transitions() {
            if seen.contains(&transition.source()) && seen.insert(transition.target()) {
                changed = true;
            }
        }
    }
    seen
}

fn expected_reachable(graph: &TransitionGraph, from: &Event, to: &Event) -> bool {
    graph.transitions_labeled(from).any(|transition| {
        closure(graph, transition.target())
            .into_iter()
            .any(|state| graph.enabled_actions(state).contains(to))
    })
}

fn expected_immediate(graph: &TransitionGraph, from: &Event, to: &Event) -> bool {
    graph
        .transitions_labeled(from)
        .any(|transition| graph.enabled_actions(transition.target()).contains(to))
}

#[test]
fn oracle_matches_transitive_closure() {
    let mut rng = SmallRng::seed_from_u64(42);
    for round in 0..50 {
        let graph = random_graph(&mut rng);
        for from in ACTIONS {
            for to in ACTIONS {
                let (from, to) = (Event::new(from), Event::new(to));
                assert_eq!(
                    reachable(&graph, &from, &to).unwrap(),
                    expected_reachable(&graph, &from, &to),
                    "round {round}: {from} -> {to}"
                );
                assert_eq!(
                    is_immediate_predecessor(&graph, &from, &to).unwrap(),
                    expected_immediate(&graph, &from, &to),
                    "round {round}: {from} directly before {to}"
                );
            }
        }
    }
}

#[test]
fn immediate_predecessor_implies_reachable() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..30 {
        let graph = random_graph(&mut rng);
        for from in ACTIONS {
            for to in ACTIONS {
                let (from, to) = (Event::new(from), Event::new(to));
                if is_immediate_predecessor(&graph, &from, &to).unwrap() {
                    assert!(reachable(&graph, &from, &to).unwrap());
                }
            }
        }
    }
}

#[test]
fn view_round_trip_preserves_graph() {
    let mut rng = SmallRng::seed_from_u64(99);
    for _ in 0..20 {
        let graph = random_graph(&mut rng);
        let json = serde_json::to_string(&graph.view()).unwrap();
        let view = serde_json::from_str(&json).unwrap();
        let rebuilt = TransitionGraph::from_view(&view).unwrap();
        assert_eq!(rebuilt, graph);
        assert!(trace_equivalent(&graph, &rebuilt));
    }
}

#[test]
fn extra_transition_yields_a_witness() {
    let mut rng = SmallRng::seed_from_u64(3);
    for _ in 0..20 {
        let graph = random_graph(&mut rng);
        assert_eq!(trace_divergence(&graph, &graph), None);

        // An action the initial state does not enable yet: a fresh one.
        let mut builder = TransitionGraph::builder();
        builder.add_actions(ACTIONS).unwrap();
        builder.add_action("fresh").unwrap();
        builder.add_states(graph.states().iter().copied()).unwrap();
        builder.set_initial(graph.initial_state()).unwrap();
        for transition in graph.transitions() {
            builder
                .add_transition(
                    transition.source(),
                    transition.action().clone(),
                    transition.target(),
                )
                .unwrap();
        }
        builder
            .add_transition(graph.initial_state(), "fresh", graph.initial_state())
            .unwrap();
        let extended: TransitionGraph = builder.build().unwrap();

        assert_eq!(
            trace_divergence(&graph, &extended),
            Some(vec![Event::new("fresh")])
        );
    }
}
