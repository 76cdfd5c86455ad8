//! Rebuilding a transition graph from an event structure.
//!
//! Each configuration becomes one state; the empty configuration is the
//! initial state. A transition labeled `e` joins the states of `C` and
//! `C ∪ {e}` whenever both are configurations. States are numbered in
//! order of configuration size, then member set, so `s0` is always the
//! empty configuration and numbering is stable across runs.

use std::collections::{BTreeMap, BTreeSet};

use evstruct_graph::TransitionGraph;
use evstruct_structure::EventStructure;
use evstruct_types::{Configuration, Event, FeatureSolver, Guard, Proposition, StateId};
use tracing::info;

use crate::error::CoreError;

/// A reconstructed graph together with the configuration of each state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction<F = Proposition> {
    /// The rebuilt transition graph.
    pub graph: TransitionGraph<F>,
    /// Configuration each state stands for.
    pub states: BTreeMap<StateId, Configuration>,
}

impl<F> Reconstruction<F> {
    /// The configuration behind `state`.
    pub fn configuration(&self, state: StateId) -> Option<&Configuration> {
        self.states.get(&state)
    }

    /// The state standing for `members`, if it is a configuration.
    pub fn state_of(&self, members: &BTreeSet<Event>) -> Option<StateId> {
        self.states
            .iter()
            .find(|(_, configuration)| configuration.members() == members)
            .map(|(state, _)| *state)
    }
}

/// Rebuild an unannotated transition graph from every configuration of
/// `structure`.
///
/// # Errors
///
/// Returns [`CoreError::TooManyStates`] if the configurations outnumber
/// the state labels.
pub fn reconstruct<F: Clone>(structure: &EventStructure) -> Result<Reconstruction<F>, CoreError> {
    assemble(structure, structure.all_configurations(), |_| None)
}

/// Rebuild a feature-annotated transition graph.
///
/// Only configurations whose member features are jointly satisfiable
/// become states, and each transition carries its event's feature.
///
/// # Errors
///
/// Propagates solver failures, or returns [`CoreError::TooManyStates`].
pub fn reconstruct_featured<S: FeatureSolver>(
    structure: &EventStructure,
    features: &BTreeMap<Event, S::Formula>,
    solver: &S,
) -> Result<Reconstruction<S::Formula>, CoreError> {
    let configurations = structure
        .feasible_configurations(features, solver)?
        .into_iter()
        .map(|feasible| feasible.configuration)
        .collect();
    assemble(structure, configurations, |event| features.get(event).cloned())
}

fn assemble<F: Clone>(
    structure: &EventStructure,
    mut configurations: Vec<Configuration>,
    feature_of: impl Fn(&Event) -> Guard<F>,
) -> Result<Reconstruction<F>, CoreError> {
    configurations.sort_by(|left, right| left.len().cmp(&right.len()).then_with(|| left.cmp(right)));

    let mut index: BTreeMap<BTreeSet<Event>, StateId> = BTreeMap::new();
    let mut states: BTreeMap<StateId, Configuration> = BTreeMap::new();
    for (position, configuration) in configurations.into_iter().enumerate() {
        let state = StateId::new(
            u32::try_from(position).map_err(|source| CoreError::TooManyStates { source })?,
        );
        index.insert(configuration.members().clone(), state);
        states.insert(state, configuration);
    }

    let mut builder = TransitionGraph::builder();
    builder.add_actions(structure.events().iter().cloned())?;
    builder.add_states(states.keys().copied())?;
    builder.set_initial(StateId::new(0))?;

    let mut transitions = 0usize;
    for (source, configuration) in &states {
        for event in structure.events() {
            if configuration.contains(event) {
                continue;
            }
            let mut extended = configuration.members().clone();
            extended.insert(event.clone());
            if let Some(target) = index.get(&extended) {
                builder.add_guarded_transition(*source, event.clone(), *target, feature_of(event))?;
                transitions = transitions.saturating_add(1);
            }
        }
    }

    let graph = builder.build()?;
    info!(
        states = states.len(),
        transitions,
        actions = structure.event_count(),
        "Reconstructed transition graph"
    );
    Ok(Reconstruction { graph, states })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use evstruct_types::TruthTableSolver;

    fn ev(name: &str) -> Event {
        Event::new(name)
    }

    fn set(names: &[&str]) -> BTreeSet<Event> {
        names.iter().copied().map(Event::from).collect()
    }

    fn choice() -> EventStructure {
        let mut builder = EventStructure::builder();
        builder.add_events(["a", "b", "c"]).unwrap();
        builder.add_conflict("b", "c").unwrap();
        builder.add_bundle(["a"], "b").unwrap();
        builder.add_bundle(["a"], "c").unwrap();
        builder.build()
    }

    #[test]
    fn exclusive_choice_rebuilds_four_states() {
        let rebuilt = reconstruct::<Proposition>(&choice()).unwrap();
        assert_eq!(rebuilt.graph.state_count(), 4);
        assert_eq!(rebuilt.graph.transition_count(), 3);
        assert_eq!(rebuilt.graph.initial_state(), StateId::new(0));
        assert_eq!(
            rebuilt.configuration(StateId::new(0)).map(Configuration::is_empty),
            Some(true)
        );

        let empty = rebuilt.state_of(&set(&[]));
        let after_a = rebuilt.state_of(&set(&["a"]));
        let after_b = rebuilt.state_of(&set(&["a", "b"]));
        let after_c = rebuilt.state_of(&set(&["a", "c"]));
        assert!(rebuilt.state_of(&set(&["a", "b", "c"])).is_none());

        let edges: BTreeSet<(Option<StateId>, Event, Option<StateId>)> = rebuilt
            .graph
            .transitions()
            .map(|t| (Some(t.source()), t.action().clone(), Some(t.target())))
            .collect();
        assert_eq!(
            edges,
            BTreeSet::from([
                (empty, ev("a"), after_a),
                (after_a, ev("b"), after_b),
                (after_a, ev("c"), after_c),
            ])
        );
    }

    #[test]
    fn linear_chain_rebuilds_a_path() {
        let mut builder = EventStructure::builder();
        builder.add_events(["x", "y", "z"]).unwrap();
        builder.add_bundle(["x"], "y").unwrap();
        builder.add_bundle(["y"], "z").unwrap();
        let rebuilt = reconstruct::<Proposition>(&builder.build()).unwrap();
        assert_eq!(rebuilt.graph.state_count(), 4);
        assert_eq!(rebuilt.graph.transition_count(), 3);
        for state in rebuilt.graph.states() {
            assert!(rebuilt.graph.outgoing(*state).len() <= 1);
        }
    }

    #[test]
    fn empty_structure_rebuilds_single_state() {
        let rebuilt = reconstruct::<Proposition>(&EventStructure::default()).unwrap();
        assert_eq!(rebuilt.graph.state_count(), 1);
        assert_eq!(rebuilt.graph.transition_count(), 0);
    }

    #[test]
    fn featured_reconstruction_prunes_and_annotates() {
        let mut builder = EventStructure::builder();
        builder.add_events(["a", "b"]).unwrap();
        let structure = builder.build();
        let f = Proposition::feature("f");
        let features = BTreeMap::from([(ev("a"), f.clone()), (ev("b"), !f.clone())]);
        let solver = TruthTableSolver::default();
        let rebuilt = reconstruct_featured(&structure, &features, &solver).unwrap();
        // {a, b} is infeasible.
        assert_eq!(rebuilt.graph.state_count(), 3);
        assert!(rebuilt.state_of(&set(&["a", "b"])).is_none());
        let a = ev("a");
        let guard = rebuilt
            .graph
            .transitions_labeled(&a)
            .next()
            .and_then(|t| t.feature().cloned());
        assert_eq!(guard, Some(f));
    }
}
