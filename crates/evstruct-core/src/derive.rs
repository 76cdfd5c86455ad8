//! Deriving an event structure from a transition graph.
//!
//! Every unordered pair of distinct actions is classified by reachability:
//!
//! - neither reaches the other: the actions conflict;
//! - exactly one reaches the other and is also its immediate predecessor:
//!   it joins the other's candidate bundle;
//! - both reach each other: the actions are unrelated (concurrent).
//!
//! Candidate bundles are then split into pairwise-conflicting bundles by
//! [`minimize_bundles`](crate::minimize::minimize_bundles).
//!
//! On feature-annotated graphs each event also receives a feature: the
//! disjunction of the formulas of all transitions carrying its label. An
//! event with any unannotated transition receives none.

use std::collections::{BTreeMap, BTreeSet};

use evstruct_graph::{ReachabilityOracle, TransitionGraph};
use evstruct_structure::{ConflictGraph, EventStructure};
use evstruct_types::{CausalityBundle, ConflictPair, Event, FeatureSolver, Proposition};
use tracing::{debug, info};

use crate::config::DerivationConfig;
use crate::error::CoreError;
use crate::minimize::minimize_bundles;

/// The result of derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedStructure<F = Proposition> {
    /// The derived event structure.
    pub structure: EventStructure,
    /// Feature per event. Events without an entry are unconstrained.
    pub features: BTreeMap<Event, F>,
    /// Candidate bundles before minimization.
    pub candidates: BTreeSet<CausalityBundle>,
}

/// How one ordered pair of actions relates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairRelation {
    Conflict,
    /// The first action precedes the second.
    Precedes,
    /// The second action precedes the first.
    Follows,
    Unrelated,
}

fn classify<S: FeatureSolver>(
    oracle: &ReachabilityOracle<'_, S>,
    first: &Event,
    second: &Event,
) -> Result<PairRelation, CoreError> {
    let forward = oracle.reachable(first, second)?;
    let backward = oracle.reachable(second, first)?;
    let relation = match (forward, backward) {
        (false, false) => PairRelation::Conflict,
        (true, false) if oracle.is_immediate_predecessor(first, second)? => PairRelation::Precedes,
        (false, true) if oracle.is_immediate_predecessor(second, first)? => PairRelation::Follows,
        _ => PairRelation::Unrelated,
    };
    Ok(relation)
}

/// Derive an event structure from `graph`.
///
/// Actions the initial state can never lead to are reported as conflicting
/// with every other action; callers that need exact round trips should
/// check [`TransitionGraph::unreachable_actions`] first.
///
/// # Errors
///
/// Propagates solver failures. Structure errors cannot occur for a graph
/// that passed its own builder.
pub fn derive<S: FeatureSolver>(
    graph: &TransitionGraph<S::Formula>,
    solver: &S,
    config: &DerivationConfig,
) -> Result<DerivedStructure<S::Formula>, CoreError> {
    let oracle = ReachabilityOracle::new(graph, solver);
    let actions: Vec<&Event> = graph.actions().iter().collect();

    let mut conflicts: Vec<ConflictPair> = Vec::new();
    let mut candidate_members: BTreeMap<Event, BTreeSet<Event>> = BTreeMap::new();
    for (position, first) in actions.iter().enumerate() {
        for second in actions.iter().skip(position.saturating_add(1)) {
            match classify(&oracle, first, second)? {
                PairRelation::Conflict => {
                    conflicts.push(ConflictPair::new((*first).clone(), (*second).clone())?);
                }
                PairRelation::Precedes => {
                    candidate_members
                        .entry((*second).clone())
                        .or_default()
                        .insert((*first).clone());
                }
                PairRelation::Follows => {
                    candidate_members
                        .entry((*first).clone())
                        .or_default()
                        .insert((*second).clone());
                }
                PairRelation::Unrelated => {}
            }
        }
    }

    let candidates = candidate_members
        .into_iter()
        .map(|(target, members)| CausalityBundle::new(members, target))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let conflict_graph = ConflictGraph::new(graph.actions(), &conflicts);
    let bundles = if config.minimize_bundles {
        minimize_bundles(candidates.iter().cloned(), &conflict_graph, config.split_order)
    } else {
        candidates.clone()
    };

    let mut builder = EventStructure::builder();
    builder.add_events(graph.actions().iter().cloned())?;
    for pair in &conflicts {
        builder.add_conflict(pair.first().clone(), pair.second().clone())?;
    }
    for bundle in bundles {
        builder.add_causality(bundle)?;
    }
    let structure = builder.build();

    let features = event_features(graph, solver);
    info!(
        events = structure.event_count(),
        conflicts = structure.conflicts().len(),
        candidates = candidates.len(),
        bundles = structure.bundles().len(),
        featured = features.len(),
        "Derived event structure"
    );

    Ok(DerivedStructure {
        structure,
        features,
        candidates,
    })
}

/// Disjunction of transition formulas per action. Actions with an
/// unannotated transition, or none at all, get no entry.
fn event_features<S: FeatureSolver>(
    graph: &TransitionGraph<S::Formula>,
    solver: &S,
) -> BTreeMap<Event, S::Formula> {
    let mut features = BTreeMap::new();
    for action in graph.actions() {
        let mut combined: Option<S::Formula> = None;
        let mut unconstrained = false;
        for transition in graph.transitions_labeled(action) {
            let Some(feature) = transition.feature() else {
                unconstrained = true;
                break;
            };
            combined = Some(match combined {
                Some(existing) => solver.disjoin(&existing, feature),
                None => feature.clone(),
            });
        }
        if unconstrained {
            debug!(action = %action, "Action has an unannotated transition");
            continue;
        }
        if let Some(feature) = combined {
            features.insert(action.clone(), feature);
        }
    }
    features
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use evstruct_types::{StateId, TruthTableSolver};

    fn ev(name: &str) -> Event {
        Event::new(name)
    }

    const fn s(index: u32) -> StateId {
        StateId::new(index)
    }

    fn graph(
        actions: &[&str],
        states: u32,
        transitions: &[(u32, &str, u32, Option<Proposition>)],
    ) -> TransitionGraph {
        let mut builder = TransitionGraph::builder();
        builder.add_actions(actions.iter().copied()).unwrap();
        builder.add_states((0..states).map(s)).unwrap();
        builder.set_initial(s(0)).unwrap();
        for (source, action, target, feature) in transitions {
            builder
                .add_guarded_transition(s(*source), *action, s(*target), feature.clone())
                .unwrap();
        }
        builder.build().unwrap()
    }

    fn derived(g: &TransitionGraph) -> DerivedStructure {
        derive(g, &TruthTableSolver::default(), &DerivationConfig::default()).unwrap()
    }

    fn bundle_sets(structure: &EventStructure) -> BTreeSet<(BTreeSet<Event>, Event)> {
        structure
            .bundles()
            .iter()
            .map(|b| (b.members().clone(), b.target().clone()))
            .collect()
    }

    #[test]
    fn exclusive_choice_after_a() {
        let g = graph(
            &["a", "b", "c"],
            4,
            &[(0, "a", 1, None), (1, "b", 2, None), (1, "c", 3, None)],
        );
        let result = derived(&g);
        let structure = &result.structure;
        assert_eq!(structure.in_conflict(&ev("b"), &ev("c")), Ok(true));
        assert_eq!(structure.conflicts().len(), 1);
        assert_eq!(
            bundle_sets(structure),
            BTreeSet::from([
                (BTreeSet::from([ev("a")]), ev("b")),
                (BTreeSet::from([ev("a")]), ev("c")),
            ])
        );
        assert!(result.features.is_empty());
    }

    #[test]
    fn linear_chain() {
        let g = graph(
            &["x", "y", "z"],
            4,
            &[(0, "x", 1, None), (1, "y", 2, None), (2, "z", 3, None)],
        );
        let result = derived(&g);
        assert!(result.structure.conflicts().is_empty());
        assert_eq!(
            bundle_sets(&result.structure),
            BTreeSet::from([
                (BTreeSet::from([ev("x")]), ev("y")),
                (BTreeSet::from([ev("y")]), ev("z")),
            ])
        );
    }

    #[test]
    fn concurrent_join_splits_candidate() {
        // a and b interleave, then c needs both.
        let g = graph(
            &["a", "b", "c"],
            5,
            &[
                (0, "a", 1, None),
                (0, "b", 2, None),
                (1, "b", 3, None),
                (2, "a", 3, None),
                (3, "c", 4, None),
            ],
        );
        let result = derived(&g);
        assert!(result.structure.conflicts().is_empty());
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(
            bundle_sets(&result.structure),
            BTreeSet::from([
                (BTreeSet::from([ev("a")]), ev("c")),
                (BTreeSet::from([ev("b")]), ev("c")),
            ])
        );
    }

    #[test]
    fn exclusive_join_keeps_disjunctive_bundle() {
        let g = graph(
            &["a", "b", "c"],
            5,
            &[
                (0, "a", 1, None),
                (0, "b", 2, None),
                (1, "c", 3, None),
                (2, "c", 4, None),
            ],
        );
        let result = derived(&g);
        assert_eq!(result.structure.in_conflict(&ev("a"), &ev("b")), Ok(true));
        assert_eq!(
            bundle_sets(&result.structure),
            BTreeSet::from([(BTreeSet::from([ev("a"), ev("b")]), ev("c"))])
        );
        assert!(result.structure.ill_formed_bundles().is_empty());
    }

    #[test]
    fn unminimized_candidates_are_kept_verbatim() {
        let g = graph(
            &["a", "b", "c"],
            5,
            &[
                (0, "a", 1, None),
                (0, "b", 2, None),
                (1, "b", 3, None),
                (2, "a", 3, None),
                (3, "c", 4, None),
            ],
        );
        let config = DerivationConfig {
            minimize_bundles: false,
            ..DerivationConfig::default()
        };
        let result = derive(&g, &TruthTableSolver::default(), &config).unwrap();
        assert_eq!(result.structure.bundles(), &result.candidates);
        assert_eq!(result.structure.ill_formed_bundles().len(), 1);
    }

    #[test]
    fn features_are_disjoined_per_event() {
        let f = Proposition::feature("f");
        let g = graph(
            &["a", "b", "c"],
            4,
            &[
                (0, "a", 1, None),
                (1, "b", 2, Some(f.clone())),
                (1, "c", 3, Some(!f.clone())),
            ],
        );
        let result = derived(&g);
        assert_eq!(result.features.get(&ev("b")), Some(&f));
        assert_eq!(result.features.get(&ev("c")), Some(&!f));
        assert!(!result.features.contains_key(&ev("a")));
        assert_eq!(result.structure.in_conflict(&ev("b"), &ev("c")), Ok(true));
    }

    #[test]
    fn mixed_annotation_leaves_event_unconstrained() {
        let g = graph(
            &["a"],
            3,
            &[(0, "a", 1, Some(Proposition::feature("f"))), (1, "a", 2, None)],
        );
        let result = derived(&g);
        assert!(result.features.is_empty());
    }
}
