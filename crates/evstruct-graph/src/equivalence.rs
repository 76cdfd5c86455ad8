//! Trace equivalence between transition graphs.
//!
//! Two graphs are trace equivalent when they accept the same set of action
//! sequences from their initial states. Both trace sets are prefix-closed,
//! so the comparison runs a paired subset construction: each side is
//! determinized on the fly and the enabled labels of the two subset states
//! are compared. The pair space is finite, so cyclic graphs terminate.
//!
//! The featured comparison enumerates traces up to a depth bound and pairs
//! each trace with the disjunction of the path formulas that produce it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use evstruct_types::{Event, FeatureSolver, Guard, SolverError, StateId};
use tracing::debug;

use crate::transition_graph::TransitionGraph;

type Subset = BTreeSet<StateId>;

/// Successor subsets per label from a subset of states.
fn step<F>(graph: &TransitionGraph<F>, from: &Subset) -> BTreeMap<Event, Subset> {
    let mut next: BTreeMap<Event, Subset> = BTreeMap::new();
    for state in from {
        for transition in graph.outgoing(*state) {
            next.entry(transition.action().clone())
                .or_default()
                .insert(transition.target());
        }
    }
    next
}

/// Shortest trace accepted by exactly one of the two graphs, or `None`
/// when they are trace equivalent. Feature formulas are ignored.
pub fn trace_divergence<F, G>(
    left: &TransitionGraph<F>,
    right: &TransitionGraph<G>,
) -> Option<Vec<Event>> {
    let start = (
        Subset::from([left.initial_state()]),
        Subset::from([right.initial_state()]),
    );
    let mut seen: BTreeSet<(Subset, Subset)> = BTreeSet::new();
    let mut queue: VecDeque<(Subset, Subset, Vec<Event>)> = VecDeque::new();
    seen.insert(start.clone());
    queue.push_back((start.0, start.1, Vec::new()));

    while let Some((left_states, right_states, trace)) = queue.pop_front() {
        let left_next = step(left, &left_states);
        let right_next = step(right, &right_states);

        let mismatch = left_next
            .keys()
            .find(|label| !right_next.contains_key(*label))
            .or_else(|| right_next.keys().find(|label| !left_next.contains_key(*label)));
        if let Some(label) = mismatch {
            let mut witness = trace;
            witness.push(label.clone());
            debug!(trace = ?witness, "Traces diverge");
            return Some(witness);
        }

        for (label, left_target) in left_next {
            let Some(right_target) = right_next.get(&label).cloned() else {
                continue;
            };
            let pair = (left_target, right_target);
            if seen.insert(pair.clone()) {
                let mut extended = trace.clone();
                extended.push(label);
                queue.push_back((pair.0, pair.1, extended));
            }
        }
    }

    None
}

/// Whether the two graphs accept the same traces, ignoring features.
pub fn trace_equivalent<F, G>(left: &TransitionGraph<F>, right: &TransitionGraph<G>) -> bool {
    trace_divergence(left, right).is_none()
}

/// Every trace of length at most `depth` whose path formula is
/// satisfiable, mapped to the disjunction of the formulas of all paths
/// spelling it. The empty trace maps to `None`.
///
/// # Errors
///
/// Propagates solver failures.
pub fn featured_traces<S: FeatureSolver>(
    graph: &TransitionGraph<S::Formula>,
    solver: &S,
    depth: usize,
) -> Result<BTreeMap<Vec<Event>, Guard<S::Formula>>, SolverError> {
    let mut traces: BTreeMap<Vec<Event>, Guard<S::Formula>> = BTreeMap::new();
    let mut stack: Vec<(StateId, Vec<Event>, Guard<S::Formula>)> =
        vec![(graph.initial_state(), Vec::new(), None)];

    while let Some((state, trace, guard)) = stack.pop() {
        let can_extend = trace.len() < depth;
        if can_extend {
            for transition in graph.outgoing(state) {
                let next = solver.conjoin_guards(guard.as_ref(), transition.feature());
                if !solver.guard_satisfiable(next.as_ref())? {
                    continue;
                }
                let mut extended = trace.clone();
                extended.push(transition.action().clone());
                stack.push((transition.target(), extended, next));
            }
        }
        let merged = match traces.get(&trace) {
            Some(existing) => solver.disjoin_guards(existing.as_ref(), guard.as_ref()),
            None => guard,
        };
        traces.insert(trace, merged);
    }

    Ok(traces)
}

/// Whether both graphs have the same featured traces up to `depth`, with
/// equivalent formulas per trace.
///
/// # Errors
///
/// Propagates solver failures.
pub fn featured_trace_equivalent<S: FeatureSolver>(
    left: &TransitionGraph<S::Formula>,
    right: &TransitionGraph<S::Formula>,
    solver: &S,
    depth: usize,
) -> Result<bool, SolverError> {
    let left_traces = featured_traces(left, solver, depth)?;
    let right_traces = featured_traces(right, solver, depth)?;
    if left_traces.len() != right_traces.len() {
        debug!(
            left = left_traces.len(),
            right = right_traces.len(),
            "Featured trace counts differ"
        );
        return Ok(false);
    }
    for (trace, left_guard) in &left_traces {
        let Some(right_guard) = right_traces.get(trace) else {
            debug!(trace = ?trace, "Featured trace missing on one side");
            return Ok(false);
        };
        if !solver.guard_equivalent(left_guard.as_ref(), right_guard.as_ref())? {
            debug!(trace = ?trace, "Featured trace formulas differ");
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use evstruct_types::{Proposition, TruthTableSolver};

    const fn s(index: u32) -> StateId {
        StateId::new(index)
    }

    fn f(name: &str) -> Proposition {
        Proposition::feature(name)
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

    #[test]
    fn graph_is_equivalent_to_itself() {
        let g = graph(&["a", "b"], 2, &[(0, "a", 1, None), (1, "b", 0, None)]);
        assert!(trace_equivalent(&g, &g));
    }

    #[test]
    fn unrolled_loop_differs_from_loop() {
        let looping = graph(&["a"], 1, &[(0, "a", 0, None)]);
        let once = graph(&["a"], 2, &[(0, "a", 1, None)]);
        assert_eq!(
            trace_divergence(&looping, &once),
            Some(vec![Event::new("a"), Event::new("a")])
        );
    }

    #[test]
    fn nondeterminism_is_collapsed() {
        // s0 -a-> s1 -b->, s0 -a-> s2 -c-> versus a deterministic a then b|c.
        let nondeterministic = graph(
            &["a", "b", "c"],
            5,
            &[
                (0, "a", 1, None),
                (0, "a", 2, None),
                (1, "b", 3, None),
                (2, "c", 4, None),
            ],
        );
        let deterministic = graph(
            &["a", "b", "c"],
            4,
            &[(0, "a", 1, None), (1, "b", 2, None), (1, "c", 3, None)],
        );
        assert!(trace_equivalent(&nondeterministic, &deterministic));
    }

    #[test]
    fn state_numbering_does_not_matter() {
        let left = graph(&["x", "y"], 3, &[(0, "x", 1, None), (1, "y", 2, None)]);
        let right = graph(&["x", "y"], 3, &[(0, "x", 2, None), (2, "y", 1, None)]);
        assert!(trace_equivalent(&left, &right));
    }

    #[test]
    fn featured_traces_merge_paths() {
        // Two a-transitions with guards f and !f merge to a tautology.
        let g = graph(
            &["a"],
            3,
            &[(0, "a", 1, Some(f("f"))), (0, "a", 2, Some(!f("f")))],
        );
        let solver = TruthTableSolver::default();
        let traces = featured_traces(&g, &solver, 3).unwrap();
        assert_eq!(traces.len(), 2);
        let guard = traces.get(&vec![Event::new("a")]).cloned().flatten();
        assert_eq!(
            solver.guard_equivalent(guard.as_ref(), None),
            Ok(true)
        );
    }

    #[test]
    fn featured_traces_drop_infeasible_paths() {
        let g = graph(
            &["a", "b"],
            3,
            &[(0, "a", 1, Some(f("f"))), (1, "b", 2, Some(!f("f")))],
        );
        let solver = TruthTableSolver::default();
        let traces = featured_traces(&g, &solver, 5).unwrap();
        assert!(traces.contains_key(&vec![Event::new("a")]));
        assert!(!traces.contains_key(&vec![Event::new("a"), Event::new("b")]));
    }

    #[test]
    fn featured_equivalence_compares_formulas() {
        let with_f = graph(&["a"], 2, &[(0, "a", 1, Some(f("f")))]);
        let with_g = graph(&["a"], 2, &[(0, "a", 1, Some(f("g")))]);
        let solver = TruthTableSolver::default();
        assert!(trace_equivalent(&with_f, &with_g));
        assert_eq!(featured_trace_equivalent(&with_f, &with_g, &solver, 4), Ok(false));
        assert_eq!(featured_trace_equivalent(&with_f, &with_f, &solver, 4), Ok(true));
    }

    #[test]
    fn depth_bounds_cyclic_enumeration() {
        let g = graph(&["a"], 1, &[(0, "a", 0, None)]);
        let solver = TruthTableSolver::default();
        let traces = featured_traces(&g, &solver, 3).unwrap();
        assert_eq!(traces.len(), 4);
    }
}
