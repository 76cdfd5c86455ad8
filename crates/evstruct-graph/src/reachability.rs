//! Reachability queries between actions.
//!
//! [`ReachabilityOracle`] answers two questions over a transition graph:
//!
//! - can some transition labeled `a1` lead, through zero or more further
//!   transitions, to a state that enables `a2`;
//! - does some `a1` transition land directly on a state that enables `a2`.
//!
//! On feature-annotated graphs a path only counts when the conjunction of
//! the formulas along it is satisfiable. Each search carries that
//! accumulated formula, pruning a branch as soon as it becomes
//! unsatisfiable. A state is expanded again only if the new formula is not
//! implied by one it was already expanded under, which keeps the search
//! finite on cyclic graphs and reduces to a plain visited set when nothing
//! is annotated.

use std::collections::BTreeMap;

use evstruct_types::{Event, FeatureSolver, Guard, SolverError, StateId, TruthTableSolver};
use tracing::debug;

use crate::transition_graph::TransitionGraph;

/// Reachability queries bound to one graph and one solver.
#[derive(Debug, Clone, Copy)]
pub struct ReachabilityOracle<'g, S: FeatureSolver> {
    graph: &'g TransitionGraph<S::Formula>,
    solver: &'g S,
}

impl<'g, S: FeatureSolver> ReachabilityOracle<'g, S> {
    /// Bind an oracle to `graph`, using `solver` for feature formulas.
    pub const fn new(graph: &'g TransitionGraph<S::Formula>, solver: &'g S) -> Self {
        Self { graph, solver }
    }

    /// The graph being queried.
    pub const fn graph(&self) -> &'g TransitionGraph<S::Formula> {
        self.graph
    }

    /// Whether some `from` transition can lead to a state enabling `to`.
    ///
    /// Unknown actions are never reachable.
    ///
    /// # Errors
    ///
    /// Propagates solver failures.
    pub fn reachable(&self, from: &Event, to: &Event) -> Result<bool, SolverError> {
        if !self.graph.has_action(from) || !self.graph.has_action(to) {
            return Ok(false);
        }

        let mut stack: Vec<(StateId, Guard<S::Formula>)> = Vec::new();
        for transition in self.graph.transitions_labeled(from) {
            if self.solver.guard_satisfiable(transition.feature())? {
                stack.push((transition.target(), transition.feature().cloned()));
            }
        }

        let mut expanded: BTreeMap<StateId, Vec<Guard<S::Formula>>> = BTreeMap::new();
        while let Some((state, guard)) = stack.pop() {
            if self.subsumed(&expanded, state, guard.as_ref())? {
                continue;
            }
            for transition in self.graph.outgoing(state) {
                let next = self
                    .solver
                    .conjoin_guards(guard.as_ref(), transition.feature());
                if !self.solver.guard_satisfiable(next.as_ref())? {
                    continue;
                }
                if transition.action() == to {
                    debug!(from = %from, to = %to, via = %state, "Action reachable");
                    return Ok(true);
                }
                stack.push((transition.target(), next));
            }
            expanded.entry(state).or_default().push(guard);
        }

        Ok(false)
    }

    /// Whether some `first` transition ends in a state with an outgoing
    /// `second` transition, with a satisfiable combined formula.
    ///
    /// # Errors
    ///
    /// Propagates solver failures.
    pub fn is_immediate_predecessor(
        &self,
        first: &Event,
        second: &Event,
    ) -> Result<bool, SolverError> {
        for before in self.graph.transitions_labeled(first) {
            if !self.solver.guard_satisfiable(before.feature())? {
                continue;
            }
            for after in self.graph.outgoing(before.target()) {
                if after.action() != second {
                    continue;
                }
                let combined = self
                    .solver
                    .conjoin_guards(before.feature(), after.feature());
                if self.solver.guard_satisfiable(combined.as_ref())? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Whether `guard` adds nothing over a formula `state` was already
    /// expanded under.
    fn subsumed(
        &self,
        expanded: &BTreeMap<StateId, Vec<Guard<S::Formula>>>,
        state: StateId,
        guard: Option<&S::Formula>,
    ) -> Result<bool, SolverError> {
        let Some(recorded) = expanded.get(&state) else {
            return Ok(false);
        };
        for earlier in recorded {
            if self.solver.guard_implies(guard, earlier.as_ref())? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// [`ReachabilityOracle::reachable`] with the default truth-table solver.
///
/// # Errors
///
/// Fails only if the graph's formulas exceed the solver's variable limit.
pub fn reachable(graph: &TransitionGraph, from: &Event, to: &Event) -> Result<bool, SolverError> {
    let solver = TruthTableSolver::default();
    ReachabilityOracle::new(graph, &solver).reachable(from, to)
}

/// [`ReachabilityOracle::is_immediate_predecessor`] with the default
/// truth-table solver.
///
/// # Errors
///
/// Fails only if the graph's formulas exceed the solver's variable limit.
pub fn is_immediate_predecessor(
    graph: &TransitionGraph,
    first: &Event,
    second: &Event,
) -> Result<bool, SolverError> {
    let solver = TruthTableSolver::default();
    ReachabilityOracle::new(graph, &solver).is_immediate_predecessor(first, second)
}
