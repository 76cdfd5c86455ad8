//! The derivation and reconstruction pipeline.
//!
//! [`Engine`] bundles an [`EngineConfig`] with a [`FeatureSolver`] and
//! exposes each stage on its own:
//!
//! - **derive**: transition graph to event structure;
//! - **reconstruct**: event structure to transition graph, plain or
//!   feature-annotated;
//! - **round trip**: both of the above plus a trace comparison of the
//!   input and output graphs, summarized in a [`RoundTripReport`];
//! - **metrics**: size figures for a structure.

use evstruct_graph::{TransitionGraph, featured_trace_equivalent, trace_divergence};
use evstruct_structure::{EventStructure, StructureMetrics};
use evstruct_types::{Event, FeatureSolver, TruthTableSolver};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::derive::{self, DerivedStructure};
use crate::error::CoreError;
use crate::reconstruct::{self, Reconstruction};

/// Outcome of [`Engine::round_trip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTripReport {
    /// Figures for the derived structure.
    pub metrics: StructureMetrics,
    /// Number of states in the reconstructed graph.
    pub reconstructed_states: usize,
    /// Number of transitions in the reconstructed graph.
    pub reconstructed_transitions: usize,
    /// Input actions the initial state never leads to.
    pub unreachable_actions: Vec<Event>,
    /// Whether the trace comparison ran.
    pub checked: bool,
    /// For unannotated inputs: shortest trace accepted by only one of the
    /// two graphs.
    pub divergence: Option<Vec<Event>>,
    /// For annotated inputs: whether featured traces agree up to the
    /// configured depth.
    pub featured_equivalent: Option<bool>,
}

impl RoundTripReport {
    /// Whether the comparison ran and found no difference.
    pub fn is_equivalent(&self) -> bool {
        self.checked && self.divergence.is_none() && self.featured_equivalent != Some(false)
    }
}

/// Derivation and reconstruction engine.
#[derive(Debug, Clone)]
pub struct Engine<S: FeatureSolver = TruthTableSolver> {
    config: EngineConfig,
    solver: S,
}

impl Engine {
    /// Create an engine using the built-in truth-table solver, limited by
    /// `config.solver.max_variables`.
    pub const fn new(config: EngineConfig) -> Self {
        let solver = TruthTableSolver::new(config.solver.max_variables);
        Self { config, solver }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<S: FeatureSolver> Engine<S> {
    /// Create an engine with a caller-supplied solver.
    pub const fn with_solver(config: EngineConfig, solver: S) -> Self {
        Self { config, solver }
    }

    /// The active configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The feature solver.
    pub const fn solver(&self) -> &S {
        &self.solver
    }

    /// Derive an event structure from `graph`.
    ///
    /// # Errors
    ///
    /// Propagates solver failures.
    pub fn derive(
        &self,
        graph: &TransitionGraph<S::Formula>,
    ) -> Result<DerivedStructure<S::Formula>, CoreError> {
        let unreachable = graph.unreachable_actions();
        if !unreachable.is_empty() {
            warn!(
                actions = ?unreachable,
                "Graph has unreachable actions; they will be derived as conflicting with everything"
            );
        }
        derive::derive(graph, &self.solver, &self.config.derivation)
    }

    /// Rebuild an unannotated transition graph from `structure`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TooManyStates`] for oversized lattices.
    #[allow(clippy::unused_self)]
    pub fn reconstruct(
        &self,
        structure: &EventStructure,
    ) -> Result<Reconstruction<S::Formula>, CoreError> {
        reconstruct::reconstruct(structure)
    }

    /// Rebuild a feature-annotated transition graph from a derived
    /// structure and its features.
    ///
    /// # Errors
    ///
    /// Propagates solver failures, or returns [`CoreError::TooManyStates`].
    pub fn reconstruct_featured(
        &self,
        derived: &DerivedStructure<S::Formula>,
    ) -> Result<Reconstruction<S::Formula>, CoreError> {
        reconstruct::reconstruct_featured(&derived.structure, &derived.features, &self.solver)
    }

    /// Size figures for `structure`.
    #[allow(clippy::unused_self)]
    pub fn metrics(&self, structure: &EventStructure) -> StructureMetrics {
        StructureMetrics::of(structure)
    }

    /// Derive, reconstruct, and compare the result with `graph`.
    ///
    /// Annotated graphs are rebuilt with features and compared by featured
    /// traces up to `verification.featured_trace_depth`; plain graphs are
    /// compared by exact trace equivalence.
    ///
    /// # Errors
    ///
    /// Propagates any stage's error.
    pub fn round_trip(
        &self,
        graph: &TransitionGraph<S::Formula>,
    ) -> Result<RoundTripReport, CoreError> {
        let featured = graph.is_featured();
        info!(
            actions = graph.actions().len(),
            states = graph.state_count(),
            featured,
            "Round trip started"
        );

        let derived = self.derive(graph)?;
        let rebuilt = if featured {
            self.reconstruct_featured(&derived)?
        } else {
            self.reconstruct(&derived.structure)?
        };
        let metrics = self.metrics(&derived.structure);

        let checked = self.config.verification.check_round_trip;
        let mut divergence = None;
        let mut featured_equivalent = None;
        if checked {
            if featured {
                featured_equivalent = Some(featured_trace_equivalent(
                    graph,
                    &rebuilt.graph,
                    &self.solver,
                    self.config.verification.featured_trace_depth,
                )?);
            } else {
                divergence = trace_divergence(graph, &rebuilt.graph);
            }
        }

        let report = RoundTripReport {
            metrics,
            reconstructed_states: rebuilt.graph.state_count(),
            reconstructed_transitions: rebuilt.graph.transition_count(),
            unreachable_actions: graph.unreachable_actions().into_iter().cloned().collect(),
            checked,
            divergence,
            featured_equivalent,
        };
        if checked && !report.is_equivalent() {
            warn!(
                divergence = ?report.divergence,
                featured_equivalent = ?report.featured_equivalent,
                "Round trip changed behavior"
            );
        }
        info!(
            configurations = report.metrics.configurations,
            states = report.reconstructed_states,
            equivalent = report.is_equivalent(),
            "Round trip finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use evstruct_types::{Proposition, StateId};
    use serde_json::json;

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

    #[test]
    fn engine_uses_configured_solver_limit() {
        let mut config = EngineConfig::default();
        config.solver.max_variables = 3;
        let engine = Engine::new(config);
        assert_eq!(engine.solver().max_variables(), 3);
    }

    #[test]
    fn plain_round_trip_is_equivalent() {
        let g = graph(
            &["a", "b", "c"],
            4,
            &[(0, "a", 1, None), (1, "b", 2, None), (1, "c", 3, None)],
        );
        let report = Engine::default().round_trip(&g).unwrap();
        assert!(report.is_equivalent());
        assert_eq!(report.reconstructed_states, 4);
        assert_eq!(report.metrics.configurations, 4);
        assert!(report.unreachable_actions.is_empty());
        assert_eq!(report.featured_equivalent, None);
    }

    #[test]
    fn featured_round_trip_is_equivalent() {
        let f = Proposition::feature("f");
        let g = graph(
            &["a", "b", "c"],
            4,
            &[
                (0, "a", 1, None),
                (1, "b", 2, Some(f.clone())),
                (1, "c", 3, Some(!f)),
            ],
        );
        let report = Engine::default().round_trip(&g).unwrap();
        assert_eq!(report.featured_equivalent, Some(true));
        assert!(report.divergence.is_none());
        assert!(report.is_equivalent());
    }

    #[test]
    fn disabled_check_is_not_equivalent() {
        let mut config = EngineConfig::default();
        config.verification.check_round_trip = false;
        let g = graph(&["a"], 2, &[(0, "a", 1, None)]);
        let report = Engine::new(config).round_trip(&g).unwrap();
        assert!(!report.checked);
        assert!(!report.is_equivalent());
    }

    #[test]
    fn unreachable_action_is_reported() {
        let g = graph(&["a", "ghost"], 2, &[(0, "a", 1, None)]);
        let report = Engine::default().round_trip(&g).unwrap();
        assert_eq!(report.unreachable_actions, vec![Event::new("ghost")]);
    }

    #[test]
    fn report_serializes_to_json() {
        let g = graph(&["a", "b"], 3, &[(0, "a", 1, None), (1, "b", 2, None)]);
        let report = Engine::default().round_trip(&g).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let field = |name: &str| json.get(name).cloned().unwrap();
        assert_eq!(field("reconstructed_states"), json!(3));
        assert_eq!(field("reconstructed_transitions"), json!(2));
        assert_eq!(field("checked"), json!(true));
        assert_eq!(field("divergence"), json!(null));
        assert_eq!(field("unreachable_actions"), json!([]));
        let metrics = field("metrics");
        assert_eq!(metrics.get("configurations"), Some(&json!(3)));
        assert_eq!(metrics.get("maximal_configurations"), Some(&json!(1)));
    }
}
