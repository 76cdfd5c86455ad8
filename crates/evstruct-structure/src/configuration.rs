//! Configuration enumeration.
//!
//! Configurations are found by a depth-first walk from the empty set. Each
//! node extends its configuration by one enabled, conflict-free event. A
//! configuration reachable along several build orders is produced once:
//! when a node expands its children, every sibling explored earlier is
//! excluded from the subtrees of the later ones.
//!
//! The same walk serves the featured case, where an accumulated feature
//! guard rides along each path and branches whose guard becomes
//! unsatisfiable are cut.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

use evstruct_types::{Configuration, Event, FeatureSolver, Guard, SolverError};
use serde::Serialize;
use tracing::debug;

use crate::structure::EventStructure;

/// A configuration whose member features can hold together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeasibleConfiguration<F> {
    /// The configuration.
    pub configuration: Configuration,
    /// Conjunction of the member events' features. `None` when no member
    /// carries a feature.
    pub guard: Guard<F>,
}

/// One node produced by the walk.
struct Visit<P> {
    configuration: Configuration,
    payload: P,
    /// No event extends the configuration.
    maximal: bool,
}

struct Frame<P> {
    configuration: Configuration,
    payload: P,
    excluded: BTreeSet<Event>,
}

impl EventStructure {
    /// Every configuration, each exactly once, starting with the empty one.
    ///
    /// Build orders record the path the walk took.
    pub fn all_configurations(&self) -> Vec<Configuration> {
        self.configurations_with_maximality()
            .into_iter()
            .map(|(configuration, _)| configuration)
            .collect()
    }

    /// Configurations that no event can extend.
    pub fn maximal_configurations(&self) -> Vec<Configuration> {
        self.configurations_with_maximality()
            .into_iter()
            .filter_map(|(configuration, maximal)| maximal.then_some(configuration))
            .collect()
    }

    /// Every configuration paired with whether it is maximal.
    pub(crate) fn configurations_with_maximality(&self) -> Vec<(Configuration, bool)> {
        let Ok(visits) = self.walk((), |_, _| Ok::<_, Infallible>(Some(())));
        debug!(count = visits.len(), "Enumerated configurations");
        visits
            .into_iter()
            .map(|visit| (visit.configuration, visit.maximal))
            .collect()
    }

    /// Configurations whose conjunction of member features is satisfiable.
    ///
    /// Events absent from `features` are unconstrained. The walk stops
    /// extending any configuration whose guard is unsatisfiable, since no
    /// superset can recover.
    ///
    /// # Errors
    ///
    /// Propagates solver failures.
    pub fn feasible_configurations<S: FeatureSolver>(
        &self,
        features: &BTreeMap<Event, S::Formula>,
        solver: &S,
    ) -> Result<Vec<FeasibleConfiguration<S::Formula>>, SolverError> {
        let visits = self.walk(
            None,
            |guard: &Guard<S::Formula>,
             event: &Event|
             -> Result<Option<Guard<S::Formula>>, SolverError> {
                let extended = solver.conjoin_guards(guard.as_ref(), features.get(event));
                if solver.guard_satisfiable(extended.as_ref())? {
                    Ok(Some(extended))
                } else {
                    debug!(event = %event, "Pruned infeasible extension");
                    Ok(None)
                }
            },
        )?;
        debug!(count = visits.len(), "Enumerated feasible configurations");
        Ok(visits
            .into_iter()
            .map(|visit| FeasibleConfiguration {
                configuration: visit.configuration,
                guard: visit.payload,
            })
            .collect())
    }

    /// Depth-first enumeration with a payload threaded along each path.
    ///
    /// `extend` maps the parent payload and the added event to the child
    /// payload, or `None` to cut the branch.
    fn walk<P, E>(
        &self,
        root: P,
        mut extend: impl FnMut(&P, &Event) -> Result<Option<P>, E>,
    ) -> Result<Vec<Visit<P>>, E> {
        let mut visits = Vec::new();
        let mut stack = vec![Frame {
            configuration: Configuration::empty(),
            payload: root,
            excluded: BTreeSet::new(),
        }];

        while let Some(frame) = stack.pop() {
            let occurred = frame.configuration.members();
            let mut children = Vec::new();
            let mut excluded = frame.excluded;
            let mut maximal = true;
            for event in self.events() {
                if !self.can_extend(occurred, event) {
                    continue;
                }
                let Some(payload) = extend(&frame.payload, event)? else {
                    continue;
                };
                // Excluded siblings still count against maximality.
                maximal = false;
                if excluded.contains(event) {
                    continue;
                }
                children.push(Frame {
                    configuration: frame.configuration.extended(event.clone()),
                    payload,
                    excluded: excluded.clone(),
                });
                excluded.insert(event.clone());
            }

            // Reverse so siblings pop in ascending event order.
            stack.extend(children.into_iter().rev());
            visits.push(Visit {
                configuration: frame.configuration,
                payload: frame.payload,
                maximal,
            });
        }

        Ok(visits)
    }
}
