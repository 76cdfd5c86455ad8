//! Size and shape figures for an event structure.

use serde::Serialize;
use tracing::debug;

use crate::structure::EventStructure;

/// Summary figures for one event structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StructureMetrics {
    /// Number of events.
    pub events: usize,
    /// Number of initial events (no targeting bundle).
    pub initial_events: usize,
    /// Number of causality bundles.
    pub bundles: usize,
    /// Size of the largest bundle.
    pub largest_bundle: usize,
    /// Number of conflict pairs.
    pub conflicts: usize,
    /// Bicliques in the greedy conflict edge cover.
    pub conflict_bicliques: usize,
    /// Number of configurations.
    pub configurations: usize,
    /// Number of maximal configurations.
    pub maximal_configurations: usize,
}

impl StructureMetrics {
    /// Measure `structure`. Enumerates its configurations, so the cost is
    /// exponential in the number of concurrent events.
    pub fn of(structure: &EventStructure) -> Self {
        let configurations = structure.configurations_with_maximality();
        let maximal_configurations = configurations
            .iter()
            .filter(|(_, maximal)| *maximal)
            .count();

        let metrics = Self {
            events: structure.event_count(),
            initial_events: structure.initial_events().len(),
            bundles: structure.bundles().len(),
            largest_bundle: structure
                .bundles()
                .iter()
                .map(evstruct_types::CausalityBundle::len)
                .max()
                .unwrap_or_default(),
            conflicts: structure.conflicts().len(),
            conflict_bicliques: structure.conflict_graph().minimal_biclique_edge_cover().len(),
            configurations: configurations.len(),
            maximal_configurations,
        };
        debug!(
            events = metrics.events,
            bundles = metrics.bundles,
            conflicts = metrics.conflicts,
            configurations = metrics.configurations,
            "Measured event structure"
        );
        metrics
    }
}
