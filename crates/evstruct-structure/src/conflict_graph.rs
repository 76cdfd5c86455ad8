//! The conflict relation as an undirected graph.
//!
//! Vertices are events; an edge joins two events that never co-occur. Two
//! combinatorial queries run over it:
//!
//! - **Maximal cliques** (Bron–Kerbosch with pivoting). A clique is a set of
//!   pairwise mutually exclusive events. Bundle minimization keeps exactly
//!   the maximal cliques of the conflict graph induced on a candidate
//!   bundle. Events without conflicts form singleton cliques.
//! - **Biclique edge cover**. Every conflict edge is covered by some complete
//!   bipartite subgraph, which gives a compact representation of the
//!   relation for reporting.
//!
//! Both are worst-case exponential in the number of events. Nothing here
//! imposes a limit; callers bound input size.

use std::collections::{BTreeMap, BTreeSet};

use evstruct_types::{ConflictPair, Event};
use serde::Serialize;

/// Adjacency-set representation of the conflict relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictGraph {
    adjacency: BTreeMap<Event, BTreeSet<Event>>,
}

/// A complete bipartite subgraph: every left event conflicts with every
/// right event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Biclique {
    /// One side of the biclique.
    pub left: BTreeSet<Event>,
    /// The other side of the biclique.
    pub right: BTreeSet<Event>,
}

impl Biclique {
    /// Whether the unordered edge `{first, second}` runs between the sides.
    pub fn covers(&self, first: &Event, second: &Event) -> bool {
        (self.left.contains(first) && self.right.contains(second))
            || (self.left.contains(second) && self.right.contains(first))
    }

    /// Number of edges the biclique represents.
    pub fn edge_count(&self) -> usize {
        self.left.len().saturating_mul(self.right.len())
    }
}

impl ConflictGraph {
    /// Build the graph over `events` with the given conflict edges.
    ///
    /// Endpoints of a pair that are not in `events` are added as vertices.
    pub fn new<'a>(
        events: impl IntoIterator<Item = &'a Event>,
        conflicts: impl IntoIterator<Item = &'a ConflictPair>,
    ) -> Self {
        let mut adjacency: BTreeMap<Event, BTreeSet<Event>> = events
            .into_iter()
            .map(|event| (event.clone(), BTreeSet::new()))
            .collect();
        for pair in conflicts {
            adjacency
                .entry(pair.first().clone())
                .or_default()
                .insert(pair.second().clone());
            adjacency
                .entry(pair.second().clone())
                .or_default()
                .insert(pair.first().clone());
        }
        Self { adjacency }
    }

    /// Number of events.
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of conflict edges.
    pub fn edge_count(&self) -> usize {
        let degree_sum = self
            .adjacency
            .values()
            .fold(0_usize, |sum, neighbors| sum.saturating_add(neighbors.len()));
        degree_sum.checked_div(2).unwrap_or_default()
    }

    /// All events, in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = &Event> {
        self.adjacency.keys()
    }

    /// Events conflicting with `event`, or `None` if it is not a vertex.
    pub fn neighbors(&self, event: &Event) -> Option<&BTreeSet<Event>> {
        self.adjacency.get(event)
    }

    /// Whether the two events conflict.
    pub fn in_conflict(&self, first: &Event, second: &Event) -> bool {
        self.adjacency
            .get(first)
            .is_some_and(|neighbors| neighbors.contains(second))
    }

    /// Every conflict edge once, as an ascending `(first, second)` pair.
    pub fn edges(&self) -> impl Iterator<Item = (&Event, &Event)> {
        self.adjacency.iter().flat_map(|(event, neighbors)| {
            neighbors
                .range::<Event, _>((
                    core::ops::Bound::Excluded(event),
                    core::ops::Bound::Unbounded,
                ))
                .map(move |other| (event, other))
        })
    }

    /// Whether every two distinct events of `events` conflict.
    pub fn is_clique(&self, events: &BTreeSet<Event>) -> bool {
        events.iter().all(|first| {
            events
                .iter()
                .filter(|second| *second != first)
                .all(|second| self.in_conflict(first, second))
        })
    }

    /// Every maximal clique of the whole graph.
    pub fn all_maximal_cliques(&self) -> BTreeSet<BTreeSet<Event>> {
        let everything: BTreeSet<Event> = self.adjacency.keys().cloned().collect();
        self.maximal_cliques(&everything)
    }

    /// Every inclusion-maximal pairwise-conflicting subset of `within`.
    ///
    /// Uses Bron–Kerbosch with pivoting. The pivot is the vertex of
    /// candidates ∪ excluded with the most neighbors among the candidates,
    /// which minimizes the number of branches taken at each level.
    pub fn maximal_cliques(&self, within: &BTreeSet<Event>) -> BTreeSet<BTreeSet<Event>> {
        let mut cliques = BTreeSet::new();
        if within.is_empty() {
            return cliques;
        }
        let mut clique = BTreeSet::new();
        self.bron_kerbosch(
            &mut clique,
            within.clone(),
            BTreeSet::new(),
            within,
            &mut cliques,
        );
        cliques
    }

    fn bron_kerbosch(
        &self,
        clique: &mut BTreeSet<Event>,
        mut candidates: BTreeSet<Event>,
        mut excluded: BTreeSet<Event>,
        within: &BTreeSet<Event>,
        cliques: &mut BTreeSet<BTreeSet<Event>>,
    ) {
        if candidates.is_empty() {
            if excluded.is_empty() {
                cliques.insert(clique.clone());
            }
            return;
        }

        let pivot = candidates
            .union(&excluded)
            .max_by_key(|vertex| self.neighbors_among(vertex, &candidates))
            .cloned();
        let branches: Vec<Event> = candidates
            .iter()
            .filter(|vertex| {
                pivot
                    .as_ref()
                    .is_none_or(|p| !self.in_conflict(p, vertex))
            })
            .cloned()
            .collect();

        for vertex in branches {
            let neighbors = self.neighbors_within(&vertex, within);
            clique.insert(vertex.clone());
            self.bron_kerbosch(
                clique,
                candidates.intersection(&neighbors).cloned().collect(),
                excluded.intersection(&neighbors).cloned().collect(),
                within,
                cliques,
            );
            clique.remove(&vertex);
            candidates.remove(&vertex);
            excluded.insert(vertex);
        }
    }

    fn neighbors_among(&self, vertex: &Event, among: &BTreeSet<Event>) -> usize {
        self.adjacency
            .get(vertex)
            .map_or(0, |neighbors| neighbors.intersection(among).count())
    }

    fn neighbors_within(&self, vertex: &Event, within: &BTreeSet<Event>) -> BTreeSet<Event> {
        self.adjacency.get(vertex).map_or_else(BTreeSet::new, |neighbors| {
            neighbors.intersection(within).cloned().collect()
        })
    }

    /// Cover every conflict edge with complete bipartite subgraphs.
    ///
    /// Greedy: take the smallest uncovered edge as a seed `({u}, {v})`, then
    /// repeatedly add any event conflicting with the whole opposite side
    /// (left first), until neither side grows. Edges inside the result are
    /// marked covered and the loop continues until none remain. Minimum
    /// covers are NP-hard; the greedy result is small in practice but not
    /// guaranteed minimum.
    pub fn minimal_biclique_edge_cover(&self) -> Vec<Biclique> {
        let mut uncovered: BTreeSet<(Event, Event)> = self
            .edges()
            .map(|(first, second)| (first.clone(), second.clone()))
            .collect();
        let mut cover = Vec::new();

        while let Some((seed_left, seed_right)) = uncovered.first().cloned() {
            let biclique = self.grow_biclique(seed_left, seed_right);
            uncovered.retain(|(first, second)| !biclique.covers(first, second));
            cover.push(biclique);
        }

        tracing::debug!(
            edges = self.edge_count(),
            bicliques = cover.len(),
            "Biclique edge cover computed"
        );
        cover
    }

    fn grow_biclique(&self, seed_left: Event, seed_right: Event) -> Biclique {
        let mut left = BTreeSet::from([seed_left]);
        let mut right = BTreeSet::from([seed_right]);

        loop {
            let mut grew = false;
            for vertex in self.adjacency.keys() {
                if left.contains(vertex) || right.contains(vertex) {
                    continue;
                }
                if right.iter().all(|other| self.in_conflict(vertex, other)) {
                    left.insert(vertex.clone());
                    grew = true;
                } else if left.iter().all(|other| self.in_conflict(vertex, other)) {
                    right.insert(vertex.clone());
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }

        Biclique { left, right }
    }
}
