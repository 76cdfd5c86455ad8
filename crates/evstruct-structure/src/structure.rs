//! Event structures: events with causality bundles and conflicts.
//!
//! An [`EventStructure`] is populated through an [`EventStructureBuilder`]
//! and frozen by [`EventStructureBuilder::build`]. The builder validates
//! referential integrity eagerly: inserting a relation that names an
//! undeclared event fails at once with [`StructureError::Definition`].
//!
//! Once built, the structure answers the questions configuration search
//! needs: is an event enabled by a set of occurred events, does it conflict
//! with any of them, and is a whole set a configuration.

use std::collections::{BTreeMap, BTreeSet};

use evstruct_types::{CausalityBundle, ConflictPair, Event};

use crate::conflict_graph::ConflictGraph;
use crate::error::StructureError;

/// A frozen event structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStructure {
    events: BTreeSet<Event>,
    bundles: BTreeSet<CausalityBundle>,
    conflicts: BTreeSet<ConflictPair>,
    /// Target event -> bundles targeting it.
    causes: BTreeMap<Event, Vec<CausalityBundle>>,
    conflict_graph: ConflictGraph,
}

impl EventStructure {
    /// Start building a new structure.
    pub const fn builder() -> EventStructureBuilder {
        EventStructureBuilder::new()
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// All events, in ascending order.
    pub const fn events(&self) -> &BTreeSet<Event> {
        &self.events
    }

    /// All causality bundles.
    pub const fn bundles(&self) -> &BTreeSet<CausalityBundle> {
        &self.bundles
    }

    /// All conflict pairs.
    pub const fn conflicts(&self) -> &BTreeSet<ConflictPair> {
        &self.conflicts
    }

    /// The conflict relation as a graph.
    pub const fn conflict_graph(&self) -> &ConflictGraph {
        &self.conflict_graph
    }

    /// Number of events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Whether `event` is declared.
    pub fn contains(&self, event: &Event) -> bool {
        self.events.contains(event)
    }

    /// Events with no targeting bundle.
    pub fn initial_events(&self) -> BTreeSet<&Event> {
        self.events
            .iter()
            .filter(|event| !self.causes.contains_key(*event))
            .collect()
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// Bundles that target `event`.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::UndefinedReference`] if `event` is not
    /// declared.
    pub fn bundles_targeting(&self, event: &Event) -> Result<&[CausalityBundle], StructureError> {
        self.require(event)?;
        Ok(self.causes.get(event).map(Vec::as_slice).unwrap_or_default())
    }

    /// Events conflicting with `event`.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::UndefinedReference`] if `event` is not
    /// declared.
    pub fn conflicts_with(&self, event: &Event) -> Result<&BTreeSet<Event>, StructureError> {
        self.conflict_graph
            .neighbors(event)
            .ok_or_else(|| StructureError::UndefinedReference(event.clone()))
    }

    /// Whether the two events conflict.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::UndefinedReference`] if either event is not
    /// declared.
    pub fn in_conflict(&self, first: &Event, second: &Event) -> Result<bool, StructureError> {
        self.require(first)?;
        self.require(second)?;
        Ok(self.conflict_graph.in_conflict(first, second))
    }

    fn require(&self, event: &Event) -> Result<(), StructureError> {
        if self.events.contains(event) {
            Ok(())
        } else {
            Err(StructureError::UndefinedReference(event.clone()))
        }
    }

    // -------------------------------------------------------------------
    // Configuration predicates
    // -------------------------------------------------------------------

    /// Whether every bundle targeting `event` has a member in `occurred`.
    ///
    /// Initial events are always enabled.
    pub fn is_enabled(&self, event: &Event, occurred: &BTreeSet<Event>) -> bool {
        self.causes.get(event).is_none_or(|bundles| {
            bundles
                .iter()
                .all(|bundle| bundle.is_satisfied_by(occurred))
        })
    }

    /// Whether `event` conflicts with any member of `occurred`.
    pub fn conflicts_with_any(&self, event: &Event, occurred: &BTreeSet<Event>) -> bool {
        self.conflict_graph
            .neighbors(event)
            .is_some_and(|neighbors| !neighbors.is_disjoint(occurred))
    }

    /// Whether `occurred ∪ {event}` is a configuration, given that
    /// `occurred` already is one.
    pub fn can_extend(&self, occurred: &BTreeSet<Event>, event: &Event) -> bool {
        self.events.contains(event)
            && !occurred.contains(event)
            && !self.conflicts_with_any(event, occurred)
            && self.is_enabled(event, occurred)
    }

    /// Whether no two members of `events` conflict.
    pub fn is_conflict_free(&self, events: &BTreeSet<Event>) -> bool {
        events
            .iter()
            .all(|event| !self.conflicts_with_any(event, events))
    }

    /// Whether every member of `events` has each of its bundles satisfied
    /// by `events`.
    pub fn is_causally_closed(&self, events: &BTreeSet<Event>) -> bool {
        events.iter().all(|event| self.is_enabled(event, events))
    }

    /// Whether `events` is a configuration: known, conflict-free, and
    /// causally closed.
    pub fn is_configuration(&self, events: &BTreeSet<Event>) -> bool {
        events.is_subset(&self.events)
            && self.is_conflict_free(events)
            && self.is_causally_closed(events)
    }

    /// Bundles with two members that do not conflict.
    ///
    /// Empty for every structure produced by bundle minimization.
    pub fn ill_formed_bundles(&self) -> Vec<&CausalityBundle> {
        self.bundles
            .iter()
            .filter(|bundle| {
                !bundle.is_pairwise_conflicting(|a, b| self.conflict_graph.in_conflict(a, b))
            })
            .collect()
    }
}

/// Mutable builder for an [`EventStructure`].
///
/// Requires exclusive access while populated; [`build`](Self::build)
/// consumes it.
#[derive(Debug, Clone, Default)]
pub struct EventStructureBuilder {
    events: BTreeSet<Event>,
    bundles: BTreeSet<CausalityBundle>,
    conflicts: BTreeSet<ConflictPair>,
}

impl EventStructureBuilder {
    /// Create an empty builder.
    pub const fn new() -> Self {
        Self {
            events: BTreeSet::new(),
            bundles: BTreeSet::new(),
            conflicts: BTreeSet::new(),
        }
    }

    /// Declare an event.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DuplicateEvent`] if already declared.
    pub fn add_event(&mut self, event: impl Into<Event>) -> Result<(), StructureError> {
        let event = event.into();
        if self.events.contains(&event) {
            return Err(StructureError::DuplicateEvent(event));
        }
        self.events.insert(event);
        Ok(())
    }

    /// Declare several events.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DuplicateEvent`] on the first repeat.
    pub fn add_events<E: Into<Event>>(
        &mut self,
        events: impl IntoIterator<Item = E>,
    ) -> Result<(), StructureError> {
        for event in events {
            self.add_event(event)?;
        }
        Ok(())
    }

    /// Record that two declared events conflict. Repeats collapse.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::Definition`] if either event is unknown, or
    /// [`StructureError::Algebra`] for a self-conflict.
    pub fn add_conflict(
        &mut self,
        first: impl Into<Event>,
        second: impl Into<Event>,
    ) -> Result<(), StructureError> {
        let first = self.known("conflict", first.into())?;
        let second = self.known("conflict", second.into())?;
        self.conflicts.insert(ConflictPair::new(first, second)?);
        Ok(())
    }

    /// Record a causality bundle from its members and target.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::Definition`] if any event is unknown, or
    /// [`StructureError::Algebra`] for an empty or self-causal bundle.
    pub fn add_bundle<E: Into<Event>>(
        &mut self,
        members: impl IntoIterator<Item = E>,
        target: impl Into<Event>,
    ) -> Result<(), StructureError> {
        let target = self.known("causality", target.into())?;
        let members = members
            .into_iter()
            .map(|member| self.known("causality", member.into()))
            .collect::<Result<Vec<Event>, StructureError>>()?;
        let bundle = CausalityBundle::new(members, target)?;
        self.bundles.insert(bundle);
        Ok(())
    }

    /// Record an already constructed bundle.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::Definition`] if any event is unknown.
    pub fn add_causality(&mut self, bundle: CausalityBundle) -> Result<(), StructureError> {
        for event in bundle.members().iter().chain(std::iter::once(bundle.target())) {
            if !self.events.contains(event) {
                return Err(StructureError::Definition {
                    relation: "causality",
                    event: event.clone(),
                });
            }
        }
        self.bundles.insert(bundle);
        Ok(())
    }

    fn known(&self, relation: &'static str, event: Event) -> Result<Event, StructureError> {
        if self.events.contains(&event) {
            Ok(event)
        } else {
            Err(StructureError::Definition { relation, event })
        }
    }

    /// Freeze into an [`EventStructure`].
    pub fn build(self) -> EventStructure {
        let conflict_graph = ConflictGraph::new(&self.events, &self.conflicts);
        let mut causes: BTreeMap<Event, Vec<CausalityBundle>> = BTreeMap::new();
        for bundle in &self.bundles {
            causes
                .entry(bundle.target().clone())
                .or_default()
                .push(bundle.clone());
        }
        EventStructure {
            events: self.events,
            bundles: self.bundles,
            conflicts: self.conflicts,
            causes,
            conflict_graph,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ev(name: &str) -> Event {
        Event::new(name)
    }

    fn set(names: &[&str]) -> BTreeSet<Event> {
        names.iter().copied().map(Event::from).collect()
    }

    /// Events {a, b, c}, b # c, {a} -> b, {a} -> c.
    fn choice() -> EventStructure {
        let mut builder = EventStructure::builder();
        builder.add_events(["a", "b", "c"]).unwrap();
        builder.add_conflict("b", "c").unwrap();
        builder.add_bundle(["a"], "b").unwrap();
        builder.add_bundle(["a"], "c").unwrap();
        builder.build()
    }

    #[test]
    fn builder_populates_structure() {
        let structure = choice();
        assert_eq!(structure.event_count(), 3);
        assert_eq!(structure.bundles().len(), 2);
        assert_eq!(structure.conflicts().len(), 1);
        assert_eq!(structure.initial_events(), BTreeSet::from([&ev("a")]));
    }

    #[test]
    fn unknown_event_in_conflict_is_a_definition_error() {
        let mut builder = EventStructure::builder();
        builder.add_event("a").unwrap();
        assert_eq!(
            builder.add_conflict("a", "ghost"),
            Err(StructureError::Definition {
                relation: "conflict",
                event: ev("ghost"),
            })
        );
    }

    #[test]
    fn unknown_event_in_bundle_is_a_definition_error() {
        let mut builder = EventStructure::builder();
        builder.add_event("t").unwrap();
        assert!(matches!(
            builder.add_bundle(["ghost"], "t"),
            Err(StructureError::Definition { relation: "causality", .. })
        ));
        let bundle = CausalityBundle::new([ev("ghost")], ev("t")).unwrap();
        assert!(builder.add_causality(bundle).is_err());
    }

    #[test]
    fn self_conflict_rejected() {
        let mut builder = EventStructure::builder();
        builder.add_event("a").unwrap();
        assert!(matches!(
            builder.add_conflict("a", "a"),
            Err(StructureError::Algebra(_))
        ));
    }

    #[test]
    fn duplicate_event_rejected() {
        let mut builder = EventStructure::builder();
        builder.add_event("a").unwrap();
        assert_eq!(
            builder.add_event("a"),
            Err(StructureError::DuplicateEvent(ev("a")))
        );
    }

    #[test]
    fn duplicate_conflicts_collapse() {
        let mut builder = EventStructure::builder();
        builder.add_events(["a", "b"]).unwrap();
        builder.add_conflict("a", "b").unwrap();
        builder.add_conflict("b", "a").unwrap();
        assert_eq!(builder.build().conflicts().len(), 1);
    }

    #[test]
    fn conflict_lookup_is_symmetric() {
        let structure = choice();
        assert_eq!(structure.in_conflict(&ev("b"), &ev("c")), Ok(true));
        assert_eq!(structure.in_conflict(&ev("c"), &ev("b")), Ok(true));
        assert_eq!(structure.in_conflict(&ev("a"), &ev("a")), Ok(false));
    }

    #[test]
    fn lookups_on_unknown_events_fail() {
        let structure = choice();
        assert_eq!(
            structure.bundles_targeting(&ev("zz")),
            Err(StructureError::UndefinedReference(ev("zz")))
        );
        assert!(structure.conflicts_with(&ev("zz")).is_err());
        assert!(structure.in_conflict(&ev("a"), &ev("zz")).is_err());
    }

    #[test]
    fn bundles_targeting_known_events() {
        let structure = choice();
        assert_eq!(structure.bundles_targeting(&ev("a")).map(<[_]>::len), Ok(0));
        assert_eq!(structure.bundles_targeting(&ev("b")).map(<[_]>::len), Ok(1));
    }

    #[test]
    fn configuration_predicates() {
        let structure = choice();
        assert!(structure.is_configuration(&BTreeSet::new()));
        assert!(structure.is_configuration(&set(&["a"])));
        assert!(structure.is_configuration(&set(&["a", "b"])));
        assert!(!structure.is_configuration(&set(&["b"])));
        assert!(!structure.is_configuration(&set(&["a", "b", "c"])));
        assert!(!structure.is_configuration(&set(&["a", "unknown"])));
    }

    #[test]
    fn can_extend_checks_conflict_and_causality() {
        let structure = choice();
        assert!(structure.can_extend(&BTreeSet::new(), &ev("a")));
        assert!(!structure.can_extend(&BTreeSet::new(), &ev("b")));
        assert!(structure.can_extend(&set(&["a"]), &ev("b")));
        assert!(!structure.can_extend(&set(&["a", "c"]), &ev("b")));
        assert!(!structure.can_extend(&set(&["a"]), &ev("a")));
    }

    #[test]
    fn ill_formed_bundle_detected() {
        let mut builder = EventStructure::builder();
        builder.add_events(["a", "b", "t"]).unwrap();
        builder.add_bundle(["a", "b"], "t").unwrap();
        let structure = builder.build();
        assert_eq!(structure.ill_formed_bundles().len(), 1);

        let well_formed = choice();
        assert!(well_formed.ill_formed_bundles().is_empty());
    }
}
