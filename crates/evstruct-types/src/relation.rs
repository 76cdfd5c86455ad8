//! Conflict pairs and causality bundles.
//!
//! Both relations are value types with set-theoretic equality:
//!
//! - A [`ConflictPair`] is unordered. `(a, b)` and `(b, a)` construct the
//!   same value, so collecting pairs into a set collapses duplicates.
//! - A [`CausalityBundle`] is a member set plus a target. The target may
//!   occur only once at least one member has occurred. Several bundles may
//!   target the same event; each of them must then be satisfied.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::AlgebraError;
use crate::event::Event;

/// An unordered pair of distinct events that never co-occur.
///
/// The two events are stored in ascending order so that structural
/// equality is symmetric.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConflictPair {
    low: Event,
    high: Event,
}

impl ConflictPair {
    /// Create a conflict pair between two events.
    ///
    /// # Errors
    ///
    /// Returns [`AlgebraError::SelfConflict`] if both events are the same.
    pub fn new(first: Event, second: Event) -> Result<Self, AlgebraError> {
        match first.cmp(&second) {
            core::cmp::Ordering::Less => Ok(Self {
                low: first,
                high: second,
            }),
            core::cmp::Ordering::Greater => Ok(Self {
                low: second,
                high: first,
            }),
            core::cmp::Ordering::Equal => Err(AlgebraError::SelfConflict(first)),
        }
    }

    /// The smaller of the two events.
    pub const fn first(&self) -> &Event {
        &self.low
    }

    /// The larger of the two events.
    pub const fn second(&self) -> &Event {
        &self.high
    }

    /// Whether the pair mentions the given event.
    pub fn contains(&self, event: &Event) -> bool {
        self.low == *event || self.high == *event
    }

    /// Given one side of the pair, return the other side.
    pub fn other(&self, event: &Event) -> Option<&Event> {
        if self.low == *event {
            Some(&self.high)
        } else if self.high == *event {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl core::fmt::Display for ConflictPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} # {}", self.low, self.high)
    }
}

/// A disjunctive enabling condition: `target` needs one of `members` first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CausalityBundle {
    members: BTreeSet<Event>,
    target: Event,
}

impl CausalityBundle {
    /// Create a bundle from its members and target.
    ///
    /// Duplicate members collapse.
    ///
    /// # Errors
    ///
    /// Returns [`AlgebraError::EmptyBundle`] when no members are given and
    /// [`AlgebraError::SelfCausality`] when the target is listed as a member.
    pub fn new(
        members: impl IntoIterator<Item = Event>,
        target: Event,
    ) -> Result<Self, AlgebraError> {
        let members: BTreeSet<Event> = members.into_iter().collect();
        if members.is_empty() {
            return Err(AlgebraError::EmptyBundle(target));
        }
        if members.contains(&target) {
            return Err(AlgebraError::SelfCausality(target));
        }
        Ok(Self { members, target })
    }

    /// The alternative causes.
    pub const fn members(&self) -> &BTreeSet<Event> {
        &self.members
    }

    /// The event this bundle enables.
    pub const fn target(&self) -> &Event {
        &self.target
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; bundles are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `event` is one of the alternative causes.
    pub fn contains(&self, event: &Event) -> bool {
        self.members.contains(event)
    }

    /// Whether at least one member is in `occurred`.
    pub fn is_satisfied_by(&self, occurred: &BTreeSet<Event>) -> bool {
        self.members.iter().any(|member| occurred.contains(member))
    }

    /// The same bundle with `event` removed from its members.
    ///
    /// Returns `None` if removing it would leave the bundle empty.
    pub fn without(&self, event: &Event) -> Option<Self> {
        let members: BTreeSet<Event> = self
            .members
            .iter()
            .filter(|member| *member != event)
            .cloned()
            .collect();
        if members.is_empty() {
            return None;
        }
        Some(Self {
            members,
            target: self.target.clone(),
        })
    }

    /// Every unordered pair of distinct members, in ascending order.
    pub fn member_pairs(&self) -> impl Iterator<Item = (&Event, &Event)> {
        self.members.iter().enumerate().flat_map(move |(position, first)| {
            self.members
                .iter()
                .skip(position.saturating_add(1))
                .map(move |second| (first, second))
        })
    }

    /// Whether every two members are in conflict according to `in_conflict`.
    ///
    /// This is the well-formedness condition every bundle satisfies after
    /// minimization.
    pub fn is_pairwise_conflicting(&self, in_conflict: impl Fn(&Event, &Event) -> bool) -> bool {
        self.member_pairs()
            .all(|(first, second)| in_conflict(first, second))
    }
}

impl core::fmt::Display for CausalityBundle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("{")?;
        for (position, member) in self.members.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{member}")?;
        }
        write!(f, "}} -> {}", self.target)
    }
}
