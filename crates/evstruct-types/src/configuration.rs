//! Configurations: consistent, possibly partial, executions.
//!
//! A [`Configuration`] remembers the order in which its events were added
//! (its build order) but compares, orders, and hashes by member set only.
//! Two configurations reached through different interleavings are the same
//! configuration.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// An event subset together with one order in which it was built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Event>", into = "Vec<Event>")]
pub struct Configuration {
    order: Vec<Event>,
    members: BTreeSet<Event>,
}

impl Configuration {
    /// The empty configuration.
    pub const fn empty() -> Self {
        Self {
            order: Vec::new(),
            members: BTreeSet::new(),
        }
    }

    /// Build a configuration from events in the order they occurred.
    ///
    /// Repeated events keep their first position.
    pub fn from_build_order(events: impl IntoIterator<Item = Event>) -> Self {
        let mut configuration = Self::empty();
        for event in events {
            configuration.push(event);
        }
        configuration
    }

    /// Return a copy of this configuration with `event` appended.
    pub fn extended(&self, event: Event) -> Self {
        let mut next = self.clone();
        next.push(event);
        next
    }

    fn push(&mut self, event: Event) {
        if self.members.insert(event.clone()) {
            self.order.push(event);
        }
    }

    /// Events in the order they were added.
    pub fn build_order(&self) -> &[Event] {
        &self.order
    }

    /// Events as a set.
    pub const fn members(&self) -> &BTreeSet<Event> {
        &self.members
    }

    /// Whether `event` is a member.
    pub fn contains(&self, event: &Event) -> bool {
        self.members.contains(event)
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether this is the empty configuration.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Every build-order prefix, from the empty configuration up to this one.
    pub fn prefixes(&self) -> impl Iterator<Item = Self> + '_ {
        (0..=self.order.len())
            .map(|length| Self::from_build_order(self.order.iter().take(length).cloned()))
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for Configuration {}

impl PartialOrd for Configuration {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Configuration {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.members.cmp(&other.members)
    }
}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.members.hash(state);
    }
}

impl From<Vec<Event>> for Configuration {
    fn from(events: Vec<Event>) -> Self {
        Self::from_build_order(events)
    }
}

impl From<Configuration> for Vec<Event> {
    fn from(configuration: Configuration) -> Self {
        configuration.order
    }
}

impl core::fmt::Display for Configuration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("{")?;
        for (position, event) in self.members.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{event}")?;
        }
        f.write_str("}")
    }
}
