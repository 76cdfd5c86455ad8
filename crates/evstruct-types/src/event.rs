//! Named events and opaque state labels.
//!
//! An [`Event`] is identified purely by its name: two events with the same
//! name are the same event. Events double as the action labels of
//! transition graphs, which is what lets the two formalisms share one
//! vocabulary.
//!
//! A [`StateId`] is an opaque numeric label. States carry no meaning of
//! their own; in a reconstructed graph each one stands for exactly one
//! configuration.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// An atomic named occurrence. Immutable; identity by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(String);

impl Event {
    /// Create an event with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the event's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Event {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Event {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<Event> for String {
    fn from(event: Event) -> Self {
        event.0
    }
}

// Ordering and hashing of `Event` agree with `str`, so set lookups by name work.
impl Borrow<str> for Event {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Opaque state label of a transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(u32);

impl StateId {
    /// Create a state label from its numeric index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the numeric index of this state.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for StateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<u32> for StateId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}
