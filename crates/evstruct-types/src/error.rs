//! Error types for the `evstruct-types` crate.

use crate::event::Event;

/// Errors raised when constructing event-algebra primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraError {
    /// A conflict pair was requested between an event and itself.
    #[error("event {0} cannot conflict with itself")]
    SelfConflict(Event),

    /// A causality bundle was requested with no members.
    #[error("causality bundle targeting {0} has no members")]
    EmptyBundle(Event),

    /// A causality bundle lists its own target as a cause.
    #[error("event {0} cannot be a member of its own causality bundle")]
    SelfCausality(Event),
}
