//! Error types for the `evstruct-structure` crate.
//!
//! All fallible operations in this crate return [`StructureError`].

use evstruct_types::{AlgebraError, Event};

/// Errors that can occur while building or querying an event structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// A relation names an event that was never declared.
    #[error("{relation} references unknown event {event}")]
    Definition {
        /// Which relation was being inserted ("conflict", "causality").
        relation: &'static str,
        /// The undeclared event.
        event: Event,
    },

    /// A causality or conflict lookup asked about an event absent from the
    /// structure.
    #[error("undefined event: {0}")]
    UndefinedReference(Event),

    /// The same event was declared twice.
    #[error("duplicate event: {0}")]
    DuplicateEvent(Event),

    /// A primitive could not be constructed.
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}
