//! Error types for the `evstruct-graph` crate.
//!
//! Building a transition graph returns [`GraphError`]. Queries never fail
//! on their own; reachability and featured trace comparison only propagate
//! [`evstruct_types::SolverError`] from the injected solver.

use evstruct_types::{Event, StateId};

/// Errors that can occur while building a transition graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A transition or the initial-state marker names an undeclared element.
    #[error("unknown {element}: {name}")]
    Definition {
        /// What kind of element was missing ("state", "action").
        element: &'static str,
        /// Display form of the missing element.
        name: String,
    },

    /// The same action was declared twice.
    #[error("duplicate action: {0}")]
    DuplicateAction(Event),

    /// The same state was declared twice.
    #[error("duplicate state: {0}")]
    DuplicateState(StateId),

    /// `build` was called before an initial state was set.
    #[error("transition graph has no initial state")]
    MissingInitialState,
}
