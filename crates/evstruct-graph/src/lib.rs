//! Transition graphs for evstruct.
//!
//! The operational formalism: states connected by action-labeled
//! transitions, optionally annotated with feature formulas. Graphs are
//! generic over the formula type, defaulting to
//! [`evstruct_types::Proposition`].
//!
//! # Modules
//!
//! - [`transition_graph`] -- [`TransitionGraph`], [`Transition`], and the
//!   validating [`TransitionGraphBuilder`].
//! - [`reachability`] -- [`ReachabilityOracle`]: action-to-action
//!   reachability and immediate precedence.
//! - [`equivalence`] -- Trace equivalence, plain and featured.
//! - [`view`] -- Serializable [`TransitionGraphView`].
//! - [`error`] -- [`GraphError`].

pub mod equivalence;
pub mod error;
pub mod reachability;
pub mod transition_graph;
pub mod view;

// Re-export primary types at crate root.
pub use equivalence::{
    featured_trace_equivalent, featured_traces, trace_divergence, trace_equivalent,
};
pub use error::GraphError;
pub use reachability::ReachabilityOracle;
pub use transition_graph::{Transition, TransitionGraph, TransitionGraphBuilder};
pub use view::{TransitionGraphView, TransitionView};
