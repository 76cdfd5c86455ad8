//! Event algebra primitives for evstruct.
//!
//! This crate holds the vocabulary shared by both behavioral formalisms:
//! transition graphs and event structures. Everything here is an immutable
//! value type with set-theoretic equality.
//!
//! # Modules
//!
//! - [`event`] -- [`Event`] (identity by name) and [`StateId`] (opaque state
//!   label).
//! - [`relation`] -- [`ConflictPair`] and [`CausalityBundle`].
//! - [`configuration`] -- [`Configuration`], an event set with a build order.
//! - [`feature`] -- The [`FeatureSolver`] seam, [`Proposition`] formulas, and
//!   the built-in [`TruthTableSolver`].
//! - [`error`] -- [`AlgebraError`] for malformed primitives.

pub mod configuration;
pub mod error;
pub mod event;
pub mod feature;
pub mod relation;

// Re-export primary types at crate root.
pub use configuration::Configuration;
pub use error::AlgebraError;
pub use event::{Event, StateId};
pub use feature::{
    DEFAULT_MAX_VARIABLES, FeatureSolver, Guard, Proposition, SolverError, TruthTableSolver,
};
pub use relation::{CausalityBundle, ConflictPair};
