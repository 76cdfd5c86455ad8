//! Error types for the `evstruct-core` crate.
//!
//! [`CoreError`] wraps the errors of every lower crate so the engine
//! pipeline can propagate them with `?`.

use std::num::TryFromIntError;

use evstruct_graph::GraphError;
use evstruct_structure::StructureError;
use evstruct_types::{AlgebraError, SolverError};

use crate::config::ConfigError;

/// Errors that can occur in the derivation and reconstruction pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A transition graph could not be assembled.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// An event structure could not be assembled.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// A bundle or conflict pair was malformed.
    #[error(transparent)]
    Algebra(#[from] AlgebraError),

    /// The feature solver failed.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reconstruction produced more configurations than state labels.
    #[error("too many configurations to number as states: {source}")]
    TooManyStates {
        /// The failed index conversion.
        source: TryFromIntError,
    },

    /// The log subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Telemetry(String),
}
