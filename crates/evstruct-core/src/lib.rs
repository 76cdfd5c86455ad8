//! Derivation, minimization, and reconstruction for evstruct.
//!
//! This crate connects the two formalisms. It derives an event structure
//! from a transition graph using reachability alone, minimizes the derived
//! causality bundles, and rebuilds a transition graph from the
//! configuration lattice of a structure.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `evstruct-config.yaml` into
//!   strongly-typed structs.
//! - [`derive`] -- Transition graph to [`DerivedStructure`].
//! - [`minimize`] -- Splitting candidate bundles into pairwise-conflicting
//!   bundles.
//! - [`reconstruct`] -- Event structure to [`Reconstruction`].
//! - [`engine`] -- [`Engine`], the full pipeline with round-trip checks.
//! - [`telemetry`] -- Log subscriber setup from [`LoggingConfig`].
//! - [`error`] -- [`CoreError`].
//!
//! [`LoggingConfig`]: config::LoggingConfig

pub mod config;
pub mod derive;
pub mod engine;
pub mod error;
pub mod minimize;
pub mod reconstruct;
pub mod telemetry;

// Re-export primary types at crate root.
pub use config::{ConfigError, EngineConfig};
pub use derive::DerivedStructure;
pub use engine::{Engine, RoundTripReport};
pub use error::CoreError;
pub use minimize::SplitOrder;
pub use reconstruct::Reconstruction;
