//! Event structures for evstruct.
//!
//! An event structure describes behavior declaratively: a set of events,
//! causality bundles saying which events must precede others, and a
//! symmetric conflict relation saying which events exclude each other.
//!
//! # Modules
//!
//! - [`structure`] -- [`EventStructure`] and its validating builder.
//! - [`conflict_graph`] -- The conflict relation as an undirected graph:
//!   maximal cliques and a greedy biclique edge cover.
//! - [`configuration`] -- Enumeration of configurations, plain and
//!   feature-filtered.
//! - [`metrics`] -- [`StructureMetrics`] summary figures.
//! - [`view`] -- Serializable [`EventStructureView`].
//! - [`error`] -- [`StructureError`].

pub mod configuration;
pub mod conflict_graph;
pub mod error;
pub mod metrics;
pub mod structure;
pub mod view;

// Re-export primary types at crate root.
pub use configuration::FeasibleConfiguration;
pub use conflict_graph::{Biclique, ConflictGraph};
pub use error::StructureError;
pub use metrics::StructureMetrics;
pub use structure::{EventStructure, EventStructureBuilder};
pub use view::{BundleView, EventStructureView};
