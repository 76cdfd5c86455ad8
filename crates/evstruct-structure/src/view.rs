//! Serializable snapshot of an event structure.
//!
//! [`EventStructureView`] is the plain data shape used for fixtures and
//! serialized models. Converting back goes through the builder, so
//! a view can never produce a structure that skipped validation.

use serde::{Deserialize, Serialize};

use crate::error::StructureError;
use crate::structure::EventStructure;

/// One causality bundle in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleView {
    /// Member event names.
    pub bundle: Vec<String>,
    /// Target event name.
    pub target: String,
}

/// Flat, serializable event structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStructureView {
    /// Event names.
    pub events: Vec<String>,
    /// Causality bundles.
    #[serde(default)]
    pub causality: Vec<BundleView>,
    /// Conflicting pairs of event names.
    #[serde(default)]
    pub conflicts: Vec<(String, String)>,
}

impl EventStructure {
    /// Snapshot as a serializable view. Collections are sorted.
    pub fn view(&self) -> EventStructureView {
        EventStructureView {
            events: self.events().iter().map(ToString::to_string).collect(),
            causality: self
                .bundles()
                .iter()
                .map(|bundle| BundleView {
                    bundle: bundle.members().iter().map(ToString::to_string).collect(),
                    target: bundle.target().to_string(),
                })
                .collect(),
            conflicts: self
                .conflicts()
                .iter()
                .map(|pair| (pair.first().to_string(), pair.second().to_string()))
                .collect(),
        }
    }

    /// Rebuild a structure from a view.
    ///
    /// # Errors
    ///
    /// Any builder error: duplicate events, unknown references, empty or
    /// self-causal bundles, self-conflicts.
    pub fn from_view(view: &EventStructureView) -> Result<Self, StructureError> {
        let mut builder = Self::builder();
        builder.add_events(view.events.iter().map(String::as_str))?;
        for entry in &view.causality {
            builder.add_bundle(entry.bundle.iter().map(String::as_str), entry.target.as_str())?;
        }
        for (first, second) in &view.conflicts {
            builder.add_conflict(first.as_str(), second.as_str())?;
        }
        Ok(builder.build())
    }
}

impl TryFrom<EventStructureView> for EventStructure {
    type Error = StructureError;

    fn try_from(view: EventStructureView) -> Result<Self, Self::Error> {
        Self::from_view(&view)
    }
}

impl From<&EventStructure> for EventStructureView {
    fn from(structure: &EventStructure) -> Self {
        structure.view()
    }
}
