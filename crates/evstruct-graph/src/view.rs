//! Serializable snapshot of a transition graph.

use evstruct_types::{Proposition, StateId};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::transition_graph::{Transition, TransitionGraph};

/// One transition in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de>"))]
pub struct TransitionView<F = Proposition> {
    /// Source state index.
    pub source: u32,
    /// Action name.
    pub action: String,
    /// Target state index.
    pub target: u32,
    /// Feature formula, omitted when unannotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<F>,
}

/// Flat, serializable transition graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de>"))]
pub struct TransitionGraphView<F = Proposition> {
    /// Action names.
    pub actions: Vec<String>,
    /// State indices.
    pub states: Vec<u32>,
    /// Transitions.
    #[serde(default)]
    pub transitions: Vec<TransitionView<F>>,
    /// Initial state index.
    pub initial_state: u32,
}

impl<F: Clone> TransitionGraph<F> {
    /// Snapshot as a serializable view. Transitions are grouped by source.
    pub fn view(&self) -> TransitionGraphView<F> {
        TransitionGraphView {
            actions: self.actions().iter().map(ToString::to_string).collect(),
            states: self.states().iter().map(|state| state.index()).collect(),
            transitions: self
                .transitions()
                .map(|transition: &Transition<F>| TransitionView {
                    source: transition.source().index(),
                    action: transition.action().to_string(),
                    target: transition.target().index(),
                    feature: transition.feature().cloned(),
                })
                .collect(),
            initial_state: self.initial_state().index(),
        }
    }

    /// Rebuild a graph from a view.
    ///
    /// # Errors
    ///
    /// Any builder error: duplicate declarations, unknown states or actions,
    /// or an undeclared initial state.
    pub fn from_view(view: &TransitionGraphView<F>) -> Result<Self, GraphError> {
        let mut builder = Self::builder();
        builder.add_actions(view.actions.iter().map(String::as_str))?;
        builder.add_states(view.states.iter().copied().map(StateId::new))?;
        builder.set_initial(StateId::new(view.initial_state))?;
        for transition in &view.transitions {
            builder.add_guarded_transition(
                StateId::new(transition.source),
                transition.action.as_str(),
                StateId::new(transition.target),
                transition.feature.clone(),
            )?;
        }
        builder.build()
    }
}

impl<F: Clone> TryFrom<&TransitionGraphView<F>> for TransitionGraph<F> {
    type Error = GraphError;

    fn try_from(view: &TransitionGraphView<F>) -> Result<Self, Self::Error> {
        Self::from_view(view)
    }
}
