//! Transition graphs: states joined by action-labeled edges.
//!
//! A [`TransitionGraph`] is the operational side of the model. Each
//! [`Transition`] may carry a feature formula; an unannotated transition is
//! always enabled. Internally an adjacency map indexes outgoing transitions
//! per state: `BTreeMap<StateId, Vec<Transition<F>>>`.
//!
//! Graphs are assembled through a [`TransitionGraphBuilder`], which rejects
//! references to undeclared states and actions at insertion time.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use evstruct_types::{Event, Guard, Proposition, StateId};

use crate::error::GraphError;

/// One labeled edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<F = Proposition> {
    source: StateId,
    action: Event,
    target: StateId,
    feature: Guard<F>,
}

impl<F> Transition<F> {
    /// Source state.
    pub const fn source(&self) -> StateId {
        self.source
    }

    /// Action label.
    pub const fn action(&self) -> &Event {
        &self.action
    }

    /// Target state.
    pub const fn target(&self) -> StateId {
        self.target
    }

    /// Feature formula, or `None` when unannotated.
    pub const fn feature(&self) -> Option<&F> {
        self.feature.as_ref()
    }
}

/// A frozen transition graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionGraph<F = Proposition> {
    actions: BTreeSet<Event>,
    states: BTreeSet<StateId>,
    /// Outbound adjacency: state -> transitions departing from it.
    outgoing: BTreeMap<StateId, Vec<Transition<F>>>,
    initial: StateId,
}

impl<F> TransitionGraph<F> {
    /// Start building a new graph.
    pub const fn builder() -> TransitionGraphBuilder<F> {
        TransitionGraphBuilder::new()
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// All declared actions.
    pub const fn actions(&self) -> &BTreeSet<Event> {
        &self.actions
    }

    /// All declared states.
    pub const fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    /// The initial state.
    pub const fn initial_state(&self) -> StateId {
        self.initial
    }

    /// Whether `action` is declared.
    pub fn has_action(&self, action: &Event) -> bool {
        self.actions.contains(action)
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of transitions.
    pub fn transition_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    /// Every transition, grouped by source state in ascending order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition<F>> {
        self.outgoing.values().flatten()
    }

    /// Transitions labeled `action`.
    pub fn transitions_labeled<'a>(
        &'a self,
        action: &'a Event,
    ) -> impl Iterator<Item = &'a Transition<F>> {
        self.transitions()
            .filter(move |transition| transition.action() == action)
    }

    /// Transitions departing `state`.
    pub fn outgoing(&self, state: StateId) -> &[Transition<F>] {
        self.outgoing.get(&state).map(Vec::as_slice).unwrap_or_default()
    }

    /// Actions labeling a transition out of `state`.
    pub fn enabled_actions(&self, state: StateId) -> BTreeSet<&Event> {
        self.outgoing(state)
            .iter()
            .map(Transition::action)
            .collect()
    }

    /// Whether any transition carries a feature formula.
    pub fn is_featured(&self) -> bool {
        self.transitions()
            .any(|transition| transition.feature.is_some())
    }

    // -------------------------------------------------------------------
    // Structure queries
    // -------------------------------------------------------------------

    /// States reachable from the initial state, ignoring features.
    pub fn reachable_states(&self) -> BTreeSet<StateId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(self.initial);
        queue.push_back(self.initial);

        while let Some(current) = queue.pop_front() {
            for transition in self.outgoing(current) {
                if visited.insert(transition.target) {
                    queue.push_back(transition.target);
                }
            }
        }

        visited
    }

    /// Declared actions that label no transition out of a reachable state.
    ///
    /// Derivation reports such actions as conflicting with everything, so
    /// round trips are only exact for graphs where this is empty.
    pub fn unreachable_actions(&self) -> BTreeSet<&Event> {
        let reachable = self.reachable_states();
        let fired: BTreeSet<&Event> = reachable
            .iter()
            .flat_map(|state| self.outgoing(*state))
            .map(Transition::action)
            .collect();
        self.actions
            .iter()
            .filter(|action| !fired.contains(action))
            .collect()
    }
}

impl<F> Default for TransitionGraph<F> {
    /// A single initial state `s0` with no actions.
    fn default() -> Self {
        let initial = StateId::new(0);
        Self {
            actions: BTreeSet::new(),
            states: BTreeSet::from([initial]),
            outgoing: BTreeMap::new(),
            initial,
        }
    }
}

/// Mutable builder for a [`TransitionGraph`].
#[derive(Debug, Clone)]
pub struct TransitionGraphBuilder<F = Proposition> {
    actions: BTreeSet<Event>,
    states: BTreeSet<StateId>,
    outgoing: BTreeMap<StateId, Vec<Transition<F>>>,
    initial: Option<StateId>,
}

impl<F> TransitionGraphBuilder<F> {
    /// Create an empty builder.
    pub const fn new() -> Self {
        Self {
            actions: BTreeSet::new(),
            states: BTreeSet::new(),
            outgoing: BTreeMap::new(),
            initial: None,
        }
    }

    /// Declare an action.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateAction`] if already declared.
    pub fn add_action(&mut self, action: impl Into<Event>) -> Result<(), GraphError> {
        let action = action.into();
        if self.actions.contains(&action) {
            return Err(GraphError::DuplicateAction(action));
        }
        self.actions.insert(action);
        Ok(())
    }

    /// Declare several actions.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateAction`] on the first repeat.
    pub fn add_actions<E: Into<Event>>(
        &mut self,
        actions: impl IntoIterator<Item = E>,
    ) -> Result<(), GraphError> {
        for action in actions {
            self.add_action(action)?;
        }
        Ok(())
    }

    /// Declare a state.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateState`] if already declared.
    pub fn add_state(&mut self, state: StateId) -> Result<(), GraphError> {
        if !self.states.insert(state) {
            return Err(GraphError::DuplicateState(state));
        }
        Ok(())
    }

    /// Declare several states.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateState`] on the first repeat.
    pub fn add_states(
        &mut self,
        states: impl IntoIterator<Item = StateId>,
    ) -> Result<(), GraphError> {
        for state in states {
            self.add_state(state)?;
        }
        Ok(())
    }

    /// Mark the initial state.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Definition`] if the state is undeclared.
    pub fn set_initial(&mut self, state: StateId) -> Result<(), GraphError> {
        let state = self.known_state(state)?;
        self.initial = Some(state);
        Ok(())
    }

    /// Add an unannotated transition.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Definition`] if a state or the action is
    /// undeclared.
    pub fn add_transition(
        &mut self,
        source: StateId,
        action: impl Into<Event>,
        target: StateId,
    ) -> Result<(), GraphError> {
        self.add_guarded_transition(source, action, target, None)
    }

    /// Add a transition with an optional feature formula.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Definition`] if a state or the action is
    /// undeclared.
    pub fn add_guarded_transition(
        &mut self,
        source: StateId,
        action: impl Into<Event>,
        target: StateId,
        feature: Guard<F>,
    ) -> Result<(), GraphError> {
        let source = self.known_state(source)?;
        let target = self.known_state(target)?;
        let action = action.into();
        if !self.actions.contains(&action) {
            return Err(GraphError::Definition {
                element: "action",
                name: action.to_string(),
            });
        }
        self.outgoing.entry(source).or_default().push(Transition {
            source,
            action,
            target,
            feature,
        });
        Ok(())
    }

    fn known_state(&self, state: StateId) -> Result<StateId, GraphError> {
        if self.states.contains(&state) {
            Ok(state)
        } else {
            Err(GraphError::Definition {
                element: "state",
                name: state.to_string(),
            })
        }
    }

    /// Freeze into a [`TransitionGraph`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingInitialState`] if no initial state was
    /// set.
    pub fn build(self) -> Result<TransitionGraph<F>, GraphError> {
        let initial = self.initial.ok_or(GraphError::MissingInitialState)?;
        Ok(TransitionGraph {
            actions: self.actions,
            states: self.states,
            outgoing: self.outgoing,
            initial,
        })
    }
}

impl<F> Default for TransitionGraphBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}
