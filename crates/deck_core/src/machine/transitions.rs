//! State transitions - FSM transition logic
//!
//! Implements the state machine that handles event-driven workflow
//! transitions. Stage completions are only accepted from the step that
//! launched them; view changes never touch generated content.

use super::events::WorkflowEvent;
use super::states::WorkflowState;

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: WorkflowState,
    /// The state after the transition.
    pub to: WorkflowState,
    /// The event that triggered the transition.
    pub event: WorkflowEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine for managing workflow state transitions.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    current_state: WorkflowState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    /// Max history entries to keep.
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine in the Config step.
    pub fn new() -> Self {
        Self {
            current_state: WorkflowState::Config,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Create a state machine with a specific initial state.
    pub fn with_state(state: WorkflowState) -> Self {
        Self {
            current_state: state,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> &WorkflowState {
        &self.current_state
    }

    /// Get the transition history.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Handle an event and transition to a new state.
    pub fn handle_event(&mut self, event: WorkflowEvent) -> StateTransition {
        let old_state = self.current_state.clone();
        let new_state = self.compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Compute the next state given current state and event.
    fn compute_next_state(&self, state: &WorkflowState, event: &WorkflowEvent) -> WorkflowState {
        use WorkflowEvent::*;
        use WorkflowState::*;

        match (state, event) {
            // ========== Pipeline Progress ==========
            // Plan re-entry covers regeneration from the plan editor.
            (Config, PlanGenerated { .. }) => Plan,
            (Plan, PlanGenerated { .. }) => Plan,
            (Plan, ContentGenerated { .. }) => Edit,

            // ========== View Changes ==========
            (Edit, PreviewOpened) => Preview,
            (Preview, PreviewClosed) => Edit,
            (Edit, PresentationStarted) => Presenting,
            (Presenting, PresentationEnded) => Edit,

            // ========== User Actions ==========
            (_, PresentationLoaded) => Edit,
            (_, Reset) => Config,

            // ========== Default: No transition ==========
            _ => state.clone(),
        }
    }

    /// Check if a transition is valid without executing it.
    pub fn can_transition(&self, event: &WorkflowEvent) -> bool {
        let next = self.compute_next_state(&self.current_state, event);
        next != self.current_state
    }

    /// Reset to the Config step.
    pub fn reset(&mut self) {
        self.current_state = WorkflowState::Config;
    }
}
