//! Workflow states - the coarse step the user is in.

use serde::{Deserialize, Serialize};

/// Defines the possible steps of the generation workflow.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Entering the prompt, credential and generation settings.
    Config,

    /// A plan has been generated and is being reviewed/edited.
    Plan,

    /// Full slide content exists and is being edited.
    Edit,

    /// Read-only preview of the deck. A pure view change from Edit.
    Preview,

    /// The deck is being presented. Entered from Edit.
    Presenting,
}

impl Default for WorkflowState {
    fn default() -> Self {
        WorkflowState::Config
    }
}

impl WorkflowState {
    /// Whether generated slide content is visible in this step.
    pub fn has_content(&self) -> bool {
        matches!(self, Self::Edit | Self::Preview | Self::Presenting)
    }

    /// Get a human-readable description of the current step.
    pub fn description(&self) -> &str {
        match self {
            Self::Config => "Configuring the presentation",
            Self::Plan => "Reviewing the plan",
            Self::Edit => "Editing slides",
            Self::Preview => "Previewing the deck",
            Self::Presenting => "Presenting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_config() {
        assert_eq!(WorkflowState::default(), WorkflowState::Config);
    }

    #[test]
    fn serializes_as_snake_case_step_names() {
        let json = serde_json::to_string(&WorkflowState::Config).unwrap();
        assert_eq!(json, "\"config\"");
        let state: WorkflowState = serde_json::from_str("\"presenting\"").unwrap();
        assert_eq!(state, WorkflowState::Presenting);
    }

    #[test]
    fn content_visibility() {
        assert!(!WorkflowState::Config.has_content());
        assert!(!WorkflowState::Plan.has_content());
        assert!(WorkflowState::Edit.has_content());
        assert!(WorkflowState::Preview.has_content());
    }
}
