//! Workflow events - Defines events that trigger state transitions.

use serde::{Deserialize, Serialize};

/// Defines the events that can trigger state transitions in the FSM.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    // ========== Pipeline Events ==========
    /// The plan stage completed successfully.
    PlanGenerated {
        /// Number of entries in the new plan.
        entry_count: usize,
    },

    /// The content stage completed successfully.
    ContentGenerated {
        /// Number of slides produced.
        slide_count: usize,
    },

    // ========== View Events ==========
    /// User opened the read-only preview.
    PreviewOpened,

    /// User closed the preview and returned to editing.
    PreviewClosed,

    /// User started presentation mode.
    PresentationStarted,

    /// User left presentation mode.
    PresentationEnded,

    // ========== User Actions ==========
    /// A stored presentation was loaded from history.
    PresentationLoaded,

    /// User reset the workflow, discarding the in-memory deck.
    Reset,
}
