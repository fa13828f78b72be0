//! Slide and plan entry types shared by the pipeline stages.

use serde::{Deserialize, Serialize};

/// One entry of the presentation plan produced by the plan stage.
///
/// The plan is transient: it is edited in memory between the plan and
/// content stages and never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub title: String,
    pub description: String,
}

impl PlanEntry {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A generated slide: markdown content plus optional speaker notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub title: String,
    /// Markdown body of the slide.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_notes: Option<String>,
}

impl Slide {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            speaker_notes: None,
        }
    }

    /// Whether the slide already carries speaker notes. Callers use this to
    /// gate re-triggering note generation.
    pub fn has_notes(&self) -> bool {
        self.speaker_notes
            .as_deref()
            .map(|n| !n.trim().is_empty())
            .unwrap_or(false)
    }
}
