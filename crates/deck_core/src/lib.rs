//! deck_core - Core types and workflow state machine for deckgen
//!
//! This crate provides the foundational types used across all deckgen crates:
//! - `slide` - PlanEntry, Slide and the in-memory deck
//! - `settings` - GenerationSettings controlling pipeline prompts
//! - `stored` - Persisted artifacts (StoredPresentation, Draft, StoreSettings)
//! - `machine` - The workflow FSM (config → plan → edit → preview)

pub mod machine;
pub mod settings;
pub mod slide;
pub mod stored;

// Re-export commonly used types
pub use machine::{StateMachine, StateTransition, WorkflowEvent, WorkflowState};
pub use settings::{DetailLevel, GenerationSettings, PresentationStyle, SlideCount};
pub use slide::{PlanEntry, Slide};
pub use stored::{Draft, StoreSettings, StoredPresentation};
