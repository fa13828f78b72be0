//! deck_pipeline - Orchestration of the generation workflow
//!
//! Chains the three remote stages (plan → content → per-slide notes) through
//! the retry executor, owns the explicit workflow state container, and wires
//! auto-save and deck export. All mutation of workflow state goes through
//! `GenerationService` methods.

pub mod context;
pub mod prompts;
pub mod service;

pub use context::{MoveDirection, WorkflowContext};
pub use prompts::NOTES_FALLBACK;
pub use service::GenerationService;
