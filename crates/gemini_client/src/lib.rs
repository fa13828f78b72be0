//! gemini_client - Gemini `generateContent` plumbing for deckgen
//!
//! This crate owns everything that talks to the generation endpoint:
//! - `protocol` - request/response wire types and the candidates envelope
//! - `client` - the HTTP client with status classification
//! - `retry` - exponential-backoff retry executor with shared retry state
//! - `validator` - debounced API-key format + liveness validation
//! - `error` - the error taxonomy shared by the pipeline stages

pub mod client;
pub mod error;
pub mod protocol;
pub mod retry;
pub mod validator;

pub use client::GeminiClient;
pub use error::{GenerationError, Result};
pub use protocol::{Content, GenerateContentRequest, GenerateContentResponse, Part};
pub use retry::{RetryExecutor, RetryState, DEFAULT_CONTENT_ATTEMPTS, DEFAULT_NOTES_ATTEMPTS};
pub use validator::{ApiKeyValidator, ValidationState, ValidationStatus};
