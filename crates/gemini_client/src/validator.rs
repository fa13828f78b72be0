//! Debounced API key validation.
//!
//! Each credential edit cancels any pending validation and schedules a new
//! one after a quiet period (a single-slot timer, not a queue). Format
//! checks run before any network call; a minimal liveness probe classifies
//! the rest. Validation never fails a caller: it only updates the tri-state
//! status and its message.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::client::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::GenerationError;

/// Required literal prefix of a Gemini API key.
pub const REQUIRED_PREFIX: &str = "AIza";
/// Minimum plausible key length.
pub const MIN_KEY_LENGTH: usize = 10;
/// Quiet period after the last edit before validation fires.
pub const DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// No validation has completed for the current text.
    Unset,
    Valid,
    Invalid,
}

#[derive(Debug, Clone)]
pub struct ValidationState {
    pub status: ValidationStatus,
    pub message: String,
    /// True while the liveness probe is in flight.
    pub is_validating: bool,
}

impl Default for ValidationState {
    fn default() -> Self {
        Self {
            status: ValidationStatus::Unset,
            message: String::new(),
            is_validating: false,
        }
    }
}

/// Debounced format + liveness validator for the generation credential.
#[derive(Clone)]
pub struct ApiKeyValidator {
    state: Arc<RwLock<ValidationState>>,
    /// Single-slot debounce timer; a new edit aborts the pending task.
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
    debounce: Duration,
    base_url: String,
    model: String,
}

impl Default for ApiKeyValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiKeyValidator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ValidationState::default())),
            pending: Arc::new(Mutex::new(None)),
            debounce: DEBOUNCE,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point the liveness probe at a custom endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the quiet period.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Snapshot of the current validation state.
    pub async fn state(&self) -> ValidationState {
        self.state.read().await.clone()
    }

    /// Check the credential's format without touching the network.
    pub fn check_format(key: &str) -> std::result::Result<(), String> {
        if key.len() < MIN_KEY_LENGTH {
            return Err("API key too short".to_string());
        }
        if !key.starts_with(REQUIRED_PREFIX) {
            return Err(format!(
                "Invalid API key format (must start with \"{REQUIRED_PREFIX}\")"
            ));
        }
        Ok(())
    }

    /// Record a credential edit.
    ///
    /// Resets the status to Unset, cancels any pending validation and, for a
    /// non-empty key, schedules a fresh validation after the quiet period.
    pub async fn update_key(&self, key: &str) {
        let mut pending = self.pending.lock().await;
        if let Some(task) = pending.take() {
            task.abort();
        }

        *self.state.write().await = ValidationState::default();

        let key = key.to_string();
        if key.is_empty() {
            return;
        }

        let state = self.state.clone();
        let base_url = self.base_url.clone();
        let model = self.model.clone();
        let debounce = self.debounce;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            validate(&state, &base_url, &model, &key).await;
        }));
    }

    /// Validate immediately, bypassing the debounce. Returns whether the key
    /// ended up valid.
    pub async fn validate_now(&self, key: &str) -> bool {
        validate(&self.state, &self.base_url, &self.model, key).await
    }
}

async fn validate(
    state: &Arc<RwLock<ValidationState>>,
    base_url: &str,
    model: &str,
    key: &str,
) -> bool {
    if let Err(message) = ApiKeyValidator::check_format(key) {
        let mut guard = state.write().await;
        guard.status = ValidationStatus::Invalid;
        guard.message = message;
        guard.is_validating = false;
        return false;
    }

    state.write().await.is_validating = true;

    let client = GeminiClient::new(key)
        .with_base_url(base_url)
        .with_model(model);

    let (status, message) = match client.probe().await {
        Ok(()) => (ValidationStatus::Valid, "API key is valid".to_string()),
        Err(GenerationError::Permission(_)) => (
            ValidationStatus::Invalid,
            "API key invalid or has insufficient permissions".to_string(),
        ),
        Err(GenerationError::RateLimit(_)) => {
            (ValidationStatus::Invalid, "Validation error (429)".to_string())
        }
        Err(GenerationError::Api { status, .. }) => (
            ValidationStatus::Invalid,
            format!("Validation error ({status})"),
        ),
        Err(_) => (
            ValidationStatus::Invalid,
            "Could not validate the API key".to_string(),
        ),
    };

    log::debug!("key validation finished: {status:?}");

    let valid = status == ValidationStatus::Valid;
    let mut guard = state.write().await;
    guard.status = status;
    guard.message = message;
    guard.is_validating = false;
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_key_is_rejected_without_network() {
        // Unroutable base URL: a network attempt would fail loudly with a
        // different message than the format error asserted here.
        let validator = ApiKeyValidator::new().with_base_url("http://127.0.0.1:1");

        assert!(!validator.validate_now("short").await);
        let state = validator.state().await;
        assert_eq!(state.status, ValidationStatus::Invalid);
        assert_eq!(state.message, "API key too short");
    }

    #[tokio::test]
    async fn wrong_prefix_is_rejected_without_network() {
        let validator = ApiKeyValidator::new().with_base_url("http://127.0.0.1:1");

        assert!(!validator.validate_now("BXza0123456789").await);
        let state = validator.state().await;
        assert_eq!(state.status, ValidationStatus::Invalid);
        assert!(state.message.contains("AIza"));
    }

    #[tokio::test]
    async fn edit_resets_status_to_unset() {
        let validator = ApiKeyValidator::new().with_base_url("http://127.0.0.1:1");
        validator.validate_now("short").await;
        assert_eq!(validator.state().await.status, ValidationStatus::Invalid);

        validator.update_key("AIza-something-new").await;
        assert_eq!(validator.state().await.status, ValidationStatus::Unset);
    }

    #[tokio::test]
    async fn clearing_the_key_cancels_pending_validation() {
        let validator = ApiKeyValidator::new()
            .with_base_url("http://127.0.0.1:1")
            .with_debounce(Duration::from_millis(20));

        validator.update_key("AIza0123456789").await;
        validator.update_key("").await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(validator.state().await.status, ValidationStatus::Unset);
    }

    #[test]
    fn format_check_accepts_plausible_keys() {
        assert!(ApiKeyValidator::check_format("AIza0123456789").is_ok());
        assert!(ApiKeyValidator::check_format("AIza01").is_err());
        assert!(ApiKeyValidator::check_format("0123456789abc").is_err());
    }
}
