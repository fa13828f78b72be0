//! HTTP client for the Gemini `generateContent` endpoint.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GenerationError, Result};
use crate::protocol::{GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API client. Model selection is fixed per instance; the API key is
/// passed as a query credential on every call.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set a custom base URL (e.g., for proxies or tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Send a `generateContent` request and return the parsed envelope.
    ///
    /// Non-success statuses classify per the error taxonomy; a body that
    /// does not parse as the envelope is a `ResponseFormat` error.
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.generate_url())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!("generateContent failed: HTTP {status}");
            return Err(GenerationError::from_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|err| GenerationError::ResponseFormat(err.to_string()))
    }

    /// Free-text generation: returns the raw text payload (speaker notes).
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let response = self.generate(&GenerateContentRequest::text(prompt)).await?;
        Ok(response.text()?.to_string())
    }

    /// Schema-constrained generation: parses the text payload as `T`.
    ///
    /// A payload that does not match the requested structure is rejected as
    /// a `ResponseFormat` error rather than trusted.
    pub async fn generate_structured<T: DeserializeOwned>(
        &self,
        prompt: &str,
        response_schema: Value,
    ) -> Result<T> {
        let request = GenerateContentRequest::structured(prompt, response_schema);
        let response = self.generate(&request).await?;
        let payload = response.text()?;
        serde_json::from_str(payload)
            .map_err(|err| GenerationError::ResponseFormat(err.to_string()))
    }

    /// Minimal liveness probe used by key validation.
    pub async fn probe(&self) -> Result<()> {
        self.generate(&GenerateContentRequest::text("Test")).await?;
        Ok(())
    }
}
