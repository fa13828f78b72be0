//! Gemini `generateContent` wire types.
//!
//! The request body is `contents[].parts[].text`; structured stages add a
//! `generationConfig` with a JSON response schema. Every response arrives in
//! the candidates envelope:
//!
//! ```json
//! {"candidates": [{"content": {"parts": [{"text": "..."}]}}]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GenerationError, Result};

/// Request body for a `generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A message: an array of content parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// One content part. Only text parts are used by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// Generation config constraining the response to schema-shaped JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    #[serde(rename = "responseSchema")]
    pub response_schema: Value,
}

impl GenerateContentRequest {
    /// Free-text request (speaker notes, liveness probe).
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
            generation_config: None,
        }
    }

    /// Schema-constrained request (plan and content stages).
    pub fn structured(prompt: impl Into<String>, response_schema: Value) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            }),
        }
    }
}

/// Response envelope for all stages.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Extract the text payload, validating the envelope shape.
    pub fn text(&self) -> Result<&str> {
        let content = self
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .ok_or_else(|| {
                GenerationError::ResponseFormat("response has no candidate content".to_string())
            })?;

        content
            .parts
            .first()
            .map(|part| part.text.as_str())
            .ok_or_else(|| {
                GenerationError::ResponseFormat("candidate content has no parts".to_string())
            })
    }
}
