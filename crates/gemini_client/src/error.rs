use thiserror::Error;

/// Error taxonomy for the generation pipeline.
///
/// HTTP statuses classify into `Permission` (403), `RateLimit` (429) or the
/// status-coded `Api` variant; transport failures become `Network`; envelope
/// or payload mismatches become `ResponseFormat`. `Unknown` is the fallback
/// and carries the raw message.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("invalid API key format: {0}")]
    Format(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    ResponseFormat(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Unknown(String),
}

impl GenerationError {
    /// Map the error to the single human-readable message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Format(_) => {
                "Invalid API key format. Check your Gemini API key.".to_string()
            }
            Self::Permission(_) => {
                "Invalid API key or quota exceeded. Check your Gemini API key.".to_string()
            }
            Self::RateLimit(_) => {
                "Too many requests. Wait a few minutes before trying again.".to_string()
            }
            Self::Network(_) => {
                "Network connection problem. Check your internet connection.".to_string()
            }
            Self::ResponseFormat(_) => {
                "Malformed API response. Try again with a simpler prompt.".to_string()
            }
            Self::Api { status, message } => {
                format!("Unexpected error: HTTP {status} - {message}")
            }
            Self::Unknown(message) => format!("Unexpected error: {message}"),
        }
    }

    /// Classify a non-success HTTP status with its response body.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            403 => Self::Permission(body),
            429 => Self::RateLimit(body),
            _ => Self::Api {
                status,
                message: body,
            },
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            GenerationError::from_status(403, String::new()),
            GenerationError::Permission(_)
        ));
        assert!(matches!(
            GenerationError::from_status(429, String::new()),
            GenerationError::RateLimit(_)
        ));
        assert!(matches!(
            GenerationError::from_status(500, String::new()),
            GenerationError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn user_messages_are_stable_per_category() {
        let rate = GenerationError::from_status(429, "slow down".to_string());
        assert!(rate.user_message().contains("Too many requests"));

        let unknown = GenerationError::Unknown("boom".to_string());
        assert_eq!(unknown.user_message(), "Unexpected error: boom");
    }
}
