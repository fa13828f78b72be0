//! Persisted artifacts: saved presentations, drafts and store settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slide::Slide;

/// Marker written in place of a credential wherever drafts are persisted or
/// exported.
pub const REDACTED_CREDENTIAL: &str = "***masked***";

/// A persisted, timestamped generation result.
///
/// Owned exclusively by the persistence store; created only after the
/// content stage completes, so a presentation is never partially stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPresentation {
    /// Opaque time-derived identifier, unique within the stored list.
    pub id: String,
    pub title: String,
    /// The original user prompt the deck was generated from.
    pub prompt: String,
    pub slides: Vec<Slide>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A saved prompt draft. The credential field only ever holds the redaction
/// marker or an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store-level settings, persisted independently of the generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    pub theme: String,
    pub auto_save: bool,
    pub max_history: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            auto_save: true,
            max_history: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_presentation_round_trips() {
        let now = Utc::now();
        let stored = StoredPresentation {
            id: "1700000000000".to_string(),
            title: "History of coffee".to_string(),
            prompt: "History of coffee".to_string(),
            slides: vec![Slide::new("Origins", "* Ethiopia")],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&stored).unwrap();
        let back: StoredPresentation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stored);
        assert!(json.contains("createdAt"));
    }

    #[test]
    fn store_settings_defaults() {
        let settings = StoreSettings::default();
        assert_eq!(settings.theme, "default");
        assert!(settings.auto_save);
        assert_eq!(settings.max_history, 10);
    }
}
