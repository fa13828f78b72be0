//! The local persistence store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use deck_core::{Draft, Slide, StoreSettings, StoredPresentation};

use crate::backend::{
    StorageBackend, KEY_CREDENTIAL, KEY_DRAFTS, KEY_PRESENTATIONS, KEY_SETTINGS,
};
use crate::error::Result;

/// Upper bound on retained drafts.
pub const MAX_DRAFTS: usize = 5;

/// Input for `save_presentation`: the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewPresentation {
    pub title: String,
    pub prompt: String,
    pub slides: Vec<Slide>,
}

/// Partial settings update; unset fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<String>,
    pub auto_save: Option<bool>,
    pub max_history: Option<usize>,
}

/// Bulk export payload. The credential never leaves the store and draft
/// secrets are stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub presentations: Vec<StoredPresentation>,
    pub drafts: Vec<Draft>,
    pub settings: StoreSettings,
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    presentations: Vec<StoredPresentation>,
    drafts: Vec<Draft>,
    settings: StoreSettings,
}

/// Durable store for presentations, drafts, settings and the encoded
/// credential.
///
/// All state lives behind one lock; every mutation persists through the
/// backend before the lock is released, so concurrent writers cannot lose
/// the truncation step.
pub struct LocalStore<B: StorageBackend> {
    backend: Arc<B>,
    state: Arc<RwLock<StoreState>>,
}

impl<B: StorageBackend> LocalStore<B> {
    /// Open the store, loading any persisted state. Undecodable entries are
    /// logged and replaced by defaults (the store fails open).
    pub async fn open(backend: B) -> Result<Self> {
        let backend = Arc::new(backend);
        let mut state = StoreState::default();

        state.presentations = load_list(&*backend, KEY_PRESENTATIONS).await;
        state.drafts = load_list(&*backend, KEY_DRAFTS).await;
        if let Ok(Some(raw)) = backend.read(KEY_SETTINGS).await {
            match serde_json::from_str(&raw) {
                Ok(settings) => state.settings = settings,
                Err(err) => log::error!("failed to decode stored settings: {err}"),
            }
        }

        Ok(Self {
            backend,
            state: Arc::new(RwLock::new(state)),
        })
    }

    // ========== Presentations ==========

    /// Persist a finished presentation. Assigns a fresh time-derived id and
    /// equal creation/update timestamps, prepends it to the list, truncates
    /// to the configured history bound and returns the new id.
    pub async fn save_presentation(&self, new: NewPresentation) -> Result<String> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let id = fresh_id(now, |candidate| {
            state.presentations.iter().any(|p| p.id == candidate)
        });

        let stored = StoredPresentation {
            id: id.clone(),
            title: new.title,
            prompt: new.prompt,
            slides: new.slides,
            created_at: now,
            updated_at: now,
        };

        state.presentations.insert(0, stored);
        let max_history = state.settings.max_history;
        state.presentations.truncate(max_history);
        self.persist_list(KEY_PRESENTATIONS, &state.presentations).await?;
        Ok(id)
    }

    /// Remove a stored presentation. Absent ids are a no-op, not an error.
    pub async fn delete_presentation(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.presentations.len();
        state.presentations.retain(|p| p.id != id);
        if state.presentations.len() != before {
            self.persist_list(KEY_PRESENTATIONS, &state.presentations).await?;
        }
        Ok(())
    }

    /// Look up a stored presentation. Read-only.
    pub async fn load_presentation(&self, id: &str) -> Option<StoredPresentation> {
        self.state
            .read()
            .await
            .presentations
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// The stored list, most recent first.
    pub async fn presentations(&self) -> Vec<StoredPresentation> {
        self.state.read().await.presentations.clone()
    }

    // ========== Drafts ==========

    /// Save a prompt draft, bounded to `MAX_DRAFTS` entries. The credential
    /// is never stored: only the redaction marker records that one existed.
    pub async fn save_draft(
        &self,
        id: Option<String>,
        prompt: &str,
        had_credential: bool,
    ) -> Result<String> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let id = id.unwrap_or_else(|| {
            fresh_id(now, |candidate| state.drafts.iter().any(|d| d.id == candidate))
        });

        let created_at = state
            .drafts
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.created_at)
            .unwrap_or(now);

        let draft = Draft {
            id: id.clone(),
            prompt: prompt.to_string(),
            api_key: if had_credential {
                deck_core::stored::REDACTED_CREDENTIAL.to_string()
            } else {
                String::new()
            },
            created_at,
            updated_at: now,
        };

        state.drafts.retain(|d| d.id != id);
        state.drafts.insert(0, draft);
        state.drafts.truncate(MAX_DRAFTS);
        self.persist_list(KEY_DRAFTS, &state.drafts).await?;
        Ok(id)
    }

    pub async fn delete_draft(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.drafts.len();
        state.drafts.retain(|d| d.id != id);
        if state.drafts.len() != before {
            self.persist_list(KEY_DRAFTS, &state.drafts).await?;
        }
        Ok(())
    }

    pub async fn drafts(&self) -> Vec<Draft> {
        self.state.read().await.drafts.clone()
    }

    // ========== Credential ==========

    /// Persist the credential reversibly encoded. This is encoding, not
    /// encryption; failures are logged and swallowed.
    pub async fn save_credential(&self, value: &str) {
        let encoded = hex::encode(value.as_bytes());
        if let Err(err) = self.backend.write(KEY_CREDENTIAL, &encoded).await {
            log::error!("failed to save credential: {err}");
        }
    }

    /// Load the stored credential. Returns an empty string when nothing is
    /// stored or the stored value does not decode (fails open).
    pub async fn load_credential(&self) -> String {
        let encoded = match self.backend.read(KEY_CREDENTIAL).await {
            Ok(Some(encoded)) => encoded,
            Ok(None) => return String::new(),
            Err(err) => {
                log::error!("failed to read credential: {err}");
                return String::new();
            }
        };

        hex::decode(encoded.trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_default()
    }

    // ========== Settings ==========

    /// Shallow-merge a settings patch and persist the result.
    pub async fn save_settings(&self, patch: SettingsPatch) -> Result<StoreSettings> {
        let mut state = self.state.write().await;
        if let Some(theme) = patch.theme {
            state.settings.theme = theme;
        }
        if let Some(auto_save) = patch.auto_save {
            state.settings.auto_save = auto_save;
        }
        if let Some(max_history) = patch.max_history {
            state.settings.max_history = max_history;
        }

        let raw = serde_json::to_string(&state.settings)?;
        self.backend.write(KEY_SETTINGS, &raw).await?;
        Ok(state.settings.clone())
    }

    pub async fn settings(&self) -> StoreSettings {
        self.state.read().await.settings.clone()
    }

    // ========== Bulk operations ==========

    /// Export presentations, drafts and settings. Draft credential markers
    /// are stripped and the stored credential is never included.
    pub async fn export_all(&self) -> ExportData {
        let state = self.state.read().await;
        let drafts = state
            .drafts
            .iter()
            .cloned()
            .map(|mut d| {
                d.api_key = String::new();
                d
            })
            .collect();

        ExportData {
            presentations: state.presentations.clone(),
            drafts,
            settings: state.settings.clone(),
            exported_at: Utc::now(),
        }
    }

    /// Import a bulk payload. Each top-level key is validated independently
    /// and applied only when present; a payload that fails to decode leaves
    /// the store untouched and returns false.
    pub async fn import_all(&self, raw: &str) -> bool {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ImportData {
            presentations: Option<Vec<StoredPresentation>>,
            drafts: Option<Vec<Draft>>,
            settings: Option<StoreSettings>,
        }

        let data: ImportData = match serde_json::from_str(raw) {
            Ok(data) => data,
            Err(err) => {
                log::error!("import failed to decode: {err}");
                return false;
            }
        };

        let mut state = self.state.write().await;
        if let Some(presentations) = data.presentations {
            state.presentations = presentations;
            if self
                .persist_list(KEY_PRESENTATIONS, &state.presentations)
                .await
                .is_err()
            {
                return false;
            }
        }
        if let Some(mut drafts) = data.drafts {
            for draft in &mut drafts {
                draft.api_key = String::new();
            }
            state.drafts = drafts;
            if self.persist_list(KEY_DRAFTS, &state.drafts).await.is_err() {
                return false;
            }
        }
        if let Some(settings) = data.settings {
            state.settings = settings;
            let raw = match serde_json::to_string(&state.settings) {
                Ok(raw) => raw,
                Err(_) => return false,
            };
            if self.backend.write(KEY_SETTINGS, &raw).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Wipe every key and reset in-memory state to defaults.
    pub async fn clear_all(&self) -> Result<()> {
        let mut state = self.state.write().await;
        for key in [KEY_CREDENTIAL, KEY_PRESENTATIONS, KEY_DRAFTS, KEY_SETTINGS] {
            self.backend.remove(key).await?;
        }
        *state = StoreState::default();
        Ok(())
    }

    async fn persist_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<()> {
        let raw = serde_json::to_string(list)?;
        self.backend.write(key, &raw).await?;
        Ok(())
    }
}

async fn load_list<T, B>(backend: &B, key: &str) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
    B: StorageBackend,
{
    match backend.read(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(err) => {
                log::error!("failed to decode stored {key}: {err}");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(err) => {
            log::error!("failed to read stored {key}: {err}");
            Vec::new()
        }
    }
}

/// Millisecond-timestamp id, de-collided against the ids already in use.
fn fresh_id<F: Fn(&str) -> bool>(now: DateTime<Utc>, taken: F) -> String {
    let base = now.timestamp_millis().to_string();
    if !taken(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use deck_core::stored::REDACTED_CREDENTIAL;

    fn sample(title: &str) -> NewPresentation {
        NewPresentation {
            title: title.to_string(),
            prompt: format!("prompt for {title}"),
            slides: vec![Slide::new("Intro", "* hello")],
        }
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        let id = store.save_presentation(sample("Coffee")).await.unwrap();

        let loaded = store.load_presentation(&id).await.unwrap();
        assert_eq!(loaded.title, "Coffee");
        assert_eq!(loaded.created_at, loaded.updated_at);
    }

    #[tokio::test]
    async fn test_history_is_bounded_most_recent_first() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        store
            .save_settings(SettingsPatch {
                max_history: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();

        for i in 0..5 {
            store.save_presentation(sample(&format!("deck {i}"))).await.unwrap();
        }

        let list = store.presentations().await;
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].title, "deck 4");
        assert_eq!(list[1].title, "deck 3");
        assert_eq!(list[2].title, "deck 2");
    }

    #[tokio::test]
    async fn test_ids_are_unique_under_rapid_saves() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(store.save_presentation(sample(&format!("d{i}"))).await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn test_delete_absent_id_is_a_noop() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        store.save_presentation(sample("Keep")).await.unwrap();
        store.delete_presentation("no-such-id").await.unwrap();
        assert_eq!(store.presentations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        let id = store.save_presentation(sample("Gone")).await.unwrap();
        store.delete_presentation(&id).await.unwrap();
        assert!(store.load_presentation(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_credential_round_trip_and_fail_open() {
        let backend = MemoryBackend::new();
        backend.write(KEY_CREDENTIAL, "not-hex!").await.unwrap();

        let store = LocalStore::open(backend).await.unwrap();
        assert_eq!(store.load_credential().await, "");

        store.save_credential("AIza0123456789").await;
        assert_eq!(store.load_credential().await, "AIza0123456789");
    }

    #[tokio::test]
    async fn test_stored_credential_is_not_plaintext() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        store.save_credential("AIza0123456789").await;

        let raw = store.backend.read(KEY_CREDENTIAL).await.unwrap().unwrap();
        assert_ne!(raw, "AIza0123456789");
    }

    #[tokio::test]
    async fn test_drafts_bounded_and_redacted() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        for i in 0..7 {
            store
                .save_draft(None, &format!("draft {i}"), true)
                .await
                .unwrap();
        }

        let drafts = store.drafts().await;
        assert_eq!(drafts.len(), MAX_DRAFTS);
        assert_eq!(drafts[0].prompt, "draft 6");
        assert!(drafts.iter().all(|d| d.api_key == REDACTED_CREDENTIAL));
    }

    #[tokio::test]
    async fn test_settings_shallow_merge() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        store
            .save_settings(SettingsPatch {
                auto_save: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();

        let settings = store.settings().await;
        assert!(!settings.auto_save);
        assert_eq!(settings.theme, "default");
        assert_eq!(settings.max_history, 10);
    }

    #[tokio::test]
    async fn test_export_excludes_secrets() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        store.save_credential("AIza0123456789").await;
        store.save_draft(None, "secret draft", true).await.unwrap();
        store.save_presentation(sample("Public")).await.unwrap();

        let export = store.export_all().await;
        let raw = serde_json::to_string(&export).unwrap();
        assert!(!raw.contains("AIza0123456789"));
        assert!(!raw.contains(REDACTED_CREDENTIAL));
        assert_eq!(export.presentations.len(), 1);
    }

    #[tokio::test]
    async fn test_import_partial_payload_applies_only_present_keys() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        store.save_presentation(sample("Untouched")).await.unwrap();

        let ok = store
            .import_all(r#"{"settings":{"theme":"dark","autoSave":false,"maxHistory":4}}"#)
            .await;
        assert!(ok);
        assert_eq!(store.settings().await.theme, "dark");
        assert_eq!(store.presentations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_import_garbage_returns_false_and_changes_nothing() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        store.save_presentation(sample("Safe")).await.unwrap();

        assert!(!store.import_all("not json").await);
        assert!(!store.import_all(r#"{"settings": 42}"#).await);
        assert_eq!(store.presentations().await.len(), 1);
        assert_eq!(store.settings().await.theme, "default");
    }

    #[tokio::test]
    async fn test_clear_all_resets_everything() {
        let store = LocalStore::open(MemoryBackend::new()).await.unwrap();
        store.save_credential("AIza0123456789").await;
        store.save_presentation(sample("Doomed")).await.unwrap();

        store.clear_all().await.unwrap();
        assert!(store.presentations().await.is_empty());
        assert_eq!(store.load_credential().await, "");
        assert_eq!(store.settings().await, StoreSettings::default());
    }
}
