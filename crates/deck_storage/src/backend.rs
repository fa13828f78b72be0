//! Storage backend trait and implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::Result;

/// Key under which the encoded credential is stored.
pub const KEY_CREDENTIAL: &str = "api_key";
/// Key under which the bounded presentation list is stored.
pub const KEY_PRESENTATIONS: &str = "presentations";
/// Key under which the bounded draft list is stored.
pub const KEY_DRAFTS: &str = "drafts";
/// Key under which the settings object is stored.
pub const KEY_SETTINGS: &str = "settings";

/// Key/value storage seam for the local store.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the value under `key`, or None when nothing is stored.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`.
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; absent keys are not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// File-based backend: one JSON file per key in a data directory.
#[derive(Clone)]
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path).await?))
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        fs::write(self.key_path(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }
}

/// In-memory backend for tests.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_backend_round_trip() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(backend.read("settings").await.unwrap().is_none());

        backend.write("settings", r#"{"theme":"default"}"#).await.unwrap();
        let value = backend.read("settings").await.unwrap().unwrap();
        assert_eq!(value, r#"{"theme":"default"}"#);

        backend.remove("settings").await.unwrap();
        assert!(backend.read("settings").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_backend_remove_absent_key_is_ok() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        backend.remove("nothing").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_backend_round_trip() {
        let backend = MemoryBackend::new();
        backend.write("api_key", "abc").await.unwrap();
        assert_eq!(backend.read("api_key").await.unwrap().unwrap(), "abc");
        backend.remove("api_key").await.unwrap();
        assert!(backend.read("api_key").await.unwrap().is_none());
    }
}
