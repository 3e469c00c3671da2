//! Key-value storage implementations

pub mod credentials;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::traits::Store;

pub use credentials::CredentialStore;

const STORAGE_FILE: &str = "storage.json";

/// JSON file-based store; every write is flushed to disk
pub struct JsonStore {
    base_path: PathBuf,
    kv: Arc<RwLock<HashMap<String, String>>>,
}

impl JsonStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            kv: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create the directory and load whatever a previous run left behind
    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let path = self.file_path();
        if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            let loaded: HashMap<String, String> = if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?
            };
            tracing::debug!("Loaded {} storage keys from {}", loaded.len(), path.display());
            *self.kv.write().await = loaded;
        }
        Ok(())
    }

    fn file_path(&self) -> PathBuf {
        self.base_path.join(STORAGE_FILE)
    }

    async fn persist(&self, kv: &HashMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(kv)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp = self.base_path.join(format!("{}.tmp", STORAGE_FILE));
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, self.file_path()).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let kv = self.kv.read().await;
        Ok(kv.get(key).cloned())
    }

    // Memory only changes once the file write went through
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut kv = self.kv.write().await;
        let mut next = kv.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next).await?;
        *kv = next;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut kv = self.kv.write().await;
        if !kv.contains_key(key) {
            return Ok(());
        }
        let mut next = kv.clone();
        next.remove(key);
        self.persist(&next).await?;
        *kv = next;
        Ok(())
    }
}

/// Process-lifetime store
#[derive(Default)]
pub struct MemoryStore {
    kv: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.kv.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.kv.write().await.remove(key);
        Ok(())
    }
}
