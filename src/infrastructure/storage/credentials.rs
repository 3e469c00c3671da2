//! Credential store: the single read/write path for the bearer token slot

use std::sync::Arc;

use crate::application::errors::StorageError;
use crate::domain::entities::Credential;
use crate::domain::traits::Store;

pub const DEFAULT_CREDENTIAL_KEY: &str = "token";

/// Bearer token slot backed by a durable [`Store`].
///
/// Presence is always checked against storage, never against a cached copy.
/// No expiry is tracked; an expired token is only discovered when the
/// server rejects it.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn Store>,
    key: String,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn Store>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Current credential. Storage failures read as "absent".
    pub async fn get(&self) -> Option<Credential> {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => Credential::from_raw(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read credential slot: {}", e);
                None
            }
        }
    }

    pub async fn is_present(&self) -> bool {
        self.get().await.is_some()
    }

    /// Persist a token, normalized to the `Bearer ` form
    pub async fn set(&self, raw: &str) -> Result<Credential, StorageError> {
        let credential = Credential::from_raw(raw)
            .ok_or_else(|| StorageError::Serialization("empty token".to_string()))?;
        self.store.set(&self.key, credential.header_value()).await?;
        Ok(credential)
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.delete(&self.key).await
    }
}
