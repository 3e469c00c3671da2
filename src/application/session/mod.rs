//! Session state machine
//!
//! `Unknown` until [`Session::initialize`] has looked at the credential
//! slot, then `Anonymous` or `Authenticated`. Identity only ever exists in
//! the `Authenticated` phase, so role checks cannot answer before
//! initialization has finished.

pub mod token;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;

use crate::application::errors::ApiError;
use crate::domain::entities::{Credential, Favorite, SessionIdentity, UserProfile};
use crate::infrastructure::storage::CredentialStore;

pub use token::TokenError;

/// Session phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Unknown,
    Anonymous,
    Authenticated(SessionIdentity),
}

impl SessionPhase {
    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            SessionPhase::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    profile: Option<UserProfile>,
    favorites: Vec<Favorite>,
}

/// Logged-in user state shared by the gateway, the stores and the guard
pub struct Session {
    credentials: CredentialStore,
    state: RwLock<SessionState>,
    /// Serializes phase transitions so concurrent initializers share one decode
    transition: Mutex<()>,
}

impl Session {
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            credentials,
            state: RwLock::new(SessionState::default()),
            transition: Mutex::new(()),
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolve `Unknown` from the stored credential. No-op once resolved.
    pub async fn initialize(&self) -> SessionPhase {
        let _transition = self.transition.lock().await;
        if self.is_initialized() {
            return self.phase();
        }

        let phase = match self.credentials.get().await {
            None => SessionPhase::Anonymous,
            Some(credential) => match token::decode(&credential) {
                Ok(identity) => {
                    tracing::info!("Restored session for {}", identity);
                    SessionPhase::Authenticated(identity)
                }
                Err(e) => {
                    tracing::warn!("Stored credential could not be decoded: {}", e);
                    if let Err(e) = self.credentials.clear().await {
                        tracing::warn!("Failed to clear bad credential: {}", e);
                    }
                    SessionPhase::Anonymous
                }
            },
        };

        self.write().phase = phase.clone();
        phase
    }

    pub fn is_initialized(&self) -> bool {
        self.read().phase != SessionPhase::Unknown
    }

    pub fn phase(&self) -> SessionPhase {
        self.read().phase.clone()
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        self.read().phase.identity().cloned()
    }

    /// Credential present in storage and decoded into an identity
    pub async fn is_logged_in(&self) -> bool {
        self.credentials.is_present().await && self.identity().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.read().phase.identity().is_some_and(SessionIdentity::is_admin)
    }

    /// Role check accepting `ADMIN` or `ROLE_ADMIN`
    pub fn has_role(&self, role: &str) -> bool {
        self.read()
            .phase
            .identity()
            .is_some_and(|identity| identity.role.matches(role))
    }

    /// Adopt a freshly issued token: decode, persist, authenticate
    pub async fn install(&self, raw_token: &str) -> Result<SessionIdentity, ApiError> {
        let _transition = self.transition.lock().await;

        let credential = Credential::from_raw(raw_token)
            .ok_or_else(|| ApiError::Decode("login returned an empty token".to_string()))?;
        let identity = token::decode(&credential).map_err(|e| ApiError::Decode(e.to_string()))?;

        self.credentials.set(credential.header_value()).await?;
        self.write().phase = SessionPhase::Authenticated(identity.clone());
        Ok(identity)
    }

    /// Drop identity, profile, favorites and the stored credential. Idempotent.
    pub async fn clear_user(&self) {
        let _transition = self.transition.lock().await;

        {
            let mut state = self.write();
            state.phase = SessionPhase::Anonymous;
            state.profile = None;
            state.favorites.clear();
        }
        if let Err(e) = self.credentials.clear().await {
            tracing::warn!("Failed to clear credential: {}", e);
        }
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    pub fn set_profile(&self, profile: Option<UserProfile>) {
        self.write().profile = profile;
    }

    pub fn favorites(&self) -> Vec<Favorite> {
        self.read().favorites.clone()
    }

    pub fn set_favorites(&self, favorites: Vec<Favorite>) {
        self.write().favorites = favorites;
    }

    /// Insert unless already cached
    pub fn cache_favorite(&self, favorite: Favorite) {
        let mut state = self.write();
        if !state.favorites.iter().any(|f| f.id == favorite.id) {
            state.favorites.push(favorite);
        }
    }

    pub fn uncache_favorite(&self, restaurant_id: i64) {
        self.write().favorites.retain(|f| f.id != restaurant_id);
    }

    pub fn is_favorite(&self, restaurant_id: i64) -> bool {
        self.read().favorites.iter().any(|f| f.id == restaurant_id)
    }
}
