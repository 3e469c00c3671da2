//! Pieces shared by the user, restaurant and review services

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::application::errors::ApiError;
use crate::application::session::Session;
use crate::domain::entities::{ImageUpload, SessionIdentity};
use crate::domain::traits::{MultipartForm, Navigator, Notifier};
use crate::infrastructure::config::StoreConfig;
use crate::infrastructure::gateway::interceptors::LOGIN_PATH;
use crate::infrastructure::gateway::Gateway;

/// Collaborators injected into every service
#[derive(Clone)]
pub struct ServiceDeps {
    pub gateway: Arc<Gateway>,
    pub session: Arc<Session>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub config: StoreConfig,
}

impl ServiceDeps {
    /// Guard for mutations: warn, send the user to the login view, and
    /// fail without touching the network when nobody is logged in
    pub async fn require_login(&self, warning: &str) -> Result<SessionIdentity, ApiError> {
        if self.session.is_logged_in().await {
            if let Some(identity) = self.session.identity() {
                return Ok(identity);
            }
        }
        self.notifier.warning(warning);
        self.navigator.push(LOGIN_PATH);
        Err(ApiError::AuthRequired)
    }

    /// Surface a failure unless the gateway already did
    pub fn report(&self, err: &ApiError, context: &str) {
        tracing::warn!("{}: {}", context, err);
        if !err.is_notified() {
            self.notifier.error(context);
        }
    }
}

/// Per-entity guard rejecting a second toggle while one is in flight
pub struct InFlight {
    enabled: bool,
    ids: Mutex<HashSet<i64>>,
}

impl InFlight {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ids: Mutex::new(HashSet::new()),
        }
    }

    pub fn acquire(&self, id: i64, what: &str) -> Result<InFlightGuard<'_>, ApiError> {
        if !self.enabled {
            return Ok(InFlightGuard { owner: self, id: None });
        }
        let mut ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        if !ids.insert(id) {
            return Err(ApiError::Busy(format!("{} {}", what, id)));
        }
        Ok(InFlightGuard {
            owner: self,
            id: Some(id),
        })
    }
}

pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    id: Option<i64>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            let mut ids = self.owner.ids.lock().unwrap_or_else(|e| e.into_inner());
            ids.remove(&id);
        }
    }
}

/// Multipart body with the entity serialized as a JSON text part
pub fn entity_form<T: serde::Serialize>(
    part: &str,
    fields: &T,
    image: Option<ImageUpload>,
) -> Result<MultipartForm, ApiError> {
    let json = serde_json::to_string(fields).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(MultipartForm::new().text(part, json).file("image", image))
}
