//! User operations: registration, login/logout, profile and favorites

use std::sync::Arc;

use crate::application::errors::ApiError;
use crate::application::session::Session;
use crate::domain::entities::{
    Favorite, LoginRequest, ProfileUpdate, RegisterRequest, Review, SessionIdentity, UserProfile,
    ROLE_PREFIX,
};
use crate::domain::traits::ApiRequest;
use crate::infrastructure::gateway::interceptors::LOGIN_PATH;

use super::support::ServiceDeps;

pub struct UserService {
    deps: ServiceDeps,
}

impl UserService {
    pub fn new(deps: ServiceDeps) -> Self {
        Self { deps }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.deps.session
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<(), ApiError> {
        let body = serde_json::to_value(&request).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.deps
            .gateway
            .execute(ApiRequest::post("/users/register").json(body))
            .await?
            .unit()?;
        tracing::info!("Registered user {}", request.username);
        self.deps.notifier.success("Registration successful, please log in");
        Ok(())
    }

    /// Exchange credentials for a token and adopt it. Any failure leaves
    /// the session anonymous.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionIdentity, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let result = async {
            let body = serde_json::to_value(&request).map_err(|e| ApiError::Decode(e.to_string()))?;
            let token = self
                .deps
                .gateway
                .execute(ApiRequest::post("/users/login").json(body))
                .await?
                .text()?;
            self.deps.session.install(&token).await
        }
        .await;

        match result {
            Ok(identity) => {
                tracing::info!("Logged in as {}", identity);
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!("Login failed for {}: {}", username, e);
                self.deps.session.clear_user().await;
                Err(e)
            }
        }
    }

    pub async fn logout(&self) {
        self.deps.session.clear_user().await;
        self.deps.notifier.success("Logged out");
    }

    /// `GET /users/me`, cached as the session profile
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        let profile: UserProfile = self
            .deps
            .gateway
            .execute(ApiRequest::get("/users/me"))
            .await?
            .json()?;
        self.deps.session.set_profile(Some(profile.clone()));
        Ok(profile)
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ApiError> {
        let body = serde_json::to_value(&update).map_err(|e| ApiError::Decode(e.to_string()))?;
        let profile: UserProfile = self
            .deps
            .gateway
            .execute(ApiRequest::put("/users/me").json(body))
            .await?
            .json()?;
        self.deps.session.set_profile(Some(profile.clone()));
        self.deps.notifier.success("Profile updated");
        Ok(profile)
    }

    /// Full login check used before user-only views: a stored credential, an
    /// identity (decoded or re-fetched) and a role. Failing any of them
    /// warns and redirects to the login view.
    pub async fn check_login(&self) -> bool {
        let session = &self.deps.session;
        if !session.credentials().is_present().await {
            self.send_to_login("Please log in first");
            return false;
        }

        let role = match session.identity() {
            Some(identity) => Some(identity.role),
            None => match self.current_user().await {
                Ok(profile) => profile.roles,
                Err(e) => {
                    tracing::warn!("Could not re-fetch current user: {}", e);
                    session.clear_user().await;
                    self.send_to_login("Please log in again");
                    return false;
                }
            },
        };

        match role {
            Some(role) if role.as_str() != ROLE_PREFIX => true,
            _ => {
                session.clear_user().await;
                self.send_to_login("Please log in again");
                false
            }
        }
    }

    fn send_to_login(&self, warning: &str) {
        self.deps.notifier.warning(warning);
        self.deps.navigator.push(LOGIN_PATH);
    }

    /// Refresh the favorites cache. A degraded response keeps what is
    /// already cached.
    pub async fn fetch_favorites(&self) -> Result<Vec<Favorite>, ApiError> {
        let session = &self.deps.session;
        if !session.credentials().is_present().await {
            session.set_favorites(Vec::new());
            return Ok(Vec::new());
        }
        session.initialize().await;
        let Some(identity) = session.identity() else {
            session.set_favorites(Vec::new());
            return Ok(Vec::new());
        };

        let request = ApiRequest::get(format!("/users/{}/favorites", identity.id));
        match self.deps.gateway.execute(request).await {
            Ok(response) if response.is_degraded() => {
                tracing::warn!("Favorites degraded, keeping {} cached", session.favorites().len());
                Ok(session.favorites())
            }
            Ok(response) => {
                let favorites: Vec<Favorite> = response.list()?;
                session.set_favorites(favorites.clone());
                Ok(favorites)
            }
            Err(e) => {
                session.set_favorites(Vec::new());
                Err(e)
            }
        }
    }

    pub async fn add_favorite(&self, restaurant_id: i64) -> Result<(), ApiError> {
        self.deps
            .gateway
            .execute(ApiRequest::post(format!("/restaurants/{}/favorite", restaurant_id)))
            .await?
            .unit()?;
        self.deps.session.cache_favorite(Favorite::from_id(restaurant_id));
        Ok(())
    }

    pub async fn remove_favorite(&self, restaurant_id: i64) -> Result<(), ApiError> {
        self.deps
            .gateway
            .execute(ApiRequest::delete(format!("/restaurants/{}/favorite", restaurant_id)))
            .await?
            .unit()?;
        self.deps.session.uncache_favorite(restaurant_id);
        Ok(())
    }

    /// Membership in the cached favorites set
    pub fn is_favorite(&self, restaurant_id: i64) -> bool {
        self.deps.session.is_favorite(restaurant_id)
    }

    /// Reviews written by the logged-in user
    pub async fn user_reviews(&self) -> Result<Vec<Review>, ApiError> {
        let identity = self.deps.session.identity().ok_or(ApiError::AuthRequired)?;
        self.deps
            .gateway
            .execute(ApiRequest::get(format!("/users/{}/reviews", identity.id)))
            .await?
            .list()
    }
}

#[cfg(test)]
mod tests;
