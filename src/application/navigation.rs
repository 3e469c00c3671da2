//! Route table and the authentication guard in front of it

use std::fmt;
use std::sync::Arc;

use crate::application::session::{Session, SessionPhase};
use crate::domain::traits::Navigator;

/// Views the client can show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Restaurants,
    RestaurantCreate,
    RestaurantDetail(i64),
    /// Reachable as `/restaurants/{id}/edit` and `/restaurants/edit/{id}`
    RestaurantEdit(i64),
    Profile,
    User,
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["restaurants"] => Route::Restaurants,
            ["restaurants", "new"] => Route::RestaurantCreate,
            ["profile"] => Route::Profile,
            ["user"] => Route::User,
            ["restaurants", id] => match id.parse() {
                Ok(id) => Route::RestaurantDetail(id),
                Err(_) => Route::NotFound(path.to_string()),
            },
            ["restaurants", id, "edit"] | ["restaurants", "edit", id] => match id.parse() {
                Ok(id) => Route::RestaurantEdit(id),
                Err(_) => Route::NotFound(path.to_string()),
            },
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Restaurants => "/restaurants".to_string(),
            Route::RestaurantCreate => "/restaurants/new".to_string(),
            Route::RestaurantDetail(id) => format!("/restaurants/{}", id),
            Route::RestaurantEdit(id) => format!("/restaurants/{}/edit", id),
            Route::Profile => "/profile".to_string(),
            Route::User => "/user".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::RestaurantCreate | Route::RestaurantEdit(_) | Route::Profile | Route::User
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Pure decision over a resolved session
pub fn decide(route: &Route, logged_in: bool) -> GuardDecision {
    if route.requires_auth() && !logged_in {
        GuardDecision::Redirect(Route::Login)
    } else {
        GuardDecision::Allow
    }
}

pub struct NavigationGuard {
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
}

impl NavigationGuard {
    pub fn new(session: Arc<Session>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    /// Decide a transition, initializing the session first if needed
    pub async fn check(&self, route: &Route) -> GuardDecision {
        if self.session.phase() == SessionPhase::Unknown {
            self.session.initialize().await;
        }
        let decision = decide(route, self.session.is_logged_in().await);
        if let GuardDecision::Redirect(target) = &decision {
            tracing::debug!("Guard redirected {} to {}", route, target);
        }
        decision
    }

    /// Apply the guard and move the navigator; returns where it landed
    pub async fn navigate(&self, path: &str) -> Route {
        let route = Route::parse(path);
        let landed = match self.check(&route).await {
            GuardDecision::Allow => route,
            GuardDecision::Redirect(target) => target,
        };
        self.navigator.push(&landed.path());
        landed
    }
}
