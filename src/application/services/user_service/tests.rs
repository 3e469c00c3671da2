use super::*;
use crate::application::services::testing::{restaurant_json, Harness};
use crate::application::session::token::encode_for_test;
use crate::application::session::SessionPhase;
use crate::domain::entities::PageQuery;
use crate::domain::traits::{Method, Navigator, NoticeLevel};

#[tokio::test]
async fn test_login_then_logout() {
    let harness = Harness::anonymous().await;
    harness.respond(Method::Post, "/users/login", 200, &encode_for_test(42, "amy", "ADMIN"));
    let users = &harness.ctx.users;

    let identity = users.login("amy", "secret").await.unwrap();
    assert_eq!(identity.id, 42);
    assert_eq!(identity.role.as_str(), "ROLE_ADMIN");

    let login = harness.transport.last_request().unwrap();
    assert!(login.header("Authorization").is_none());

    let session = users.session();
    assert!(session.is_logged_in().await);
    assert!(session.is_admin());
    assert!(session.has_role("ADMIN"));
    assert!(harness.stored_token().await.unwrap().starts_with("Bearer "));

    session.cache_favorite(Favorite::from_id(3));
    users.logout().await;

    assert!(!session.is_logged_in().await);
    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert!(session.favorites().is_empty());
    assert_eq!(harness.stored_token().await, None);
    assert_eq!(harness.notices().last().unwrap().message, "Logged out");
}

#[tokio::test]
async fn test_login_rejected_leaves_session_anonymous() {
    let harness = Harness::anonymous().await;
    harness.respond(Method::Post, "/users/login", 401, r#"{"message": "Bad credentials"}"#);

    let err = harness.ctx.users.login("amy", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(_)));
    assert!(!harness.ctx.session.is_logged_in().await);
    assert_eq!(harness.stored_token().await, None);
    // Login is not a protected call, so nobody gets redirected
    assert_eq!(harness.ctx.navigator.current_path(), "/");
}

#[tokio::test]
async fn test_login_with_undecodable_token_fails() {
    let harness = Harness::anonymous().await;
    harness.respond(Method::Post, "/users/login", 200, "not-a-jwt");

    assert!(matches!(
        harness.ctx.users.login("amy", "secret").await,
        Err(ApiError::Decode(_))
    ));
    assert_eq!(harness.stored_token().await, None);
}

#[tokio::test]
async fn test_rejected_credential_on_protected_call_ends_session() {
    let harness = Harness::logged_in().await;
    harness.ctx.navigator.push("/profile");
    harness.respond(Method::Get, "/users/me", 401, "");

    assert!(matches!(harness.ctx.users.current_user().await, Err(ApiError::Auth(_))));
    assert!(!harness.ctx.session.is_logged_in().await);
    assert_eq!(harness.stored_token().await, None);
    assert_eq!(harness.ctx.navigator.current_path(), "/login");
}

#[tokio::test]
async fn test_fetch_favorites_replaces_cache() {
    let harness = Harness::logged_in().await;
    harness.respond(
        Method::Get,
        "/users/1/favorites",
        200,
        &format!("[{}, {}]", restaurant_json(3, "Pho 99", true), restaurant_json(4, "Curry Club", true)),
    );

    let favorites = harness.ctx.users.fetch_favorites().await.unwrap();
    assert_eq!(favorites.len(), 2);
    assert!(harness.ctx.users.is_favorite(4));
    assert!(!harness.ctx.users.is_favorite(5));
}

#[tokio::test]
async fn test_fetch_favorites_keeps_cache_when_degraded() {
    let harness = Harness::logged_in().await;
    harness.ctx.session.cache_favorite(Favorite::from_id(3));
    harness.respond(Method::Get, "/users/1/favorites", 500, "");

    let favorites = harness.ctx.users.fetch_favorites().await.unwrap();
    assert_eq!(favorites, vec![Favorite::from_id(3)]);
    assert!(harness.ctx.users.is_favorite(3));
}

#[tokio::test]
async fn test_fetch_favorites_anonymous_is_empty() {
    let harness = Harness::anonymous().await;
    assert!(harness.ctx.users.fetch_favorites().await.unwrap().is_empty());
    assert_eq!(harness.transport.request_count(), 0);
}

#[tokio::test]
async fn test_add_and_remove_favorite_keep_cache_in_sync() {
    let harness = Harness::logged_in().await;
    harness.respond(Method::Post, "/restaurants/8/favorite", 200, "");
    harness.respond(Method::Delete, "/restaurants/8/favorite", 200, "");
    let users = &harness.ctx.users;

    users.add_favorite(8).await.unwrap();
    users.add_favorite(8).await.unwrap();
    assert_eq!(harness.ctx.session.favorites().len(), 1);

    users.remove_favorite(8).await.unwrap();
    assert!(!users.is_favorite(8));
}

#[tokio::test]
async fn test_check_login() {
    let anonymous = Harness::anonymous().await;
    assert!(!anonymous.ctx.users.check_login().await);
    assert_eq!(anonymous.ctx.navigator.current_path(), "/login");
    assert_eq!(anonymous.notices()[0].level, NoticeLevel::Warning);

    let harness = Harness::logged_in().await;
    assert!(harness.ctx.users.check_login().await);
    assert_eq!(harness.transport.request_count(), 0);
}

#[tokio::test]
async fn test_user_reviews_requires_identity() {
    let harness = Harness::anonymous().await;
    assert!(matches!(
        harness.ctx.users.user_reviews().await,
        Err(ApiError::AuthRequired)
    ));

    let harness = Harness::logged_in().await;
    harness.respond(Method::Get, "/users/1/reviews", 200, "[]");
    assert!(harness.ctx.users.user_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_favorites_survive_restaurant_toggle() {
    let harness = Harness::logged_in().await;
    harness.respond(
        Method::Get,
        "/restaurants",
        200,
        &format!(r#"{{"content": [{}], "totalElements": 1, "number": 0, "size": 10}}"#, restaurant_json(5, "Dumpling House", false)),
    );
    harness.respond(Method::Post, "/restaurants/5/favorite", 200, "");

    harness
        .ctx
        .restaurants
        .fetch_restaurants(PageQuery::default())
        .await
        .unwrap();
    harness.ctx.restaurants.toggle_favorite(5).await.unwrap();
    assert!(harness.ctx.users.is_favorite(5));
}
