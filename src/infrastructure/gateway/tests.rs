use std::sync::Arc;

use super::mock::MockTransport;
use super::*;
use crate::application::session::token::encode_for_test;
use crate::application::session::Session;
use crate::domain::traits::{Navigator, NoticeLevel, Store};
use crate::infrastructure::adapters::{HistoryNavigator, NoticeQueue};
use crate::infrastructure::storage::{CredentialStore, MemoryStore};

struct Fixture {
    gateway: Gateway,
    transport: Arc<MockTransport>,
    session: Arc<Session>,
    notices: Arc<NoticeQueue>,
    navigator: Arc<HistoryNavigator>,
    store: Arc<MemoryStore>,
}

async fn fixture(logged_in: bool) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    if logged_in {
        store
            .set("token", &format!("Bearer {}", encode_for_test(1, "tester", "USER")))
            .await
            .unwrap();
    }
    let credentials = CredentialStore::new(store.clone(), "token");
    let session = Arc::new(Session::new(credentials.clone()));
    session.initialize().await;

    let notices = Arc::new(NoticeQueue::new());
    let navigator = Arc::new(HistoryNavigator::new("/restaurants/5"));
    let transport = Arc::new(MockTransport::new());

    let chain = InterceptorChain::new()
        .on_request(AuthInterceptor::new(credentials))
        .on_response(ResponseNormalizer::new(
            session.clone(),
            notices.clone(),
            navigator.clone(),
        ))
        .on_both(LoggingInterceptor);

    Fixture {
        gateway: Gateway::new(transport.clone(), chain),
        transport,
        session,
        notices,
        navigator,
        store,
    }
}

#[tokio::test]
async fn test_credential_attached_when_present() {
    let f = fixture(true).await;
    f.transport.respond(Method::Get, "/restaurants", 200, "{}");

    f.gateway.execute(ApiRequest::get("/restaurants")).await.unwrap();
    let sent = f.transport.last_request().unwrap();
    assert!(sent.header("Authorization").unwrap().starts_with("Bearer ey"));
}

#[tokio::test]
async fn test_public_call_never_carries_credential() {
    let f = fixture(true).await;
    f.transport.respond(Method::Post, "/users/login", 200, "token");

    f.gateway.execute(ApiRequest::post("/users/login")).await.unwrap();
    assert!(f.transport.last_request().unwrap().header("Authorization").is_none());
}

#[tokio::test]
async fn test_protected_call_without_credential_fails_locally() {
    let f = fixture(false).await;

    let err = f
        .gateway
        .execute(ApiRequest::post("/restaurants/5/favorite"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AuthRequired));
    assert_eq!(f.transport.request_count(), 0);
    assert!(f.notices.is_empty());
}

#[tokio::test]
async fn test_anonymous_read_goes_out_without_credential() {
    let f = fixture(false).await;
    f.transport.respond(Method::Get, "/restaurants/5", 200, "{}");

    f.gateway.execute(ApiRequest::get("/restaurants/5")).await.unwrap();
    assert!(f.transport.last_request().unwrap().header("Authorization").is_none());
}

#[tokio::test]
async fn test_degraded_reads_cover_every_failure() {
    let f = fixture(false).await;
    f.transport.respond(Method::Get, "/reviews/restaurant/5/page", 503, "");
    f.transport.fail(Method::Get, "/restaurants/popular");

    let page = f
        .gateway
        .execute(ApiRequest::get("/reviews/restaurant/5/page"))
        .await
        .unwrap();
    assert_eq!(page.degradation(), Some(Degradation::EmptyPage));
    assert!(page.page::<serde_json::Value>(10).unwrap().content.is_empty());

    let list = f
        .gateway
        .execute(ApiRequest::get("/restaurants/popular"))
        .await
        .unwrap();
    assert_eq!(list.degradation(), Some(Degradation::EmptyList));
    assert!(list.list::<serde_json::Value>().unwrap().is_empty());

    assert!(f.notices.is_empty());
}

#[tokio::test]
async fn test_bad_request_notifies_server_message() {
    let f = fixture(true).await;
    f.transport
        .respond(Method::Put, "/users/me", 400, r#"{"message": "Email already in use"}"#)
        .respond(Method::Post, "/users/register", 400, r#"{"error": "Bad Request"}"#)
        .respond(Method::Post, "/reviews/5", 400, "<html>");

    let err = f.gateway.execute(ApiRequest::put("/users/me")).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }));
    f.gateway.execute(ApiRequest::post("/users/register")).await.unwrap_err();
    f.gateway.execute(ApiRequest::post("/reviews/5")).await.unwrap_err();

    let messages: Vec<String> = f.notices.drain().into_iter().map(|n| n.message).collect();
    assert_eq!(
        messages,
        vec![
            "Email already in use",
            "Bad Request",
            "Invalid request, please check your input"
        ]
    );
}

#[tokio::test]
async fn test_unauthorized_on_protected_call_tears_down_session() {
    let f = fixture(true).await;
    f.transport.respond(Method::Get, "/users/me", 401, "");

    let err = f.gateway.execute(ApiRequest::get("/users/me")).await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(_)));
    assert!(!f.session.is_logged_in().await);
    assert_eq!(f.store.get("token").await.unwrap(), None);
    assert_eq!(f.navigator.current_path(), "/login");
}

#[tokio::test]
async fn test_unauthorized_on_unprotected_call_keeps_session() {
    let f = fixture(true).await;
    f.transport.respond(Method::Get, "/restaurants/5", 401, "");

    f.gateway.execute(ApiRequest::get("/restaurants/5")).await.unwrap_err();
    assert!(f.session.is_logged_in().await);
    assert_eq!(f.navigator.current_path(), "/restaurants/5");
}

#[tokio::test]
async fn test_unauthorized_while_on_login_view_does_not_redirect() {
    let f = fixture(true).await;
    f.navigator.push("/login");
    f.transport.respond(Method::Get, "/users/me", 401, "");

    f.gateway.execute(ApiRequest::get("/users/me")).await.unwrap_err();
    assert!(f.session.is_logged_in().await);
    assert_eq!(f.navigator.history().len(), 2);
}

#[tokio::test]
async fn test_forbidden_notifies_permission_denied() {
    let f = fixture(true).await;
    f.transport.respond(Method::Delete, "/restaurants/5", 403, "");

    let err = f
        .gateway
        .execute(ApiRequest::delete("/restaurants/5"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Permission));
    let notices = f.notices.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Permission denied");
}

#[tokio::test]
async fn test_server_errors() {
    let f = fixture(true).await;
    f.transport
        .respond(Method::Post, "/restaurants/5/favorite/check", 500, r#"{"error": "Access Denied"}"#)
        .respond(Method::Get, "/users/1/reviews", 500, r#"{"message": "NPE"}"#)
        .respond(Method::Post, "/restaurants", 500, r#"{"message": "disk full"}"#);

    let check = f
        .gateway
        .execute(ApiRequest::post("/restaurants/5/favorite/check"))
        .await
        .unwrap();
    assert_eq!(check.degradation(), Some(Degradation::False));
    assert!(!check.flag().unwrap());

    let list = f.gateway.execute(ApiRequest::get("/users/1/reviews")).await.unwrap();
    assert!(list.list::<serde_json::Value>().unwrap().is_empty());
    // A single-object decode of a masked failure still surfaces as a server error
    assert!(matches!(list.json::<serde_json::Value>(), Err(ApiError::Server(_))));

    let err = f.gateway.execute(ApiRequest::post("/restaurants")).await.unwrap_err();
    assert!(matches!(err, ApiError::Server(ref m) if m == "disk full"));

    assert!(f.notices.is_empty());
}

#[tokio::test]
async fn test_other_status_gets_generic_notice() {
    let f = fixture(true).await;
    f.transport.respond(Method::Get, "/restaurants/5", 404, r#"{"error": "Not Found"}"#);

    let err = f.gateway.execute(ApiRequest::get("/restaurants/5")).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.is_notified());
    assert_eq!(
        f.notices.drain()[0].message,
        "Operation failed, please try again later"
    );
}

#[tokio::test]
async fn test_network_failure_is_not_notified() {
    let f = fixture(true).await;
    f.transport.fail(Method::Get, "/restaurants/5");

    let err = f.gateway.execute(ApiRequest::get("/restaurants/5")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(f.notices.is_empty());
}

#[tokio::test]
async fn test_pending_requests_empty_once_settled() {
    let f = fixture(false).await;
    f.transport.respond(Method::Get, "/restaurants", 200, "{}");

    f.gateway.execute(ApiRequest::get("/restaurants")).await.unwrap();
    f.gateway
        .execute(ApiRequest::post("/restaurants/1/favorite"))
        .await
        .unwrap_err();
    assert!(f.gateway.pending_requests().is_empty());
}

#[test]
fn test_degraded_payload_shapes() {
    assert_eq!(ApiResponse::degraded(Degradation::EmptyList).body, "[]");
    assert_eq!(ApiResponse::degraded(Degradation::False).body, "false");
    assert!(ApiResponse::degraded(Degradation::False)
        .list::<serde_json::Value>()
        .is_err());
    assert!(!ApiResponse::new(200, "[]").is_degraded());
}
