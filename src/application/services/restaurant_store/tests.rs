use super::*;
use crate::application::services::testing::{page_json, restaurant_json, Harness};
use crate::application::services::testing::review_json;
use crate::domain::traits::{Method, Navigator, NoticeLevel, RequestBody};

fn listing(harness: &Harness, favorite: bool) {
    let item: serde_json::Value = serde_json::from_str(&restaurant_json(5, "Dumpling House", favorite)).unwrap();
    harness.respond(Method::Get, "/restaurants", 200, &page_json(vec![item], 1, 0, 10));
}

#[tokio::test]
async fn test_fetch_converts_page_numbers_at_the_boundary() {
    let harness = Harness::anonymous().await;
    harness.respond(
        Method::Get,
        "/restaurants",
        200,
        r#"{"content": [], "totalElements": 31, "number": 2, "size": 10}"#,
    );
    let store = &harness.ctx.restaurants;

    store
        .update_filters(RestaurantFilters {
            keyword: Some("ramen".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let page = store.update_pagination(3, 10).await.unwrap();

    let request = harness.transport.last_request().unwrap();
    assert!(request.query.contains(&("page".to_string(), "2".to_string())));
    assert!(request.query.contains(&("keyword".to_string(), "ramen".to_string())));
    assert_eq!(page.external_page(), 3);

    let state = store.snapshot();
    assert_eq!(state.pagination.current_page, 3);
    assert_eq!(state.pagination.total, 31);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_popular_and_latest_degrade_to_empty() {
    let harness = Harness::anonymous().await;
    harness.respond(Method::Get, "/restaurants/popular", 500, r#"{"message": "boom"}"#);
    harness.respond(Method::Get, "/restaurants/latest", 404, "");
    let store = &harness.ctx.restaurants;

    assert!(store.fetch_popular().await.unwrap().is_empty());
    assert!(store.fetch_latest().await.unwrap().is_empty());

    let state = store.snapshot();
    assert!(state.error_popular.is_none() && state.error_latest.is_none());
    assert!(harness.notices().is_empty());
}

#[tokio::test]
async fn test_popular_degrades_when_unreachable() {
    let harness = Harness::anonymous().await;
    harness.transport.fail(Method::Get, "/restaurants/popular");

    assert!(harness.ctx.restaurants.fetch_popular().await.unwrap().is_empty());
    assert!(!harness.ctx.restaurants.snapshot().loading_popular);
    assert!(harness.notices().is_empty());
}

#[tokio::test]
async fn test_favorite_toggle_round_trip() {
    let harness = Harness::logged_in().await;
    listing(&harness, false);
    harness.respond(Method::Post, "/restaurants/5/favorite", 200, "");
    harness.respond(Method::Delete, "/restaurants/5/favorite", 200, "");
    let store = &harness.ctx.restaurants;
    store.fetch_restaurants(PageQuery::default()).await.unwrap();

    assert!(store.toggle_favorite(5).await.unwrap());
    assert!(store.snapshot().restaurants[0].is_favorite);
    assert!(harness.ctx.session.is_favorite(5));

    assert!(!store.toggle_favorite(5).await.unwrap());
    assert!(!store.snapshot().restaurants[0].is_favorite);
    assert!(!harness.ctx.session.is_favorite(5));

    let auth = harness.transport.last_request().unwrap();
    assert!(auth.header("Authorization").unwrap().starts_with("Bearer "));
}

#[tokio::test]
async fn test_failed_favorite_toggle_rolls_back_with_one_notice() {
    let harness = Harness::logged_in().await;
    listing(&harness, false);
    harness.respond(Method::Post, "/restaurants/5/favorite", 403, "");
    let store = &harness.ctx.restaurants;
    store.fetch_restaurants(PageQuery::default()).await.unwrap();

    let err = store.toggle_favorite(5).await.unwrap_err();
    assert!(matches!(err, ApiError::Permission));

    let state = store.snapshot();
    assert!(!state.restaurants[0].is_favorite);
    assert!(state.error.is_some());
    assert_eq!(harness.notices().len(), 1);
}

#[tokio::test]
async fn test_legacy_toggle_keeps_flipped_flag_on_failure() {
    let mut config = crate::infrastructure::config::Config::default();
    config.stores.rollback_favorite_on_failure = false;
    let harness = Harness::logged_in_with(config).await;
    listing(&harness, false);
    harness.transport.fail(Method::Post, "/restaurants/5/favorite");
    let store = &harness.ctx.restaurants;
    store.fetch_restaurants(PageQuery::default()).await.unwrap();

    assert!(matches!(store.toggle_favorite(5).await, Err(ApiError::Network(_))));
    assert!(store.snapshot().restaurants[0].is_favorite);

    // Network failures are not notified by the gateway, so the store does it
    let notices = harness.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_mutations_require_login_without_network() {
    let harness = Harness::anonymous().await;
    let store = &harness.ctx.restaurants;

    assert!(matches!(store.toggle_favorite(5).await, Err(ApiError::AuthRequired)));
    assert!(matches!(
        store.create_restaurant(RestaurantDraft::new("Taco Stand")).await,
        Err(ApiError::AuthRequired)
    ));
    assert!(matches!(store.delete_restaurant(5).await, Err(ApiError::AuthRequired)));

    assert_eq!(harness.transport.request_count(), 0);
    assert_eq!(harness.ctx.navigator.current_path(), "/login");
    let notices = harness.notices();
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Warning));
}

#[tokio::test]
async fn test_create_update_delete_maintain_the_list() {
    let harness = Harness::logged_in().await;
    listing(&harness, false);
    harness.respond(Method::Post, "/restaurants", 201, &restaurant_json(9, "Taco Stand", false));
    harness.respond(Method::Put, "/restaurants/9", 200, &restaurant_json(9, "Taco Palace", false));
    harness.respond(Method::Delete, "/restaurants/5", 204, "");
    let store = &harness.ctx.restaurants;
    store.fetch_restaurants(PageQuery::default()).await.unwrap();

    store
        .create_restaurant(RestaurantDraft::new("Taco Stand").with_category("Mexican"))
        .await
        .unwrap();
    let create = harness.transport.last_request().unwrap();
    match &create.body {
        RequestBody::Multipart(form) => {
            assert!(form.text_part("restaurant").unwrap().contains("\"category\":\"Mexican\""));
        }
        other => panic!("expected multipart body, got {:?}", other),
    }
    assert_eq!(store.snapshot().restaurants[0].id, 9);

    let mut draft = RestaurantDraft::new("Taco Palace");
    draft.remove_image = true;
    store.update_restaurant(9, draft).await.unwrap();
    assert_eq!(store.snapshot().restaurants[0].name, "Taco Palace");

    store.delete_restaurant(5).await.unwrap();
    let ids: Vec<i64> = store.snapshot().restaurants.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![9]);
}

#[tokio::test]
async fn test_detail_recomputes_rating_from_reviews() {
    let harness = Harness::anonymous().await;
    harness.respond(Method::Get, "/restaurants/5", 200, &restaurant_json(5, "Dumpling House", false));
    harness.respond(
        Method::Get,
        "/reviews/restaurant/5",
        200,
        &page_json(
            vec![
                review_json(1, 5, false, 0),
                review_json(2, 4, false, 0),
                review_json(3, 4, false, 0),
            ],
            3,
            0,
            10,
        ),
    );

    let restaurant = harness.ctx.restaurants.fetch_restaurant(5).await.unwrap();
    assert_eq!(restaurant.average_rating, 4.3);
    assert_eq!(restaurant.review_count, 3);
    assert_eq!(harness.ctx.restaurants.snapshot().current_reviews.len(), 3);

    // The public review listing never carries a credential
    let reviews_request = harness.transport.last_request().unwrap();
    assert!(reviews_request.header("Authorization").is_none());
}

#[tokio::test]
async fn test_detail_with_degraded_reviews_has_zero_rating() {
    let harness = Harness::anonymous().await;
    harness.respond(Method::Get, "/restaurants/5", 200, &restaurant_json(5, "Dumpling House", false));
    harness.respond(Method::Get, "/reviews/restaurant/5", 500, "");

    let restaurant = harness.ctx.restaurants.fetch_restaurant(5).await.unwrap();
    assert_eq!(restaurant.average_rating, 0.0);
    assert_eq!(restaurant.review_count, 0);
}

#[tokio::test]
async fn test_check_favorite() {
    let anonymous = Harness::anonymous().await;
    assert!(!anonymous.ctx.restaurants.check_favorite(5).await);
    assert_eq!(anonymous.transport.request_count(), 0);

    let harness = Harness::logged_in().await;
    harness.respond(Method::Post, "/restaurants/5/favorite/check", 200, "true");
    assert!(harness.ctx.restaurants.check_favorite(5).await);

    harness.respond(Method::Post, "/restaurants/6/favorite/check", 500, r#"{"error": "Access Denied"}"#);
    assert!(!harness.ctx.restaurants.check_favorite(6).await);

    harness.transport.fail(Method::Post, "/restaurants/7/favorite/check");
    assert!(!harness.ctx.restaurants.check_favorite(7).await);
}

#[tokio::test]
async fn test_unknown_restaurant_toggle_is_not_found() {
    let harness = Harness::logged_in().await;
    assert!(matches!(
        harness.ctx.restaurants.toggle_favorite(42).await,
        Err(ApiError::NotFound(_))
    ));
    assert_eq!(harness.transport.request_count(), 0);
}

#[test]
fn test_average_rating_rounding() {
    assert_eq!(average_rating(&[]), 0.0);

    let reviews: Vec<Review> = [5, 4, 4, 4]
        .iter()
        .enumerate()
        .map(|(i, rating)| serde_json::from_value(review_json(i as i64, *rating, false, 0)).unwrap())
        .collect();
    assert_eq!(average_rating(&reviews), 4.3);
}

#[tokio::test]
async fn test_filtered_deep_page_is_a_single_request() {
    let harness = Harness::anonymous().await;
    harness.respond(
        Method::Get,
        "/restaurants",
        200,
        r#"{"content": [], "totalElements": 45, "number": 3, "size": 10}"#,
    );
    let store = &harness.ctx.restaurants;

    let rewound = store.set_filters(RestaurantFilters {
        category: Some("Thai".to_string()),
        ..Default::default()
    });
    assert_eq!(rewound.page, 1);
    assert_eq!(harness.transport.request_count(), 0);

    let page = store.update_pagination(4, 10).await.unwrap();
    assert_eq!(harness.transport.request_count(), 1);
    assert_eq!(page.external_page(), 4);

    let request = harness.transport.last_request().unwrap();
    assert!(request.query.contains(&("page".to_string(), "3".to_string())));
    assert!(request.query.contains(&("category".to_string(), "Thai".to_string())));
}
