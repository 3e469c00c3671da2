//! Test wiring: a full client context over a scripted transport

use std::sync::Arc;

use crate::application::context::ClientContext;
use crate::application::session::token::encode_for_test;
use crate::domain::traits::{Method, Store};
use crate::infrastructure::adapters::Notice;
use crate::infrastructure::config::Config;
use crate::infrastructure::gateway::mock::MockTransport;
use crate::infrastructure::storage::MemoryStore;

pub struct Harness {
    pub ctx: ClientContext,
    pub transport: Arc<MockTransport>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MemoryStore::new());
        let ctx = ClientContext::build(config, transport.clone(), store.clone());
        Self { ctx, transport, store }
    }

    /// Anonymous, initialized session
    pub async fn anonymous() -> Self {
        let harness = Self::new();
        harness.ctx.session.initialize().await;
        harness
    }

    /// Session restored from a stored token for user #1
    pub async fn logged_in() -> Self {
        Self::logged_in_with(Config::default()).await
    }

    pub async fn logged_in_with(config: Config) -> Self {
        let harness = Self::with_config(config);
        harness
            .store
            .set("token", &format!("Bearer {}", encode_for_test(1, "tester", "USER")))
            .await
            .unwrap();
        harness.ctx.session.initialize().await;
        harness
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.transport.respond(method, path, status, body);
        self
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.ctx.notices.drain()
    }

    pub async fn stored_token(&self) -> Option<String> {
        self.store.get("token").await.unwrap()
    }
}

pub fn restaurant_json(id: i64, name: &str, is_favorite: bool) -> String {
    serde_json::json!({
        "id": id,
        "name": name,
        "averageRating": 4.0,
        "reviewCount": 2,
        "imageUrl": format!("gs://bucket/{}.png", id),
        "isFavorite": is_favorite,
    })
    .to_string()
}

pub fn review_json(id: i64, rating: u8, is_liked: bool, like_count: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "content": format!("review {}", id),
        "rating": rating,
        "created_At": "2025-02-08 19:30:00",
        "isLiked": is_liked,
        "likeCount": like_count,
        "username": "tester",
    })
}

pub fn page_json(items: Vec<serde_json::Value>, total: u64, current_page: u32, size: u32) -> String {
    serde_json::json!({
        "content": items,
        "totalElements": total,
        "currentPage": current_page,
        "size": size,
    })
    .to_string()
}
