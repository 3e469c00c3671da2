//! Review store - per-restaurant review pages and like toggling

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::RwLock;

use crate::application::errors::ApiError;
use crate::domain::entities::{Page, PageQuery, Review, ReviewDraft, DEFAULT_PAGE_SIZE};
use crate::domain::traits::ApiRequest;

use super::support::{entity_form, InFlight, ServiceDeps};

#[derive(Debug, Clone)]
pub struct ReviewState {
    /// Restaurant the cached page belongs to
    pub restaurant_id: Option<i64>,
    pub reviews: Vec<Review>,
    pub total_elements: u64,
    /// 1-based
    pub current_page: u32,
    pub page_size: u32,
    pub star_distribution: BTreeMap<u8, u32>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            restaurant_id: None,
            reviews: Vec::new(),
            total_elements: 0,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            star_distribution: BTreeMap::new(),
            loading: false,
            error: None,
        }
    }
}

pub struct ReviewStore {
    deps: ServiceDeps,
    state: RwLock<ReviewState>,
    in_flight: InFlight,
}

impl ReviewStore {
    pub fn new(deps: ServiceDeps) -> Self {
        let state = ReviewState {
            page_size: deps.config.page_size,
            ..Default::default()
        };
        let in_flight = InFlight::new(deps.config.serialize_toggles);
        Self {
            deps,
            state: RwLock::new(state),
            in_flight,
        }
    }

    pub fn snapshot(&self) -> ReviewState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut ReviewState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    async fn tracked<T>(
        &self,
        context: &str,
        op: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });
        let result = op.await;
        self.update(|s| {
            s.loading = false;
            if let Err(e) = &result {
                s.error = Some(e.to_string());
            }
        });
        if let Err(e) = &result {
            self.deps.report(e, context);
        }
        result
    }

    /// Load one page of a restaurant's reviews. Never fails on a server
    /// error: the listing degrades to an empty page.
    pub async fn fetch_reviews(&self, restaurant_id: i64, query: PageQuery) -> Result<Page<Review>, ApiError> {
        let request = ApiRequest::get(format!("/reviews/restaurant/{}/page", restaurant_id))
            .query(query.to_params());

        let page = self
            .tracked("Failed to load reviews", async move {
                self.deps.gateway.execute(request).await?.page::<Review>(query.size)
            })
            .await?;

        self.update(|s| {
            s.restaurant_id = Some(restaurant_id);
            s.reviews = page.content.clone();
            s.total_elements = page.total_elements;
            s.current_page = page.external_page();
            s.page_size = if page.size == 0 { query.size } else { page.size };
            s.star_distribution = page.star_distribution.clone();
        });
        Ok(page)
    }

    pub async fn create_review(&self, restaurant_id: i64, draft: ReviewDraft) -> Result<Review, ApiError> {
        self.deps.require_login("Please log in first").await?;
        let ReviewDraft { fields, image } = draft;

        let review = self
            .tracked("Failed to post review", async move {
                let form = entity_form("review", &fields, image)?;
                self.deps
                    .gateway
                    .execute(ApiRequest::post(format!("/reviews/{}", restaurant_id)).multipart(form))
                    .await?
                    .json::<Review>()
            })
            .await?;

        self.update(|s| {
            if s.restaurant_id.is_none() || s.restaurant_id == Some(restaurant_id) {
                s.restaurant_id = Some(restaurant_id);
                s.reviews.insert(0, review.clone());
                s.total_elements += 1;
            }
        });
        self.deps.notifier.success("Review posted");
        Ok(review)
    }

    pub async fn update_review(&self, review_id: i64, draft: ReviewDraft) -> Result<Review, ApiError> {
        self.deps.require_login("Please log in first").await?;
        let ReviewDraft { fields, image } = draft;

        let review = self
            .tracked("Failed to update review", async move {
                let form = entity_form("review", &fields, image)?;
                self.deps
                    .gateway
                    .execute(ApiRequest::put(format!("/reviews/{}", review_id)).multipart(form))
                    .await?
                    .json::<Review>()
            })
            .await?;

        self.update(|s| {
            if let Some(slot) = s.reviews.iter_mut().find(|r| r.id == review_id) {
                *slot = review.clone();
            }
        });
        self.deps.notifier.success("Review updated");
        Ok(review)
    }

    pub async fn delete_review(&self, review_id: i64) -> Result<(), ApiError> {
        self.deps.require_login("Please log in first").await?;

        self.tracked("Failed to delete review", async move {
            self.deps
                .gateway
                .execute(ApiRequest::delete(format!("/reviews/{}", review_id)))
                .await?
                .unit()
        })
        .await?;

        self.update(|s| {
            let before = s.reviews.len();
            s.reviews.retain(|r| r.id != review_id);
            if s.reviews.len() < before {
                s.total_elements = s.total_elements.saturating_sub(1);
            }
        });
        self.deps.notifier.success("Review deleted");
        Ok(())
    }

    /// Optimistically flip the like; the prior state comes back on failure
    pub async fn toggle_like(&self, review_id: i64) -> Result<Review, ApiError> {
        self.deps.require_login("Please log in first").await?;

        let prior = self.update(|s| {
            s.reviews
                .iter()
                .find(|r| r.id == review_id)
                .map(Review::like_state)
        });
        let Some(prior) = prior else {
            let err = ApiError::NotFound(format!("review {}", review_id));
            self.deps.report(&err, "Review not found");
            return Err(err);
        };
        let _guard = self.in_flight.acquire(review_id, "review")?;

        let liked = self.update(|s| {
            s.loading = true;
            s.error = None;
            s.reviews
                .iter_mut()
                .find(|r| r.id == review_id)
                .map(|review| {
                    review.flip_like();
                    review.is_liked
                })
                .unwrap_or(!prior.is_liked)
        });

        let path = format!("/reviews/{}/like", review_id);
        let request = if liked {
            ApiRequest::post(path)
        } else {
            ApiRequest::delete(path)
        };
        let result = self.deps.gateway.execute(request).await.and_then(|r| r.unit());

        let review = self.update(|s| {
            s.loading = false;
            let review = s.reviews.iter_mut().find(|r| r.id == review_id);
            match (&result, review) {
                (Ok(()), Some(review)) => Some(review.clone()),
                (Err(e), review) => {
                    if let Some(review) = review {
                        review.restore_like(prior);
                    }
                    s.error = Some(e.to_string());
                    None
                }
                (Ok(()), None) => None,
            }
        });

        match result {
            Ok(()) => review.ok_or_else(|| ApiError::NotFound(format!("review {}", review_id))),
            Err(e) => {
                self.deps.report(&e, "Failed to update like");
                Err(e)
            }
        }
    }
}
