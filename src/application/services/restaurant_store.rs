//! Restaurant store - cached listings, detail view and favorite toggling

use std::future::Future;
use std::sync::RwLock;

use crate::application::errors::ApiError;
use crate::domain::entities::{
    Favorite, Page, PageQuery, Restaurant, RestaurantDraft, RestaurantFilters, Review,
    DEFAULT_PAGE_SIZE,
};
use crate::domain::traits::ApiRequest;

use super::support::{entity_form, InFlight, ServiceDeps};

/// Pagination metadata in caller terms (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Pagination {
    fn first(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size,
            total: 0,
        }
    }

    pub fn query(&self) -> PageQuery {
        PageQuery::new(self.current_page, self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Snapshot of everything the restaurant views render
#[derive(Debug, Clone, Default)]
pub struct RestaurantState {
    pub restaurants: Vec<Restaurant>,
    pub popular: Vec<Restaurant>,
    pub latest: Vec<Restaurant>,
    pub current: Option<Restaurant>,
    /// First page of reviews for `current`
    pub current_reviews: Vec<Review>,
    pub filters: RestaurantFilters,
    pub pagination: Pagination,
    pub loading: bool,
    pub error: Option<String>,
    pub loading_popular: bool,
    pub loading_latest: bool,
    pub error_popular: Option<String>,
    pub error_latest: Option<String>,
}

impl RestaurantState {
    fn favorite_flag(&self, id: i64) -> Option<bool> {
        self.restaurants
            .iter()
            .find(|r| r.id == id)
            .or(self.current.as_ref().filter(|r| r.id == id))
            .map(|r| r.is_favorite)
    }

    fn set_favorite_flag(&mut self, id: i64, value: bool) {
        for restaurant in self.restaurants.iter_mut().filter(|r| r.id == id) {
            restaurant.is_favorite = value;
        }
        if let Some(current) = self.current.as_mut().filter(|r| r.id == id) {
            current.is_favorite = value;
        }
    }
}

pub struct RestaurantStore {
    deps: ServiceDeps,
    state: RwLock<RestaurantState>,
    in_flight: InFlight,
}

impl RestaurantStore {
    pub fn new(deps: ServiceDeps) -> Self {
        let state = RestaurantState {
            pagination: Pagination::first(deps.config.page_size),
            ..Default::default()
        };
        let in_flight = InFlight::new(deps.config.serialize_toggles);
        Self {
            deps,
            state: RwLock::new(state),
            in_flight,
        }
    }

    pub fn snapshot(&self) -> RestaurantState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut RestaurantState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Track `loading`/`error` around one main-list operation
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

    /// Fetch one page of the listing with the current filters
    pub async fn fetch_restaurants(&self, query: PageQuery) -> Result<Page<Restaurant>, ApiError> {
        let filters = self.snapshot().filters;
        let request = ApiRequest::get("/restaurants")
            .query(query.to_params())
            .query(filters.to_params());

        let page = self
            .tracked("Failed to load restaurants", async move {
                self.deps.gateway.execute(request).await?.page::<Restaurant>(query.size)
            })
            .await?;

        self.update(|s| {
            s.restaurants = page.content.clone();
            s.pagination = Pagination {
                current_page: page.external_page(),
                page_size: query.size,
                total: page.total_elements,
            };
        });
        tracing::debug!(
            "Loaded {} restaurants (page {}, total {})",
            page.content.len(),
            page.external_page(),
            page.total_elements
        );
        Ok(page)
    }

    /// Refetch the page the pagination state points at
    pub async fn refresh(&self) -> Result<Page<Restaurant>, ApiError> {
        let query = self.snapshot().pagination.query();
        self.fetch_restaurants(query).await
    }

    /// Replace the filters and rewind to page 1 without fetching
    pub fn set_filters(&self, filters: RestaurantFilters) -> PageQuery {
        self.update(|s| {
            s.filters = filters;
            s.pagination.current_page = 1;
            PageQuery::first(s.pagination.page_size)
        })
    }

    /// Replace the filters and start over from page 1
    pub async fn update_filters(&self, filters: RestaurantFilters) -> Result<Page<Restaurant>, ApiError> {
        let query = self.set_filters(filters);
        self.fetch_restaurants(query).await
    }

    pub async fn update_pagination(&self, page: u32, size: u32) -> Result<Page<Restaurant>, ApiError> {
        let query = PageQuery::new(page, size);
        self.update(|s| {
            s.pagination.current_page = query.page;
            s.pagination.page_size = query.size;
        });
        self.fetch_restaurants(query).await
    }

    pub async fn fetch_popular(&self) -> Result<Vec<Restaurant>, ApiError> {
        self.update(|s| {
            s.loading_popular = true;
            s.error_popular = None;
        });
        let result = self.fetch_featured("/restaurants/popular").await;
        self.update(|s| {
            s.loading_popular = false;
            match &result {
                Ok(list) => s.popular = list.clone(),
                Err(e) => s.error_popular = Some(e.to_string()),
            }
        });
        if let Err(e) = &result {
            self.deps.report(e, "Failed to load popular restaurants");
        }
        result
    }

    pub async fn fetch_latest(&self) -> Result<Vec<Restaurant>, ApiError> {
        self.update(|s| {
            s.loading_latest = true;
            s.error_latest = None;
        });
        let result = self.fetch_featured("/restaurants/latest").await;
        self.update(|s| {
            s.loading_latest = false;
            match &result {
                Ok(list) => s.latest = list.clone(),
                Err(e) => s.error_latest = Some(e.to_string()),
            }
        });
        if let Err(e) = &result {
            self.deps.report(e, "Failed to load latest restaurants");
        }
        result
    }

    async fn fetch_featured(&self, path: &str) -> Result<Vec<Restaurant>, ApiError> {
        let response = self.deps.gateway.execute(ApiRequest::get(path)).await?;
        if response.is_degraded() {
            tracing::warn!("{} degraded to an empty list", path);
        }
        response.list()
    }

    /// Detail view: the restaurant plus its first page of reviews, with the
    /// rating aggregate recomputed from those reviews
    pub async fn fetch_restaurant(&self, id: i64) -> Result<Restaurant, ApiError> {
        let size = DEFAULT_PAGE_SIZE;
        let (restaurant, reviews) = self
            .tracked("Failed to load restaurant", async move {
                let mut restaurant: Restaurant = self
                    .deps
                    .gateway
                    .execute(ApiRequest::get(format!("/restaurants/{}", id)))
                    .await?
                    .json()?;

                let reviews: Page<Review> = self
                    .deps
                    .gateway
                    .execute(
                        ApiRequest::get(format!("/reviews/restaurant/{}", id))
                            .query(PageQuery::first(size).to_params()),
                    )
                    .await?
                    .page(size)?;

                restaurant.average_rating = average_rating(&reviews.content);
                restaurant.review_count = u32::try_from(reviews.total_elements).unwrap_or(u32::MAX);
                Ok::<_, ApiError>((restaurant, reviews.content))
            })
            .await?;

        self.update(|s| {
            s.current = Some(restaurant.clone());
            s.current_reviews = reviews;
        });
        Ok(restaurant)
    }

    pub async fn create_restaurant(&self, draft: RestaurantDraft) -> Result<Restaurant, ApiError> {
        self.deps.require_login("Please log in first").await?;
        let RestaurantDraft { fields, image, .. } = draft;

        let restaurant = self
            .tracked("Failed to create restaurant", async move {
                let form = entity_form("restaurant", &fields, image)?;
                self.deps
                    .gateway
                    .execute(ApiRequest::post("/restaurants").multipart(form))
                    .await?
                    .json::<Restaurant>()
            })
            .await?;

        self.update(|s| s.restaurants.insert(0, restaurant.clone()));
        self.deps.notifier.success("Restaurant created");
        tracing::info!("Created restaurant {} ({})", restaurant.name, restaurant.id);
        Ok(restaurant)
    }

    pub async fn update_restaurant(&self, id: i64, draft: RestaurantDraft) -> Result<Restaurant, ApiError> {
        self.deps.require_login("Please log in first").await?;
        let RestaurantDraft {
            fields,
            image,
            remove_image,
        } = draft;

        let restaurant = self
            .tracked("Failed to update restaurant", async move {
                let mut form = entity_form("restaurant", &fields, image)?;
                if remove_image {
                    form = form.text("removeImage", "true");
                }
                self.deps
                    .gateway
                    .execute(ApiRequest::put(format!("/restaurants/{}", id)).multipart(form))
                    .await?
                    .json::<Restaurant>()
            })
            .await?;

        self.update(|s| {
            if let Some(slot) = s.restaurants.iter_mut().find(|r| r.id == id) {
                *slot = restaurant.clone();
            }
            if s.current.as_ref().is_some_and(|r| r.id == id) {
                s.current = Some(restaurant.clone());
            }
        });
        self.deps.notifier.success("Restaurant updated");
        Ok(restaurant)
    }

    pub async fn delete_restaurant(&self, id: i64) -> Result<(), ApiError> {
        self.deps.require_login("Please log in first").await?;

        self.tracked("Failed to delete restaurant", async move {
            self.deps
                .gateway
                .execute(ApiRequest::delete(format!("/restaurants/{}", id)))
                .await?
                .unit()
        })
        .await?;

        self.update(|s| {
            s.restaurants.retain(|r| r.id != id);
            if s.current.as_ref().is_some_and(|r| r.id == id) {
                s.current = None;
                s.current_reviews.clear();
            }
        });
        self.deps.notifier.success("Restaurant deleted");
        Ok(())
    }

    /// Optimistically flip `isFavorite`; returns the new value
    pub async fn toggle_favorite(&self, id: i64) -> Result<bool, ApiError> {
        self.deps
            .require_login("Please log in to save favorites")
            .await?;

        let Some(prior) = self.snapshot().favorite_flag(id) else {
            let err = ApiError::NotFound(format!("restaurant {}", id));
            self.deps.report(&err, "Restaurant not found");
            return Err(err);
        };
        let _guard = self.in_flight.acquire(id, "restaurant")?;

        let next = !prior;
        self.update(|s| {
            s.set_favorite_flag(id, next);
            s.error = None;
        });

        let path = format!("/restaurants/{}/favorite", id);
        let request = if next {
            ApiRequest::post(path)
        } else {
            ApiRequest::delete(path)
        };

        match self.deps.gateway.execute(request).await.and_then(|r| r.unit()) {
            Ok(()) => {
                if next {
                    self.deps.session.cache_favorite(Favorite::from_id(id));
                } else {
                    self.deps.session.uncache_favorite(id);
                }
                Ok(next)
            }
            Err(e) => {
                let rollback = self.deps.config.rollback_favorite_on_failure;
                self.update(|s| {
                    if rollback {
                        s.set_favorite_flag(id, prior);
                    }
                    s.error = Some(e.to_string());
                });
                self.deps.report(&e, "Failed to update favorite");
                Err(e)
            }
        }
    }

    /// Server-side favorite check; `false` without a credential or on any failure
    pub async fn check_favorite(&self, id: i64) -> bool {
        if !self.deps.session.credentials().is_present().await {
            return false;
        }

        let request = ApiRequest::post(format!("/restaurants/{}/favorite/check", id));
        let is_favorite = match self.deps.gateway.execute(request).await.and_then(|r| r.flag()) {
            Ok(flag) => flag,
            Err(e) => {
                tracing::debug!("Favorite check for {} failed: {}", id, e);
                false
            }
        };

        self.update(|s| s.set_favorite_flag(id, is_favorite));
        is_favorite
    }
}

/// Mean rating rounded to one decimal; zero without reviews
fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    (total / reviews.len() as f64 * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests;
