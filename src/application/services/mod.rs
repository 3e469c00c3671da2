//! Application services - server-backed state the presentation layer binds to

pub mod restaurant_store;
pub mod review_store;
pub mod support;
pub mod user_service;

#[cfg(test)]
pub(crate) mod testing;

pub use restaurant_store::{Pagination, RestaurantState, RestaurantStore};
pub use review_store::{ReviewState, ReviewStore};
pub use support::ServiceDeps;
pub use user_service::UserService;
