//! Client-side session and data-sync layer for the restaurant review service
//!
//! - `domain`: entities and the seams to the outside world
//! - `application`: session state, stores, navigation guard, image URLs
//! - `infrastructure`: config, storage backends, HTTP gateway, adapters

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::ClientContext;
pub use infrastructure::config::Config;
