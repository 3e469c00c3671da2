//! Domain entities - Core business objects with no external dependencies

pub mod credential;
pub mod image;
pub mod page;
pub mod restaurant;
pub mod review;
pub mod user;

pub use credential::{Credential, BEARER_PREFIX};
pub use image::ImageUpload;
pub use page::{Page, PageQuery, DEFAULT_PAGE_SIZE};
pub use restaurant::{Favorite, Restaurant, RestaurantDraft, RestaurantFields, RestaurantFilters, Tag};
pub use review::{LikeState, Review, ReviewDraft, ReviewFields};
pub use user::{LoginRequest, ProfileUpdate, RegisterRequest, Role, SessionIdentity, UserProfile, ROLE_PREFIX};
