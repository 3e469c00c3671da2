//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Session: Login state machine and token decoding
//! - Services: User, restaurant and review stores
//! - Navigation: Route table and auth guard
//! - Images: Image URL resolution
//! - Errors: Client error taxonomy

pub mod context;
pub mod errors;
pub mod images;
pub mod navigation;
pub mod services;
pub mod session;

pub use context::ClientContext;
