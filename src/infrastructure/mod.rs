//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Durable key-value backends and the credential slot
//! - Database: SQLite key-value backend
//! - Gateway: HTTP client with interceptor stages
//! - Adapters: Presentation-side notifier and navigator

pub mod adapters;
pub mod config;
pub mod database;
pub mod gateway;
pub mod storage;
