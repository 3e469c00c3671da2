//! Domain layer - Core business objects with no I/O
//!
//! This layer contains:
//! - Entities: Credential, session identity, restaurants, reviews, pages
//! - Traits: Abstractions for infrastructure (Store, Transport, Notifier, Navigator)

pub mod entities;
pub mod traits;
