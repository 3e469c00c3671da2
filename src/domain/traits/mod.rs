//! Domain traits - Abstractions for infrastructure implementations

pub mod navigator;
pub mod notifier;
pub mod store;
pub mod transport;

pub use navigator::Navigator;
pub use notifier::{NoticeLevel, Notifier};
pub use store::Store;
pub use transport::{ApiRequest, Method, MultipartForm, RawResponse, RequestBody, Transport, TransportError};
