//! Application layer errors

use thiserror::Error;

/// Top-level client errors (CLI entry point)
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failure classes a caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response reachable
    NetworkFailure,
    /// 400
    ValidationFailure,
    /// 401
    AuthFailure,
    /// 403
    PermissionFailure,
    /// 500 that was not degraded
    ServerFailure,
    /// Any other HTTP status
    HttpFailure,
    /// Synthesized locally, never touched the network
    LocalPrecondition,
    /// Response did not match the endpoint's schema
    InvalidResponse,
    Storage,
}

/// Errors surfaced by the gateway and the stores
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Validation { message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Permission denied")]
    Permission,

    #[error("Server error: {0}")]
    Server(String),

    /// Non-2xx response not yet classified by the response stage
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Non-2xx response outside the known taxonomy, already notified
    #[error("Request failed with status {status}")]
    Failed { status: u16, message: Option<String> },

    #[error("Please log in first")]
    AuthRequired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation already in progress for {0}")]
    Busy(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::NetworkFailure,
            ApiError::Validation { .. } => ErrorKind::ValidationFailure,
            ApiError::Auth(_) => ErrorKind::AuthFailure,
            ApiError::Permission => ErrorKind::PermissionFailure,
            ApiError::Server(_) => ErrorKind::ServerFailure,
            ApiError::Status { .. } | ApiError::Failed { .. } => ErrorKind::HttpFailure,
            ApiError::AuthRequired | ApiError::NotFound(_) | ApiError::Busy(_) => {
                ErrorKind::LocalPrecondition
            }
            ApiError::Decode(_) => ErrorKind::InvalidResponse,
            ApiError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether the gateway already showed a notice for this failure
    pub fn is_notified(&self) -> bool {
        matches!(
            self,
            ApiError::Validation { .. } | ApiError::Permission | ApiError::Failed { .. }
        )
    }

    /// HTTP status when the failure came from a server response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(400),
            ApiError::Auth(_) => Some(401),
            ApiError::Permission => Some(403),
            ApiError::Server(_) => Some(500),
            ApiError::Status { status, .. } | ApiError::Failed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Lock poisoned")]
    Poisoned,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
