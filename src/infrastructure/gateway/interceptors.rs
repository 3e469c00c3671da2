//! Interceptor stages for the gateway

use async_trait::async_trait;
use std::sync::Arc;

use super::endpoints::{self, Degradation};
use super::ApiResponse;
use crate::application::errors::ApiError;
use crate::application::session::Session;
use crate::domain::traits::{ApiRequest, Method, Navigator, Notifier};
use crate::infrastructure::storage::CredentialStore;

pub const LOGIN_PATH: &str = "/login";
pub const ACCESS_DENIED_MARKER: &str = "Access Denied";

const BAD_REQUEST_FALLBACK: &str = "Invalid request, please check your input";
const FORBIDDEN_MESSAGE: &str = "Permission denied";
const FAILED_MESSAGE: &str = "Operation failed, please try again later";

/// Result of a call as it moves through the response stage
pub type Outcome = Result<ApiResponse, ApiError>;

/// Outgoing stage
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Augment the request, or fail before anything reaches the network
    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError>;
}

/// Incoming stage
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_response(&self, request: &ApiRequest, outcome: Outcome) -> Outcome;
}

/// Ordered interceptor lists
#[derive(Default, Clone)]
pub struct InterceptorChain {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_request<I: RequestInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.request.push(Arc::new(interceptor));
        self
    }

    pub fn on_response<I: ResponseInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.response.push(Arc::new(interceptor));
        self
    }

    /// Register an interceptor on both stages
    pub fn on_both<I: RequestInterceptor + ResponseInterceptor + 'static>(mut self, interceptor: I) -> Self {
        let interceptor = Arc::new(interceptor);
        self.request.push(interceptor.clone());
        self.response.push(interceptor);
        self
    }

    pub fn request_stage(&self) -> &[Arc<dyn RequestInterceptor>] {
        &self.request
    }

    pub fn response_stage(&self) -> &[Arc<dyn ResponseInterceptor>] {
        &self.response
    }
}

/// Attaches the bearer credential, or fails fast on protected calls without one
pub struct AuthInterceptor {
    credentials: CredentialStore,
}

impl AuthInterceptor {
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl RequestInterceptor for AuthInterceptor {
    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        if endpoints::is_public(request.method, &request.path) {
            return Ok(());
        }

        match self.credentials.get().await {
            Some(credential) => {
                request.set_header("Authorization", credential.header_value());
                Ok(())
            }
            None if endpoints::is_protected(request.method, &request.path) => {
                tracing::debug!(
                    "Auth required but no credential: {} {}",
                    request.method,
                    request.path
                );
                Err(ApiError::AuthRequired)
            }
            None => Ok(()),
        }
    }
}

/// Maps failures onto the client error taxonomy
pub struct ResponseNormalizer {
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl ResponseNormalizer {
    pub fn new(session: Arc<Session>, notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            notifier,
            navigator,
        }
    }

    async fn on_unauthorized(&self, request: &ApiRequest) {
        if !endpoints::is_protected(request.method, &request.path) {
            return;
        }
        if self.navigator.current_path().starts_with(LOGIN_PATH) {
            return;
        }
        if !self.session.is_logged_in().await {
            return;
        }

        tracing::info!("Credential rejected on {}, ending session", request.path);
        self.session.clear_user().await;
        self.navigator.push(LOGIN_PATH);
    }
}

#[async_trait]
impl ResponseInterceptor for ResponseNormalizer {
    async fn on_response(&self, request: &ApiRequest, outcome: Outcome) -> Outcome {
        let err = match outcome {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if let Some(degradation) = endpoints::degraded_read(request.method, &request.path) {
            tracing::warn!("Degrading {} {} to {:?}: {}", request.method, request.path, degradation, err);
            return Ok(ApiResponse::degraded(degradation));
        }

        let (status, body) = match err {
            ApiError::Status { status, body } => (status, body),
            other => return Err(other),
        };
        let payload = ErrorPayload::parse(&body);

        match status {
            400 => {
                let message = payload
                    .message
                    .or(payload.error)
                    .unwrap_or_else(|| BAD_REQUEST_FALLBACK.to_string());
                self.notifier.error(&message);
                Err(ApiError::Validation { message })
            }
            401 => {
                self.on_unauthorized(request).await;
                Err(ApiError::Auth(
                    payload.message.or(payload.error).unwrap_or_else(|| "Unauthorized".to_string()),
                ))
            }
            403 => {
                self.notifier.error(FORBIDDEN_MESSAGE);
                Err(ApiError::Permission)
            }
            500 => {
                tracing::error!(
                    "Server error on {} {}: {}",
                    request.method,
                    request.path,
                    payload.message.as_deref().unwrap_or("Internal Server Error")
                );
                if payload.error.as_deref() == Some(ACCESS_DENIED_MARKER) {
                    Ok(ApiResponse::degraded(Degradation::False))
                } else if request.method == Method::Get {
                    Ok(ApiResponse::degraded(Degradation::EmptyList))
                } else {
                    Err(ApiError::Server(
                        payload
                            .message
                            .or(payload.error)
                            .unwrap_or_else(|| "Internal Server Error".to_string()),
                    ))
                }
            }
            status => {
                self.notifier.error(FAILED_MESSAGE);
                Err(ApiError::Failed {
                    status,
                    message: payload.message.or(payload.error),
                })
            }
        }
    }
}

/// `message` / `error` fields of a JSON error body
#[derive(Debug, Default)]
struct ErrorPayload {
    message: Option<String>,
    error: Option<String>,
}

impl ErrorPayload {
    fn parse(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            return Self::default();
        };
        let field = |name: &str| {
            value
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };
        Self {
            message: field("message"),
            error: field("error"),
        }
    }
}

/// Traces every call on the way out and the way back
pub struct LoggingInterceptor;

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
        tracing::debug!(
            "-> {} {} (auth: {})",
            request.method,
            request.path,
            request.header("Authorization").is_some()
        );
        Ok(())
    }
}

#[async_trait]
impl ResponseInterceptor for LoggingInterceptor {
    async fn on_response(&self, request: &ApiRequest, outcome: Outcome) -> Outcome {
        match &outcome {
            Ok(response) if response.is_degraded() => {
                tracing::debug!("<- {} {} degraded", request.method, request.path)
            }
            Ok(response) => tracing::debug!("<- {} {} {}", request.method, request.path, response.status),
            Err(e) => tracing::warn!("<- {} {} failed: {}", request.method, request.path, e),
        }
        outcome
    }
}
