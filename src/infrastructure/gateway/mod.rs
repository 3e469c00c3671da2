//! HTTP gateway - the single client every backend call goes through
//!
//! A call runs the request interceptors in order, hits the transport, then
//! runs the response interceptors in order over the outcome. The response
//! stage may turn a failure into a degraded success; callers see that
//! through [`ApiResponse::degradation`] and the typed decoders.

pub mod endpoints;
pub mod interceptors;
pub mod transport;

#[cfg(test)]
pub mod mock;

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use uuid::Uuid;

use crate::application::errors::ApiError;
use crate::domain::entities::Page;
use crate::domain::traits::{ApiRequest, Method, RawResponse, Transport};

pub use endpoints::Degradation;
pub use interceptors::{
    AuthInterceptor, InterceptorChain, LoggingInterceptor, Outcome, RequestInterceptor,
    ResponseInterceptor, ResponseNormalizer,
};
pub use transport::ReqwestTransport;

/// Successful (or degraded) response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    degradation: Option<Degradation>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            degradation: None,
        }
    }

    /// Empty success standing in for a failed call
    pub fn degraded(degradation: Degradation) -> Self {
        let body = match degradation {
            Degradation::EmptyList => "[]",
            Degradation::EmptyPage => "{}",
            Degradation::False => "false",
        };
        Self {
            status: 200,
            body: body.to_string(),
            degradation: Some(degradation),
        }
    }

    pub fn degradation(&self) -> Option<Degradation> {
        self.degradation
    }

    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }

    /// Single object. A degraded payload has no object to offer.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if let Some(degradation) = self.degradation {
            return Err(ApiError::Server(format!(
                "server failure masked as {:?}",
                degradation
            )));
        }
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Plain array
    pub fn list<T: DeserializeOwned>(&self) -> Result<Vec<T>, ApiError> {
        match self.degradation {
            Some(Degradation::EmptyList) | Some(Degradation::EmptyPage) => Ok(Vec::new()),
            Some(Degradation::False) => Err(ApiError::Decode("expected a list, got false".to_string())),
            None => serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string())),
        }
    }

    /// Paginated envelope
    pub fn page<T: DeserializeOwned>(&self, size: u32) -> Result<Page<T>, ApiError> {
        match self.degradation {
            Some(Degradation::EmptyList) | Some(Degradation::EmptyPage) => Ok(Page::empty(size)),
            Some(Degradation::False) => Err(ApiError::Decode("expected a page, got false".to_string())),
            None => serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string())),
        }
    }

    /// Boolean check; any degradation reads as `false`
    pub fn flag(&self) -> Result<bool, ApiError> {
        if self.degradation.is_some() {
            return Ok(false);
        }
        serde_json::from_str(self.body.trim()).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Raw body text
    pub fn text(&self) -> Result<String, ApiError> {
        if self.degradation.is_some() {
            return Err(ApiError::Server("server failure masked as empty result".to_string()));
        }
        Ok(self.body.clone())
    }

    /// Body ignored
    pub fn unit(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

impl From<RawResponse> for ApiResponse {
    fn from(raw: RawResponse) -> Self {
        Self::new(raw.status, raw.body)
    }
}

/// Call currently awaiting settlement
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub started: Instant,
}

type PendingMap = Mutex<HashMap<Uuid, PendingRequest>>;

/// Removes the pending entry however the call ends
struct PendingGuard<'a> {
    pending: &'a PendingMap,
    id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&self.id);
    }
}

/// HTTP gateway
pub struct Gateway {
    transport: Arc<dyn Transport>,
    chain: InterceptorChain,
    pending: PendingMap,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, chain: InterceptorChain) -> Self {
        Self {
            transport,
            chain,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Run one call through both interceptor stages
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let _guard = self.register(&request);

        for interceptor in self.chain.request_stage() {
            interceptor.on_request(&mut request).await?;
        }

        let mut outcome: Outcome = match self.transport.send(&request).await {
            Ok(raw) if raw.is_success() => Ok(ApiResponse::from(raw)),
            Ok(raw) => Err(ApiError::Status {
                status: raw.status,
                body: raw.body,
            }),
            Err(e) => Err(ApiError::Network(e.to_string())),
        };

        for interceptor in self.chain.response_stage() {
            outcome = interceptor.on_response(&request, outcome).await;
        }

        outcome
    }

    /// Snapshot of calls in flight
    pub fn pending_requests(&self) -> Vec<PendingRequest> {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let mut requests: Vec<_> = pending.values().cloned().collect();
        requests.sort_by_key(|r| r.started);
        requests
    }

    fn register(&self, request: &ApiRequest) -> PendingGuard<'_> {
        let id = Uuid::new_v4();
        let entry = PendingRequest {
            id,
            method: request.method,
            path: request.path.clone(),
            started: Instant::now(),
        };
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, entry);
        PendingGuard {
            pending: &self.pending,
            id,
        }
    }
}

#[cfg(test)]
mod tests;
