//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

use crate::domain::traits::{ApiRequest, Method, RawResponse, RequestBody, Transport, TransportError};

/// HTTP transport bound to one base URL with a fixed timeout
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("restaurant-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build_form(request: &ApiRequest) -> Result<Option<Form>, TransportError> {
        let RequestBody::Multipart(multipart) = &request.body else {
            return Ok(None);
        };

        let mut form = Form::new();
        for (name, value) in &multipart.texts {
            form = form.text(name.clone(), value.clone());
        }
        if let Some((name, upload)) = &multipart.file {
            let part = Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.content_type)
                .map_err(|e| TransportError {
                    message: format!("invalid content type for {}: {}", upload.file_name, e),
                    timed_out: false,
                })?;
            form = form.part(name.clone(), part);
        }
        Ok(Some(form))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(_) => match Self::build_form(request)? {
                Some(form) => builder.multipart(form),
                None => builder,
            },
        };

        let response = builder.send().await.map_err(|e| TransportError {
            timed_out: e.is_timeout(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError {
            timed_out: e.is_timeout(),
            message: e.to_string(),
        })?;

        Ok(RawResponse::new(status, body))
    }
}
