//! Outbound HTTP contract consumed by the HTTP-Request executor (§4.8), plus
//! the default `reqwest`-backed implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Contract for issuing one outbound HTTP request with a bounded timeout.
/// Implementations do not retry; retry is the HTTP-Request executor's job.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn do_request(&self, request: HttpRequestSpec) -> Result<HttpResponse, ServiceError>;
}

/// Default `HttpClient` on top of `reqwest`, rustls-backed.
///
/// Builds a fresh client per call, configured with the resolved per-request
/// timeout — consistent with §5's "no cross-step cancellation, provider-
/// bounded timeout" rule, and simple enough not to need a shared connection
/// pool across arbitrary, rarely-repeated flow-author-configured URLs.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient;

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn do_request(&self, request: HttpRequestSpec) -> Result<HttpResponse, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| ServiceError::server("client_build_failed", e.to_string()))?;

        let mut builder = client.request(
            reqwest::Method::from_bytes(request.method.as_str().as_bytes())
                .expect("HttpMethod::as_str is always a valid method token"),
            &request.url,
        );

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(url = %request.url, method = request.method.as_str(), "issuing outbound HTTP request");

        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::server("transport_error", e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::server("body_read_error", e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
