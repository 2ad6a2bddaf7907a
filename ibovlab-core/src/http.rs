//! Blocking HTTP transport.
//!
//! Both upstream APIs (brapi.dev and Yahoo Finance) are plain JSON-over-GET.
//! The `HttpClient` trait is the single seam through which every network
//! request flows, so tests can script responses and count calls.

use std::time::Duration;
use thiserror::Error;

/// Status, selected headers, and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Value of the `Retry-After` header in seconds, if present and numeric.
    pub retry_after_secs: Option<u64>,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            retry_after_secs: None,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after_secs: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failures (no HTTP status was received).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to build HTTP client: {0}")]
    Build(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Timeouts and connection failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::Connect(_))
    }
}

/// A blocking GET client.
pub trait HttpClient: Send + Sync {
    /// Issue a GET request with the given query parameters.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;
}

/// `reqwest` blocking client with a request timeout.
pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
}

impl ReqwestHttpClient {
    pub const USER_AGENT: &'static str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(Self::USER_AGENT)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(classify)?;

        let status = resp.status().as_u16();
        let retry_after_secs = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = resp.text().map_err(classify)?;

        Ok(HttpResponse {
            status,
            retry_after_secs,
            body,
        })
    }
}

// reqwest errors embed the full URL, which for brapi includes the token.
fn classify(e: reqwest::Error) -> TransportError {
    let e = e.without_url();
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}
