//! HTTP transport implementation.
//!
//! This module provides an HTTP-based transport for the sync engine.
//! The actual HTTP client is abstracted via a trait to allow different
//! implementations (reqwest, ureq, a platform webview bridge, etc.).

use std::time::Duration;

use aquasync_protocol::{PullQuery, PullResponse, PushRequest, PushResponse};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;

/// Maximum response-body length carried inside a [`SyncError::Server`].
const ERROR_BODY_LIMIT: usize = 512;

/// A plain HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as UTF-8 text.
    pub body: String,
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. The
/// `Err` variant is reserved for failures where no response arrived at
/// all (DNS, connect, timeout); HTTP error statuses come back as
/// ordinary [`HttpResponse`]s.
pub trait HttpClient: Send + Sync {
    /// Sends a POST with a JSON body and a bearer token.
    fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, String>;

    /// Sends a GET with a bearer token.
    fn get(&self, url: &str, bearer: &str, timeout: Duration) -> Result<HttpResponse, String>;
}

/// HTTP-based sync transport speaking the JSON wire contract.
pub struct HttpTransport<C: HttpClient> {
    base_url: String,
    timeout: Duration,
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a new HTTP transport.
    pub fn new(base_url: impl Into<String>, timeout: Duration, client: C) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout,
            client,
        }
    }

    /// Creates a transport from a sync configuration.
    pub fn from_config(config: &SyncConfig, client: C) -> Self {
        Self::new(config.server_url.clone(), config.timeout, client)
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn pull_url(&self, query: &PullQuery) -> String {
        let mut url = format!("{}/sync/pull?since={}", self.base_url, query.since_seconds);
        if let Some(client_id) = query.client_id {
            url.push_str("&client_id=");
            url.push_str(&client_id.to_string());
        }
        url
    }

    fn check_status(response: HttpResponse) -> SyncResult<String> {
        match response.status {
            200..=299 => Ok(response.body),
            401 => Err(SyncError::AuthInvalid(truncate(&response.body))),
            403 => Err(SyncError::Forbidden(truncate(&response.body))),
            status => Err(SyncError::Server {
                status,
                body: truncate(&response.body),
            }),
        }
    }
}

fn truncate(body: &str) -> String {
    let mut end = body.len().min(ERROR_BODY_LIMIT);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}

impl<C: HttpClient> SyncTransport for HttpTransport<C> {
    fn push(&self, token: &str, request: &PushRequest) -> SyncResult<PushResponse> {
        let body = serde_json::to_string(request)
            .map_err(|e| SyncError::Protocol(format!("failed to encode push request: {e}")))?;

        let url = format!("{}/sync/push", self.base_url);
        let response = self
            .client
            .post_json(&url, token, &body, self.timeout)
            .map_err(SyncError::transport_retryable)?;

        let body = Self::check_status(response)?;
        serde_json::from_str(&body)
            .map_err(|e| SyncError::Protocol(format!("failed to decode push response: {e}")))
    }

    fn pull(&self, token: &str, query: &PullQuery) -> SyncResult<PullResponse> {
        let url = self.pull_url(query);
        let response = self
            .client
            .get(&url, token, self.timeout)
            .map_err(SyncError::transport_retryable)?;

        let body = Self::check_status(response)?;
        serde_json::from_str(&body)
            .map_err(|e| SyncError::Protocol(format!("failed to decode pull response: {e}")))
    }
}
