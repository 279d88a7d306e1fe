//! HTTP transport for API calls
//!
//! The RPC core only needs one thing from the network: POST a JSON body to
//! the endpoint and hand back the response body. That contract is the
//! `Transport` trait, so the HTTP stack can be swapped for a scripted one in
//! tests (and call counts asserted on).
//!
//! # Error Mapping
//!
//! - connection refused, DNS failure, timeout → `Error::Transport`
//! - non-2xx with a body that is not a JSON-RPC response (empty, HTML, a
//!   gateway's own JSON) → `Error::Transport` carrying the HTTP status
//! - non-2xx with a JSON-RPC response body → returned as-is; the API reports
//!   its errors in-band
//!
//! Every request carries the transport's timeout, including requests sent
//! through a `reqwest::Client` supplied with `from_client`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use zbx_core::{codec, Error, Result};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Content type the Zabbix frontend expects for API calls
pub const JSON_RPC_CONTENT_TYPE: &str = "application/json-rpc";

/// A single request/response round trip to the API endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` and return the response body
    async fn post_json(&self, url: &str, body: String) -> Result<String>;
}

/// `Transport` backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, timeout })
    }

    /// Wrap an already configured `reqwest` client
    ///
    /// Requests still time out after `DEFAULT_TIMEOUT` unless
    /// `with_timeout` says otherwise.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to a plain HTTP client");
            Self::from_client(reqwest::Client::new())
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<String> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_RPC_CONTENT_TYPE)
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {}", e)))?;

        if !status.is_success() && codec::decode_response(&text).is_err() {
            tracing::debug!(%status, body_len = text.len(), "Non-success HTTP status");
            return Err(Error::Transport(if text.trim().is_empty() {
                format!("HTTP {} with empty body", status)
            } else {
                format!("HTTP {}: {}", status, truncate(text.trim(), 200))
            }));
        }

        Ok(text)
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
