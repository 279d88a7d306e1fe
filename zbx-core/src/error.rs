//! Error types for zbx
//!
//! This module defines the error taxonomy shared by every zbx crate. There
//! are two main types:
//!
//! - **Error**: Client-side failure of a single call (uses thiserror)
//! - **ApiErrorData**: The `error` object returned by the remote API
//!
//! # Error Taxonomy
//!
//! Every variant is terminal to the call that produced it. Nothing is retried
//! internally; callers that want a retry policy can check
//! [`Error::is_retryable`].
//!
//! - `Configuration`: endpoint or credentials missing, raised before any
//!   network activity
//! - `Authentication`: a protected method was called without a token
//! - `Transport`: the HTTP layer failed (refused, timeout, empty non-2xx)
//! - `Api`: the remote API answered with an error object (strict mode only)
//! - `NotFound`: a name resolver found no matching record
//!
//! # Examples
//!
//! ```rust
//! use zbx_core::{ApiErrorData, Error};
//!
//! let remote = ApiErrorData::with_data(-32602, "Invalid params.", "No permissions.");
//! let error = Error::from(remote);
//! assert!(!error.is_retryable());
//! assert_eq!(error.kind(), "api");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for zbx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client-side error type for zbx operations
///
/// Each variant maps to one failure class of the call contract. Variants
/// carry enough context to log without re-reading the request.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Endpoint or credentials are missing or unusable
    ///
    /// Raised before any network activity takes place.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A protected method was invoked without an auth token
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// HTTP layer failure
    ///
    /// Covers refused connections, timeouts and non-2xx responses that carry
    /// no body. The underlying message is preserved.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Well-formed error object returned by the remote API
    ///
    /// Only surfaced when the caller asked for strict mode; otherwise the
    /// error stays embedded in the returned envelope.
    #[error("API error: {0}")]
    Api(#[from] ApiErrorData),

    /// A name resolver found no record for the given token
    #[error("{kind} not found: {token}")]
    NotFound {
        /// What was being resolved ("group", "template", ...)
        kind: String,
        /// The name that failed to resolve
        token: String,
    },

    /// The response body is not a valid JSON-RPC response
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Params or a typed result could not be converted to or from JSON
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Short, stable label for this error class
    ///
    /// Used as a metric attribute and in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Authentication(_) => "authentication",
            Error::Transport(_) => "transport",
            Error::Api(_) => "api",
            Error::NotFound { .. } => "not_found",
            Error::InvalidResponse(_) => "invalid_response",
            Error::Serialization(_) => "serialization",
        }
    }

    /// Whether repeating the same call could plausibly succeed
    ///
    /// Only transport failures qualify. The client never retries by itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Error object as returned by the Zabbix API
///
/// The API always fills `code` and `message`; `data` usually carries the
/// human-readable detail ("Incorrect user name or password ...").
///
/// # Examples
///
/// ```rust
/// use zbx_core::ApiErrorData;
///
/// let error: ApiErrorData = serde_json::from_str(
///     r#"{"code":-32602,"message":"Invalid params.","data":"Not authorized."}"#,
/// ).unwrap();
/// assert_eq!(error.to_string(), "[-32602] Invalid params.: Not authorized.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorData {
    /// Numeric error code (-32602 invalid params, -32500 application error, ...)
    pub code: i64,

    /// Short description of the error class
    pub message: String,

    /// Optional detail text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ApiErrorData {
    /// Create an error object with code and message
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error object with detail text
    pub fn with_data(code: i64, message: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data.into()),
        }
    }
}

impl std::fmt::Display for ApiErrorData {
    /// Formats as "[code] message" or "[code] message: data"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(data) => write!(f, "[{}] {}: {}", self.code, self.message, data),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

impl std::error::Error for ApiErrorData {}
