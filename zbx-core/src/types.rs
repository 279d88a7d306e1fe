//! JSON-RPC 2.0 envelopes as spoken by the Zabbix API
//!
//! The API accepts one fixed request shape and answers with one fixed
//! response shape:
//!
//! ```text
//! request:  {"jsonrpc":"2.0","method":"host.get","params":{...},"id":1,"auth":"..."}
//! response: {"jsonrpc":"2.0","result":[...],"id":1}
//!       or: {"jsonrpc":"2.0","error":{"code":..,"message":..,"data":..},"id":1}
//! ```
//!
//! The `auth` member is a Zabbix extension. It carries the session token and
//! is left off the wire for methods that do not need one (login, version
//! queries).
//!
//! # Request IDs
//!
//! The client always sends numeric ids. Responses are decoded leniently
//! because the server answers `"id": null` when it could not read the
//! request at all.

use crate::error::{ApiErrorData, Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// JSON-RPC request/response identifier
///
/// Serialized untagged, so `Id::Number(7)` is just `7` on the wire.
///
/// # Examples
///
/// ```rust
/// use zbx_core::Id;
///
/// let id: Id = 42u64.into();
/// assert_eq!(id.to_string(), "42");
/// assert_eq!(id.as_u64(), Some(42));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// Numeric identifier, the only kind the client sends
    Number(u64),
    /// String identifier, tolerated on responses
    String(String),
    /// Null identifier, used by the server when the request was unreadable
    #[default]
    Null,
}

impl Id {
    /// Numeric value of this id, if it is one
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Id::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Number(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

/// Outgoing API request
///
/// # Examples
///
/// ```rust
/// use zbx_core::{ApiRequest, Id};
/// use serde_json::json;
///
/// let login = ApiRequest::new("user.login", json!({"username": "Admin"}), Id::Number(1));
/// assert!(login.auth.is_none());
///
/// let get = ApiRequest::new("host.get", json!({}), Id::Number(2)).with_auth("tok1");
/// assert_eq!(get.auth.as_deref(), Some("tok1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// API method, e.g. "hostgroup.get"
    pub method: String,
    /// Method parameters (object or array)
    pub params: serde_json::Value,
    /// Correlation id
    pub id: Id,
    /// Session token; omitted on the wire when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

impl ApiRequest {
    /// Create an unauthenticated request
    pub fn new(method: impl Into<String>, params: serde_json::Value, id: Id) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
            auth: None,
        }
    }

    /// Attach a session token
    pub fn with_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(token.into());
        self
    }
}

/// Incoming API response
///
/// Exactly one of `result` and `error` is present. The codec rejects bodies
/// that violate this, so a decoded value can be trusted to be one or the
/// other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Protocol version echoed by the server
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Method result, present on success (may itself be `null`)
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<serde_json::Value>,
    /// Error object, present on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorData>,
    /// Id of the request this answers
    #[serde(default)]
    pub id: Id,
}

fn default_version() -> String {
    "2.0".to_string()
}

/// Map a present field to `Some`, even when its value is JSON `null`
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl ApiResponse {
    /// Create a success response
    pub fn success(result: serde_json::Value, id: Id) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn error(error: ApiErrorData, id: Id) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Check if this is a success response
    pub fn is_success(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Consume the response, turning an embedded error into `Error::Api`
    pub fn into_result(self) -> Result<serde_json::Value> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(Error::Api(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(Error::InvalidResponse(
                "response has neither result nor error".to_string(),
            )),
        }
    }

    /// Render the full envelope (`jsonrpc`, `id`, `result`|`error`) as JSON
    pub fn into_value(self) -> serde_json::Value {
        let mut envelope = serde_json::Map::new();
        envelope.insert("jsonrpc".into(), serde_json::Value::String(self.jsonrpc));
        if let Some(result) = self.result {
            envelope.insert("result".into(), result);
        }
        if let Some(error) = self.error {
            // ApiErrorData only holds strings and integers
            let error = serde_json::to_value(error).unwrap_or(serde_json::Value::Null);
            envelope.insert("error".into(), error);
        }
        let id = match self.id {
            Id::Number(n) => serde_json::Value::from(n),
            Id::String(s) => serde_json::Value::String(s),
            Id::Null => serde_json::Value::Null,
        };
        envelope.insert("id".into(), id);
        serde_json::Value::Object(envelope)
    }
}
