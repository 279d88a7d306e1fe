//! Encoding and decoding of API envelopes
//!
//! Serde does the heavy lifting; this module adds the checks serde cannot
//! express on its own:
//!
//! - a response must carry `result` or `error`, never both and never neither
//! - a body that is not JSON, or not an object, is an `InvalidResponse`
//!   rather than a serialization error, so callers can tell a broken server
//!   apart from a broken caller
//!
//! # Examples
//!
//! ```rust
//! use zbx_core::{codec, ApiRequest, Id};
//!
//! let request = ApiRequest::new("apiinfo.version", serde_json::json!([]), Id::Number(1));
//! let body = codec::encode_request(&request).unwrap();
//! assert!(body.contains("\"method\":\"apiinfo.version\""));
//!
//! let response = codec::decode_response(r#"{"jsonrpc":"2.0","result":"7.0.0","id":1}"#).unwrap();
//! assert_eq!(response.result, Some(serde_json::json!("7.0.0")));
//! ```

use crate::error::{Error, Result};
use crate::types::{ApiRequest, ApiResponse};
use serde::Serialize;

/// Encode any serializable value to a JSON string
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a request to its wire form
pub fn encode_request(request: &ApiRequest) -> Result<String> {
    encode(request)
}

/// Decode a response body
///
/// # Errors
///
/// Returns `Error::InvalidResponse` when the body is not JSON, not an
/// object, or violates the result-xor-error rule.
pub fn decode_response(data: &str) -> Result<ApiResponse> {
    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| Error::InvalidResponse(format!("body is not JSON: {}", e)))?;

    let Some(object) = value.as_object() else {
        return Err(Error::InvalidResponse(
            "response is not a JSON object".to_string(),
        ));
    };

    match (object.contains_key("result"), object.contains_key("error")) {
        (true, true) => {
            return Err(Error::InvalidResponse(
                "response carries both result and error".to_string(),
            ))
        }
        (false, false) => {
            return Err(Error::InvalidResponse(
                "response carries neither result nor error".to_string(),
            ))
        }
        _ => {}
    }

    serde_json::from_value(value).map_err(|e| Error::InvalidResponse(e.to_string()))
}
