//! Core types for talking to the Zabbix JSON-RPC API
//!
//! This crate holds everything that does not depend on a transport:
//!
//! - **Types**: request and response envelopes, including the `auth` member
//! - **Codec**: encoding requests and validating decoded responses
//! - **Error handling**: the error taxonomy shared by all zbx crates
//! - **Observability**: `tracing` subscriber and OpenTelemetry setup
//!
//! The `zbx-client` crate builds the session, RPC core and name resolvers on
//! top of it.
//!
//! # Example
//!
//! ```rust
//! use zbx_core::{codec, ApiRequest, Id};
//!
//! let request = ApiRequest::new("hostgroup.get", serde_json::json!({"output": "extend"}), Id::Number(1))
//!     .with_auth("0424bd59b807674191e7d77572075f33");
//! let body = codec::encode_request(&request).unwrap();
//! assert!(body.contains("\"auth\""));
//! ```

pub mod codec;
pub mod error;
pub mod observability;
pub mod types;

pub use error::{ApiErrorData, Error, Result};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{ApiRequest, ApiResponse, Id};
