//! Client for the Zabbix JSON-RPC API
//!
//! This crate turns the wire types from `zbx-core` into a usable client:
//!
//! - **Session**: endpoint, auth token and request-id counter, owned per
//!   client rather than per process
//! - **RPC core**: `ZabbixClient::invoke`, the one path every call takes
//!   (auth injection, id allocation, error-vs-success handling)
//! - **Resolvers**: host group and template names to ids
//! - **Entity helpers**: get/create/update/delete for hosts, users, actions,
//!   maintenances and discovery rules
//! - **Transport**: `reqwest` over HTTPS, replaceable through the
//!   `Transport` trait
//! - **Observability**: `tracing` throughout, OpenTelemetry metrics on demand
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use zbx_client::{Credentials, ResolveKind, ZabbixClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ZabbixClient::new("https://zabbix.example.com/api_jsonrpc.php")?;
//!     client.connect(None, Credentials::password("Admin", "zabbix")).await?;
//!
//!     let version = client.api_version().await?;
//!     println!("API version: {}", version);
//!
//!     // Names and ids can be mixed; ids pass through untouched
//!     let groups = client.resolve(ResolveKind::Group, &["10", "Linux servers"]).await?;
//!     println!("Group ids: {:?}", groups);
//!
//!     client.logout().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod client_builder;
mod entity;
mod metrics;
mod resolver;
mod session;
mod transport;

pub use client::{InvokeOptions, ZabbixClient, LOGIN_METHOD, LOGOUT_METHOD, VERSION_METHOD_PREFIX};
pub use client_builder::{ClientBuilder, ENV_PASSWORD, ENV_TOKEN, ENV_URL, ENV_USER};
pub use entity::{Entity, EntityApi, HostInterface, HostSpec};
pub use metrics::ClientMetrics;
pub use resolver::{is_numeric_id, ResolveKind};
pub use session::{CredentialProvider, Credentials, SecretCredential, Session};
pub use transport::{HttpTransport, Transport, DEFAULT_TIMEOUT, JSON_RPC_CONTENT_TYPE};
