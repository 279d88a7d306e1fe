//! zbx - client for the Zabbix JSON-RPC API
//!
//! Convenience crate re-exporting the zbx sub-crates.
//!
//! - **zbx-core**: wire types, codec, error taxonomy, observability
//! - **zbx-client**: session, RPC core, name resolvers, entity helpers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use zbx::{ClientBuilder, ResolveKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new("https://zabbix.example.com/api_jsonrpc.php")
//!         .token("0424bd59b807674191e7d77572075f33")
//!         .connect()
//!         .await?;
//!
//!     let templates = client
//!         .resolve(ResolveKind::Template, &["Linux by Zabbix agent"])
//!         .await?;
//!     println!("Template ids: {:?}", templates);
//!     Ok(())
//! }
//! ```

pub use zbx_client as client;
pub use zbx_core as core;

pub use zbx_client::{ClientBuilder, Credentials, InvokeOptions, ResolveKind, ZabbixClient};
pub use zbx_core::{Error, Result};
