//! Client builder for endpoint, credentials, timeout and observability
//!
//! # Examples
//!
//! ```rust,no_run
//! use zbx_client::ClientBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> zbx_core::Result<()> {
//! // Token auth, no login call
//! let client = ClientBuilder::new("https://zabbix.example.com/api_jsonrpc.php")
//!     .token("0424bd59b807674191e7d77572075f33")
//!     .connect()
//!     .await?;
//!
//! // Username/password from the environment, with metrics
//! let client2 = ClientBuilder::from_env()
//!     .timeout(Duration::from_secs(10))
//!     .with_default_observability()
//!     .service_name("inventory-sync")
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! `from_env` reads:
//! - `ZABBIX_API_URL`: endpoint URL
//! - `ZABBIX_API_TOKEN`: token (takes precedence over user/password)
//! - `ZABBIX_API_USER` / `ZABBIX_API_PASSWORD`: login credentials

use crate::session::{CredentialProvider, Credentials, Session};
use crate::transport::{HttpTransport, Transport, DEFAULT_TIMEOUT};
use crate::ZabbixClient;
use std::sync::Arc;
use std::time::Duration;
use zbx_core::{Error, Result};

pub const ENV_URL: &str = "ZABBIX_API_URL";
pub const ENV_TOKEN: &str = "ZABBIX_API_TOKEN";
pub const ENV_USER: &str = "ZABBIX_API_USER";
pub const ENV_PASSWORD: &str = "ZABBIX_API_PASSWORD";

/// Builder for configuring and creating a `ZabbixClient`
pub struct ClientBuilder {
    endpoint: Option<String>,
    credentials: Option<Credentials>,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
    observability_config: Option<zbx_core::ObservabilityConfig>,
    service_name: Option<String>,
}

impl ClientBuilder {
    /// Create a builder for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            transport: None,
            observability_config: None,
            service_name: None,
        }
    }

    /// Create a builder from `ZABBIX_API_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a builder from any key lookup (environment, config map, ...)
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let credentials = match (get(ENV_TOKEN), get(ENV_USER), get(ENV_PASSWORD)) {
            (Some(token), _, _) => Some(Credentials::Token(token)),
            (None, Some(user), Some(password)) => Some(Credentials::Password { user, password }),
            _ => None,
        };

        Self {
            endpoint: get(ENV_URL),
            credentials,
            timeout: DEFAULT_TIMEOUT,
            transport: None,
            observability_config: None,
            service_name: None,
        }
    }

    /// Per-request HTTP timeout (default 30s); ignored with a custom transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Authenticate with an existing token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Token(token.into()));
        self
    }

    /// Authenticate with username and password
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::password(user, password));
        self
    }

    /// Authenticate with credentials from a provider
    pub fn credential_provider(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(Credentials::Provider(provider));
        self
    }

    /// Use a custom transport instead of HTTP
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: zbx_core::ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(zbx_core::ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the client without authenticating
    pub fn build(self) -> Result<ZabbixClient> {
        self.build_parts().map(|(client, _)| client)
    }

    /// Build the client and connect with the configured credentials
    pub async fn connect(self) -> Result<ZabbixClient> {
        let (client, credentials) = self.build_parts()?;
        let credentials = credentials
            .ok_or_else(|| Error::Configuration("no token or credentials configured".to_string()))?;
        client.connect(None, credentials).await?;
        Ok(client)
    }

    fn build_parts(self) -> Result<(ZabbixClient, Option<Credentials>)> {
        let session = match self.endpoint.as_deref() {
            Some(endpoint) => Session::with_endpoint(endpoint)?,
            None => Session::new(),
        };

        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            zbx_core::init_observability(config.clone()).map_err(|e| {
                Error::Configuration(format!("Failed to initialize observability: {}", e))
            })?;

            Some(Arc::new(crate::ClientMetrics::new(&config.service_name)))
        } else {
            None
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.timeout)?),
        };

        let mut client = ZabbixClient::with_transport(session, transport);
        client.metrics = metrics;

        tracing::debug!(endpoint = ?self.endpoint, "Client built");
        Ok((client, self.credentials))
    }
}
