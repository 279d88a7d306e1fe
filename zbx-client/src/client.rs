//! RPC core: one request out, one response back
//!
//! `ZabbixClient::invoke` is the single path every API call takes. It owns
//! the invariants that matter for a thin wrapper:
//!
//! - **Preconditions**: an endpoint must be set (`Configuration`), and every
//!   method except login, logout and `apiinfo.*` needs a token
//!   (`Authentication`). Both are checked before the transport is touched.
//! - **Correlation**: each call gets a fresh id from the session counter
//!   unless the caller forces one.
//! - **Auth injection**: the token is attached as `auth` wherever it is
//!   required, and on logout when one is held.
//! - **Outcome**: transport failures surface as `Transport`; an API error
//!   object is either raised as `Api` (strict mode) or handed back inside
//!   the envelope for the caller to inspect.
//!
//! # Cloning
//!
//! `ZabbixClient` is cheap to clone. Clones share the session, so a token
//! obtained through one clone is visible to all of them.

use crate::metrics::ClientMetrics;
use crate::session::{normalize_endpoint, Credentials, Session};
use crate::transport::{HttpTransport, Transport, DEFAULT_TIMEOUT};
use crate::ClientBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use zbx_core::{codec, ApiRequest, Error, Id, Result};

/// Method used to obtain a token
pub const LOGIN_METHOD: &str = "user.login";
/// Method used to end a session
pub const LOGOUT_METHOD: &str = "user.logout";
/// Prefix of the version-info methods, which never take a token
pub const VERSION_METHOD_PREFIX: &str = "apiinfo.";

/// Whether a method needs, tolerates or refuses the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthPolicy {
    /// Token must be present and is attached
    Required,
    /// Token is attached when held, but not required
    Optional,
    /// Token is never attached
    Exempt,
}

pub(crate) fn auth_policy(method: &str) -> AuthPolicy {
    if method == LOGIN_METHOD || method.starts_with(VERSION_METHOD_PREFIX) {
        AuthPolicy::Exempt
    } else if method == LOGOUT_METHOD {
        AuthPolicy::Optional
    } else {
        AuthPolicy::Required
    }
}

/// Per-call knobs for `ZabbixClient::invoke`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    /// Use this request id instead of the next one from the session counter
    pub force_id: Option<u64>,
    /// Return the whole response envelope instead of just `result`
    pub raw: bool,
    /// Turn an API error object into `Error::Api`
    pub throw_on_error: bool,
}

impl InvokeOptions {
    /// Options with `throw_on_error` set
    pub fn strict() -> Self {
        Self {
            throw_on_error: true,
            ..Self::default()
        }
    }

    /// Options with `raw` set
    pub fn raw() -> Self {
        Self {
            raw: true,
            ..Self::default()
        }
    }

    /// Force a specific request id
    pub fn with_id(mut self, id: u64) -> Self {
        self.force_id = Some(id);
        self
    }
}

/// Client for the Zabbix JSON-RPC API
#[derive(Clone)]
pub struct ZabbixClient {
    pub(crate) session: Arc<Session>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) metrics: Option<Arc<ClientMetrics>>,
}

impl ZabbixClient {
    /// Create a client for `endpoint` using the default HTTP transport
    ///
    /// The client starts without a token; call `connect` before anything
    /// other than `apiinfo.version`.
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self::with_transport(
            Session::with_endpoint(endpoint)?,
            Arc::new(HttpTransport::new(DEFAULT_TIMEOUT)?),
        ))
    }

    /// Create a client from an existing session and transport
    pub fn with_transport(session: Session, transport: Arc<dyn Transport>) -> Self {
        Self {
            session: Arc::new(session),
            transport,
            metrics: None,
        }
    }

    /// Start configuring a client
    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }

    /// The session this client reads its endpoint and token from
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Store the endpoint and authenticate
    ///
    /// - `endpoint`: new endpoint URL, or `None` to keep the current one
    /// - `Credentials::Token`: stored as-is, no network call
    /// - otherwise: `user.login` is called and the returned token stored
    ///
    /// # Errors
    ///
    /// `Configuration` when no endpoint is known or the credentials are
    /// incomplete; `Api`/`Transport` when the login call fails. On any
    /// error the session keeps its previous endpoint and token.
    pub async fn connect(&self, endpoint: Option<&str>, credentials: Credentials) -> Result<()> {
        // Nothing is stored until the new endpoint and token are both known
        let endpoint = match endpoint {
            Some(endpoint) => normalize_endpoint(endpoint)?,
            None => self.session.endpoint().await.ok_or_else(|| {
                Error::Configuration("no API endpoint configured".to_string())
            })?,
        };

        if let Credentials::Token(token) = &credentials {
            if token.is_empty() {
                return Err(Error::Configuration("auth token is empty".to_string()));
            }
            self.session.establish(endpoint, token.clone()).await;
            tracing::info!("Connected with supplied token");
            return Ok(());
        }

        let credential = credentials.login_pair()?;
        let result = self
            .invoke_at(
                Some(&endpoint),
                LOGIN_METHOD,
                json!({
                    "username": credential.username,
                    "password": credential.password,
                }),
                InvokeOptions::strict(),
            )
            .await?;

        let token = result
            .as_str()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                Error::InvalidResponse(format!("{} did not return a token", LOGIN_METHOD))
            })?;

        self.session.establish(endpoint, token.to_string()).await;
        tracing::info!(user = %credential.username, "Logged in");
        Ok(())
    }

    /// End the remote session and drop the local token
    ///
    /// Does nothing when no token is held. The token is dropped even if the
    /// logout call fails.
    pub async fn logout(&self) -> Result<()> {
        if !self.session.is_authenticated().await {
            return Ok(());
        }

        let result = self
            .invoke(LOGOUT_METHOD, json!([]), InvokeOptions::strict())
            .await;
        self.session.clear_token().await;
        tracing::info!("Logged out");
        result.map(|_| ())
    }

    /// Drop the local token without calling the API
    ///
    /// The endpoint is kept, so a later `connect(None, ..)` works.
    pub async fn disconnect(&self) {
        self.session.clear_token().await;
        tracing::debug!("Disconnected");
    }

    /// Whether a token is currently held
    pub async fn is_connected(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Version string of the remote API (`apiinfo.version`)
    pub async fn api_version(&self) -> Result<String> {
        self.call("apiinfo.version", json!([])).await
    }

    /// Call `method` in strict mode and deserialize the result
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params =
            serde_json::to_value(params).map_err(|e| Error::Serialization(e.to_string()))?;
        let result = self.invoke(method, params, InvokeOptions::strict()).await?;
        serde_json::from_value(result).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Send one API request and interpret its response
    ///
    /// Returns the `result` payload, or the whole envelope when
    /// `options.raw` is set. An API error object is returned inside the
    /// envelope unless `options.throw_on_error` is set, in which case it
    /// becomes `Error::Api`.
    pub async fn invoke(&self, method: &str, params: Value, options: InvokeOptions) -> Result<Value> {
        self.invoke_at(None, method, params, options).await
    }

    /// `invoke` against `endpoint` instead of the session's endpoint
    #[tracing::instrument(skip(self, endpoint, method, params, options), fields(method = %method, id = tracing::field::Empty))]
    async fn invoke_at(
        &self,
        endpoint: Option<&str>,
        method: &str,
        params: Value,
        options: InvokeOptions,
    ) -> Result<Value> {
        let start = Instant::now();
        let outcome = self.send(endpoint, method, params, options).await;

        if let Some(ref m) = self.metrics {
            let status = match &outcome {
                Ok(_) => "success",
                Err(_) => "error",
            };
            m.record_request(method, status, start.elapsed().as_secs_f64());
            if let Err(ref e) = outcome {
                m.record_error(e.kind());
            }
        }

        outcome
    }

    async fn send(
        &self,
        endpoint: Option<&str>,
        method: &str,
        params: Value,
        options: InvokeOptions,
    ) -> Result<Value> {
        let endpoint = match endpoint {
            Some(endpoint) => Some(endpoint.to_string()),
            None => self.session.endpoint().await,
        }
        .filter(|endpoint| !endpoint.is_empty())
        .ok_or_else(|| Error::Configuration("no API endpoint configured".to_string()))?;

        let auth = match auth_policy(method) {
            AuthPolicy::Exempt => None,
            AuthPolicy::Optional => self.session.token().await,
            AuthPolicy::Required => {
                let token = self
                    .session
                    .token()
                    .await
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| {
                        Error::Authentication(format!(
                            "{} requires an auth token; connect first",
                            method
                        ))
                    })?;
                Some(token)
            }
        };

        let id = options
            .force_id
            .unwrap_or_else(|| self.session.next_request_id());
        tracing::Span::current().record("id", id);

        let mut request = ApiRequest::new(method, params, Id::Number(id));
        if let Some(token) = auth {
            request = request.with_auth(token);
        }

        let body = codec::encode_request(&request)?;
        tracing::debug!("Sending request");

        let response_body = self.transport.post_json(&endpoint, body).await?;
        let response = codec::decode_response(&response_body)?;

        if response.id != Id::Null && response.id.as_u64() != Some(id) {
            tracing::warn!(response_id = %response.id, "Response id does not match request id");
        }

        if let Some(error) = &response.error {
            tracing::error!(code = error.code, message = %error.message, data = ?error.data, "API returned an error");
            if options.throw_on_error {
                return Err(Error::Api(error.clone()));
            }
            return Ok(response.into_value());
        }

        tracing::debug!("Request completed successfully");
        if options.raw {
            Ok(response.into_value())
        } else {
            response.into_result()
        }
    }
}

impl std::fmt::Debug for ZabbixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZabbixClient")
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_policy() {
        assert_eq!(auth_policy("user.login"), AuthPolicy::Exempt);
        assert_eq!(auth_policy("apiinfo.version"), AuthPolicy::Exempt);
        assert_eq!(auth_policy("user.logout"), AuthPolicy::Optional);
        assert_eq!(auth_policy("host.get"), AuthPolicy::Required);
        assert_eq!(auth_policy("user.get"), AuthPolicy::Required);
        // Prefix match only applies to apiinfo
        assert_eq!(auth_policy("user.login.extra"), AuthPolicy::Required);
    }

    #[test]
    fn test_invoke_options() {
        let defaults = InvokeOptions::default();
        assert!(defaults.force_id.is_none());
        assert!(!defaults.raw);
        assert!(!defaults.throw_on_error);

        let strict = InvokeOptions::strict().with_id(42);
        assert!(strict.throw_on_error);
        assert_eq!(strict.force_id, Some(42));

        assert!(InvokeOptions::raw().raw);
    }

    #[test]
    fn test_new_rejects_empty_endpoint() {
        assert!(matches!(ZabbixClient::new(""), Err(Error::Configuration(_))));
    }
}
