//! Session state: endpoint, auth token and request-id sequence
//!
//! A `Session` is owned by one `ZabbixClient` (and shared by its clones).
//! Separate clients get separate sessions, so several servers or users can be
//! driven from one process and tests never share state.
//!
//! # Lifecycle
//!
//! 1. **Created** empty, or with an endpoint from the builder
//! 2. **Connected**: endpoint set and token stored, either injected directly
//!    or obtained from `user.login`
//! 3. **Disconnected**: token cleared, endpoint kept for the next connect
//!
//! # Request IDs
//!
//! Ids come from an atomic counter starting at 1. They are never zero and
//! never handed out twice by the same session, even when calls run
//! concurrently from several tasks.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use zbx_core::{Error, Result};

/// Endpoint, token and id counter for one API session
#[derive(Debug)]
pub struct Session {
    endpoint: RwLock<Option<String>>,
    token: RwLock<Option<String>>,
    next_id: AtomicU64,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            endpoint: RwLock::new(None),
            token: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a session pointing at `endpoint`, without a token
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let mut session = Self::new();
        *session.endpoint.get_mut() = Some(normalize_endpoint(endpoint)?);
        Ok(session)
    }

    /// Current endpoint URL
    pub async fn endpoint(&self) -> Option<String> {
        self.endpoint.read().await.clone()
    }

    /// Replace the endpoint URL, trimming trailing slashes
    pub async fn set_endpoint(&self, endpoint: &str) -> Result<()> {
        let endpoint = normalize_endpoint(endpoint)?;
        *self.endpoint.write().await = Some(endpoint);
        Ok(())
    }

    /// Current auth token
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Store an auth token
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    /// Replace endpoint and token in one step
    ///
    /// Both locks are held while writing, so no call can observe the new
    /// endpoint paired with the old token.
    pub(crate) async fn establish(&self, endpoint: String, token: String) {
        let mut current_endpoint = self.endpoint.write().await;
        let mut current_token = self.token.write().await;
        *current_endpoint = Some(endpoint);
        *current_token = Some(token);
    }

    /// Drop the auth token; the endpoint is kept
    pub async fn clear_token(&self) {
        self.token.write().await.take();
    }

    /// Whether a non-empty token is held
    pub async fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .await
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    /// Allocate the next request id
    pub fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Configuration("API endpoint URL is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Username and password handed out by a credential store
///
/// The password never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretCredential {
    pub username: String,
    pub password: String,
}

impl SecretCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCredential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Source of login credentials (keyring, vault, prompt, ...)
pub trait CredentialProvider: Send + Sync {
    /// Produce a username and decrypted password
    fn credential(&self) -> Result<SecretCredential>;
}

impl CredentialProvider for SecretCredential {
    fn credential(&self) -> Result<SecretCredential> {
        Ok(self.clone())
    }
}

/// How to authenticate when connecting
#[derive(Clone)]
pub enum Credentials {
    /// Use this token as-is; no login call is made
    Token(String),
    /// Log in with a username and password
    Password { user: String, password: String },
    /// Log in with credentials from a provider
    Provider(Arc<dyn CredentialProvider>),
}

impl Credentials {
    /// Token credentials
    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token(token.into())
    }

    /// Username/password credentials
    pub fn password(user: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Resolve to a username/password pair for `user.login`
    ///
    /// Fails with `Error::Configuration` when either half is empty. Token
    /// credentials never reach this point.
    pub(crate) fn login_pair(&self) -> Result<SecretCredential> {
        let credential = match self {
            Credentials::Token(_) => {
                return Err(Error::Configuration(
                    "token credentials do not carry a username".to_string(),
                ))
            }
            Credentials::Password { user, password } => SecretCredential::new(user, password),
            Credentials::Provider(provider) => provider.credential()?,
        };

        if credential.username.is_empty() || credential.password.is_empty() {
            return Err(Error::Configuration(
                "username and password are required when no token is given".to_string(),
            ));
        }
        Ok(credential)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Credentials::Token(***)"),
            Credentials::Password { user, .. } => f
                .debug_struct("Credentials::Password")
                .field("user", user)
                .field("password", &"***")
                .finish(),
            Credentials::Provider(_) => f.write_str("Credentials::Provider(..)"),
        }
    }
}
