//! OAuth2 token authentication against an OpenID Connect realm.
//!
//! Tokens are fetched with either the `password` or the `client_credentials`
//! grant and cached until their advertised lifetime has passed. The cache is
//! guarded by an async mutex held across the fetch, so callers that observe a
//! stale token at the same time share a single token request.

use super::{AttachmentMode, AuthStrategy, Credential};
use crate::config::token_endpoint;
use crate::error::{AuthError, body_excerpt};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// OAuth2 grant used to obtain tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// Resource owner password grant
    Password,
    /// Service-to-service grant
    ClientCredentials,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
        }
    }
}

/// Cached token state.
#[derive(Debug, Clone)]
enum TokenState {
    Unset,
    Cached { token: String, expires_at: Instant },
}

impl TokenState {
    /// The cached token, unless it expired strictly before `now`.
    fn fresh_token(&self, now: Instant) -> Option<&str> {
        match self {
            Self::Cached { token, expires_at } if now <= *expires_at => Some(token.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Bearer token authentication with automatic renewal.
pub struct TokenAuth {
    endpoint_uri: String,
    realm: String,
    client_id: String,
    client_secret: String,
    username: Option<String>,
    password: Option<String>,
    http: reqwest::Client,
    state: Mutex<TokenState>,
}

impl TokenAuth {
    /// Create a strategy using the client credentials grant.
    pub fn new(
        endpoint_uri: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_uri: endpoint_uri.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: None,
            password: None,
            http: reqwest::Client::new(),
            state: Mutex::new(TokenState::Unset),
        }
    }

    /// Switch to the password grant for the given user.
    pub fn with_password(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Use a preconfigured HTTP client for token requests.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Grant type selected by the configured credentials.
    pub fn grant_type(&self) -> GrantType {
        if self.password.is_some() {
            GrantType::Password
        } else {
            GrantType::ClientCredentials
        }
    }

    pub fn token_endpoint(&self) -> String {
        token_endpoint(&self.endpoint_uri, &self.realm)
    }

    /// Expiry of the cached token, if one has been fetched.
    pub async fn expires_at(&self) -> Option<Instant> {
        match &*self.state.lock().await {
            TokenState::Cached { expires_at, .. } => Some(*expires_at),
            TokenState::Unset => None,
        }
    }

    /// Return the cached token, fetching a new one first if none is cached or
    /// the cached one expired strictly before `now`.
    pub async fn refresh_if_stale(&self, now: Instant) -> Result<String, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.fresh_token(now) {
            return Ok(token.to_string());
        }

        let response = self.fetch().await?;
        // Unrepresentable lifetimes are treated as already expired.
        let expires_at = now
            .checked_add(Duration::from_secs(response.expires_in))
            .unwrap_or(now);
        debug!(
            "Access token for realm {} valid for {}s",
            self.realm, response.expires_in
        );

        *state = TokenState::Cached {
            token: response.access_token.clone(),
            expires_at,
        };
        Ok(response.access_token)
    }

    fn form(&self) -> Vec<(&'static str, &str)> {
        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", self.grant_type().as_str()),
        ];
        if let Some(password) = self.password.as_deref() {
            if let Some(username) = self.username.as_deref() {
                form.push(("username", username));
            }
            form.push(("password", password));
        }
        form
    }

    async fn fetch(&self) -> Result<TokenResponse, AuthError> {
        debug!(
            "Requesting access token for realm {} ({} grant)",
            self.realm,
            self.grant_type().as_str()
        );

        let response = self
            .http
            .post(self.token_endpoint())
            .form(&self.form())
            .send()
            .await
            .map_err(AuthError::Request)?;

        let status = response.status();
        let body = response.bytes().await.map_err(AuthError::Request)?;
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status,
                body_excerpt: body_excerpt(&body),
            });
        }

        serde_json::from_slice(&body).map_err(AuthError::Malformed)
    }
}

impl fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuth")
            .field("endpoint_uri", &self.endpoint_uri)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("grant_type", &self.grant_type())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthStrategy for TokenAuth {
    fn attachment_mode(&self) -> AttachmentMode {
        AttachmentMode::BearerHeader
    }

    async fn produce_credential(&self) -> Result<Credential, AuthError> {
        let token = self.refresh_if_stale(Instant::now()).await?;
        Ok(Credential::Bearer(token))
    }
}
