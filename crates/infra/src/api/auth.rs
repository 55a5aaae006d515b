//! Provider authentication with automatic token lifecycle
//!
//! Manages the bearer-token lifecycle:
//! - In-memory cache, checked against the refresh margin
//! - Persisted-store fallback before paying for a network authentication
//! - `POST /authenticate` with client credentials
//! - Thread-safe refresh: one mutex guards all read/refresh paths, so
//!   concurrent callers never observe a half-updated token and at most one
//!   authentication request is issued when several discover expiry at once
//!
//! Store read/write failures are swallowed (best-effort cache);
//! authentication remains the source of truth.

use std::sync::Arc;

use async_trait::async_trait;
use prospectarc_core::ports::TokenStore;
use prospectarc_domain::constants::{DEFAULT_TOKEN_TTL_SECS, TOKEN_STORE_KEY};
use prospectarc_domain::{ApiToken, ProspectError, ProviderConfig, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid bearer value, authenticating if needed
    async fn access_token(&self) -> Result<String>;

    /// Discard any cached token and authenticate anew (used by the
    /// executor after a 401)
    async fn refresh_token(&self) -> Result<String>;
}

/// Bearer-token manager with cache, persisted fallback, and refresh
pub struct TokenManager {
    http: reqwest::Client,
    config: ProviderConfig,
    store: Arc<dyn TokenStore>,
    current: Mutex<Option<ApiToken>>,
}

impl TokenManager {
    /// # Errors
    /// Returns a `Config` error if the HTTP client cannot be constructed.
    pub fn new(config: ProviderConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ProspectError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config, store, current: Mutex::new(None) })
    }

    /// Get a token guaranteed non-expired at return time.
    ///
    /// # Errors
    /// `Auth` on invalid credentials (never retried); `Network`/`Api` if
    /// the authentication call itself fails.
    pub async fn get_token(&self) -> Result<ApiToken> {
        let mut current = self.current.lock().await;
        let margin = self.config.token_refresh_margin_secs;

        if let Some(token) = current.as_ref() {
            if !token.is_expired(margin) {
                return Ok(token.clone());
            }
        }

        // A still-valid persisted token avoids an unnecessary network
        // authentication
        if let Some(token) = self.load_persisted().await {
            if !token.is_expired(margin) {
                debug!("adopted persisted token");
                *current = Some(token.clone());
                return Ok(token);
            }
        }

        let token = self.authenticate().await?;
        self.persist(&token).await;
        *current = Some(token.clone());
        Ok(token)
    }

    async fn load_persisted(&self) -> Option<ApiToken> {
        match self.store.get(TOKEN_STORE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<ApiToken>(&raw) {
                Ok(token) => Some(token),
                Err(err) => {
                    warn!(error = %err, "persisted token is malformed; ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "token store read failed; authenticating instead");
                None
            }
        }
    }

    async fn persist(&self, token: &ApiToken) {
        let raw = match serde_json::to_string(token) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "token serialization failed; skipping persist");
                return;
            }
        };
        if let Err(err) = self.store.set(TOKEN_STORE_KEY, &raw).await {
            warn!(error = %err, "token store write failed; continuing without persist");
        }
    }

    /// Exchange client credentials for a fresh bearer token
    async fn authenticate(&self) -> Result<ApiToken> {
        info!("authenticating against provider");
        let url = format!("{}/authenticate", self.config.base_url);
        let body = json!({
            "clientId": self.config.client_id,
            "clientSecret": self.config.client_secret,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProspectError::Network(format!("authentication request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProspectError::Auth(format!("invalid credentials (status {status})")));
        }
        if !status.is_success() {
            return Err(ProspectError::Api {
                status: status.as_u16(),
                message: "authentication failed".into(),
            });
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| ProspectError::Parse(format!("invalid authentication response: {e}")))?;

        let value = parsed
            .get("token")
            .or_else(|| parsed.get("jwt"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProspectError::Parse("authentication response carried no token".into())
            })?;
        let ttl =
            parsed.get("expiresIn").and_then(Value::as_i64).unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        info!(ttl_secs = ttl, "authenticated");
        Ok(ApiToken::new(value.to_string(), ttl))
    }
}

#[async_trait]
impl AccessTokenProvider for TokenManager {
    async fn access_token(&self) -> Result<String> {
        Ok(self.get_token().await?.value)
    }

    async fn refresh_token(&self) -> Result<String> {
        let mut current = self.current.lock().await;
        let token = self.authenticate().await?;
        self.persist(&token).await;
        let value = token.value.clone();
        *current = Some(token);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::MemoryTokenStore;

    fn config(base_url: String) -> ProviderConfig {
        ProviderConfig::new(base_url, "client-id".into(), "client-secret".into())
    }

    fn auth_response(token: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "token": token, "expiresIn": 3600 }))
    }

    #[tokio::test]
    async fn test_token_reuse_issues_no_additional_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .and(body_partial_json(json!({ "clientId": "client-id" })))
            .respond_with(auth_response("jwt-1"))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let manager = TokenManager::new(config(server.uri()), store).unwrap();

        let first = manager.get_token().await.unwrap();
        let second = manager.get_token().await.unwrap();

        assert_eq!(first.value, "jwt-1");
        assert_eq!(second.value, "jwt-1");
    }

    #[tokio::test]
    async fn test_valid_persisted_token_skips_network_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(auth_response("unexpected"))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let persisted = ApiToken::new("persisted-jwt".into(), 3600);
        store
            .preload(TOKEN_STORE_KEY, &serde_json::to_string(&persisted).unwrap());

        let manager = TokenManager::new(config(server.uri()), store).unwrap();
        let token = manager.get_token().await.unwrap();

        assert_eq!(token.value, "persisted-jwt");
    }

    #[tokio::test]
    async fn test_expired_persisted_token_triggers_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(auth_response("fresh-jwt"))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        // 60s of life left is inside the 5-minute refresh margin
        let stale = ApiToken::new("stale-jwt".into(), 60);
        store.preload(TOKEN_STORE_KEY, &serde_json::to_string(&stale).unwrap());

        let manager = TokenManager::new(config(server.uri()), store.clone()).unwrap();
        let token = manager.get_token().await.unwrap();

        assert_eq!(token.value, "fresh-jwt");
        // The fresh token was persisted over the stale one
        let raw = store.get(TOKEN_STORE_KEY).await.unwrap().unwrap();
        let saved: ApiToken = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved.value, "fresh-jwt");
    }

    #[tokio::test]
    async fn test_invalid_credentials_raise_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let manager =
            TokenManager::new(config(server.uri()), Arc::new(MemoryTokenStore::new())).unwrap();

        let result = manager.get_token().await;
        assert!(matches!(result, Err(ProspectError::Auth(_))));
    }

    #[tokio::test]
    async fn test_store_failures_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(auth_response("jwt-1"))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::new().failing());
        let manager = TokenManager::new(config(server.uri()), store).unwrap();

        // Both the read and write fail, but authentication still succeeds
        let token = manager.get_token().await.unwrap();
        assert_eq!(token.value, "jwt-1");
    }

    #[tokio::test]
    async fn test_concurrent_callers_authenticate_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(auth_response("jwt-1"))
            .expect(1)
            .mount(&server)
            .await;

        let manager = Arc::new(
            TokenManager::new(config(server.uri()), Arc::new(MemoryTokenStore::new())).unwrap(),
        );

        let a = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.get_token().await }
        });
        let b = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.get_token().await }
        });

        assert_eq!(a.await.unwrap().unwrap().value, "jwt-1");
        assert_eq!(b.await.unwrap().unwrap().value, "jwt-1");
    }

    #[tokio::test]
    async fn test_refresh_token_replaces_cached_value() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(auth_response("jwt-next"))
            .mount(&server)
            .await;

        let manager =
            TokenManager::new(config(server.uri()), Arc::new(MemoryTokenStore::new())).unwrap();

        let refreshed = manager.refresh_token().await.unwrap();
        assert_eq!(refreshed, "jwt-next");
        assert_eq!(manager.get_token().await.unwrap().value, "jwt-next");
    }
}
