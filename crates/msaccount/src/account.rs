//! Refresh-token exchange and login state.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use crate::config::MsAccountConfig;
use crate::store::{TokenRecord, TokenStore, token_is_live};

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    /// Some providers rotate the refresh token on every grant.
    #[serde(default)]
    refresh_token: Option<String>,
}

/// OAuth client for a single authenticated user.
///
/// Wraps a [`TokenStore`] and exposes login state plus the refresh-token
/// grant. Session states are `LoggedOut` and `LoggedIn`; a successful
/// [`refresh`](Self::refresh) enters `LoggedIn`, and access-token expiry or a
/// failed refresh falls back to `LoggedOut`. The caller retries the refresh;
/// nothing here retries automatically.
pub struct MsAccountClient {
    http: reqwest::Client,
    config: MsAccountConfig,
    user_id: String,
    store: Box<dyn TokenStore + Send + Sync>,
}

impl std::fmt::Debug for MsAccountClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MsAccountClient")
            .field("user_id", &self.user_id)
            .field("token_endpoint", &self.config.token_endpoint)
            .finish_non_exhaustive()
    }
}

impl MsAccountClient {
    /// Creates a client for `user_id` backed by the given store.
    #[must_use]
    pub fn new(
        config: MsAccountConfig,
        store: Box<dyn TokenStore + Send + Sync>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            user_id: user_id.into(),
            store,
        }
    }

    /// The user this client authenticates for.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Persists a refresh token for the current user, overwriting any prior
    /// record.
    ///
    /// Any previously derived access token is dropped; the caller must
    /// [`refresh`](Self::refresh) before the session counts as logged in.
    pub fn store_refresh_token(&mut self, token: impl Into<String>) {
        self.store
            .put(TokenRecord::new(self.user_id.clone(), token.into()));
    }

    /// Exchanges the stored refresh token for a fresh access token.
    ///
    /// Returns `true` when the access token and expiry were updated. Every
    /// failure path (no stored token, transport error, non-2xx response,
    /// unparseable body) returns `false` and logs a warning; callers treat
    /// auth failure as a recoverable, checkable state rather than an error.
    ///
    /// A rejection from the token endpoint also drops any stored access
    /// token, so a failed refresh always lands in the logged-out state.
    /// Transport failures leave the stored token alone; a still-live session
    /// survives a network blip.
    pub async fn refresh(&mut self) -> bool {
        let Some(mut record) = self.store.get(&self.user_id) else {
            tracing::warn!(user_id = %self.user_id, "refresh requested with no stored refresh token");
            return false;
        };

        let mut form: HashMap<&str, String> = HashMap::new();
        form.insert("grant_type", "refresh_token".to_string());
        form.insert("refresh_token", record.refresh_token.trim().to_string());
        form.insert("client_id", self.config.client_id.trim().to_string());
        form.insert("client_secret", self.config.client_secret.trim().to_string());

        let response = match self
            .http
            .post(self.config.token_endpoint.trim())
            .form(&form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(user_id = %self.user_id, "token refresh request failed: {err}");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                user_id = %self.user_id,
                status = status.as_u16(),
                "token endpoint rejected refresh: {}",
                body.chars().take(240).collect::<String>()
            );
            // The provider rejected the grant; any stored access token no
            // longer represents a live session.
            record.access_token = None;
            record.expires_at = None;
            self.store.put(record);
            return false;
        }

        let tokens: TokenResponse = match response.json().await {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::warn!(user_id = %self.user_id, "token response was not valid JSON: {err}");
                return false;
            }
        };

        if tokens.access_token.trim().is_empty() {
            tracing::warn!(user_id = %self.user_id, "token response carried an empty access_token");
            return false;
        }

        record.access_token = Some(tokens.access_token);
        record.expires_at = Some(now_unix().saturating_add(tokens.expires_in));
        if let Some(rotated) = tokens
            .refresh_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            record.refresh_token = rotated.to_string();
        }
        self.store.put(record);

        tracing::debug!(user_id = %self.user_id, "access token refreshed");
        true
    }

    /// True iff a non-expired access token is stored for the current user.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.store
            .get(&self.user_id)
            .filter(|record| record.access_token.is_some())
            .is_some_and(|record| token_is_live(record.expires_at, now_unix()))
    }

    /// The live access token, or `None` when logged out.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.store
            .get(&self.user_id)
            .filter(|record| token_is_live(record.expires_at, now_unix()))
            .and_then(|record| record.access_token)
    }
}

/// Current wall-clock time in unix seconds.
fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::MemoryTokenStore;

    fn client_with_store(server: &MockServer, store: MemoryTokenStore) -> MsAccountClient {
        let mut config = MsAccountConfig::new("app-123", "s3cret");
        config.token_endpoint = format!("{}/oauth2/token", server.uri());
        MsAccountClient::new(config, Box::new(store), "user-1")
    }

    fn client_for(server: &MockServer) -> MsAccountClient {
        client_with_store(server, MemoryTokenStore::new())
    }

    #[tokio::test]
    async fn test_refresh_with_valid_token_logs_in() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=good-refresh"))
            .and(body_string_contains("client_id=app-123"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"access_token": "fresh-access", "expires_in": 3600}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.store_refresh_token("good-refresh");

        assert!(!client.is_logged_in());
        assert!(client.refresh().await);
        assert!(client.is_logged_in());
        assert_eq!(client.access_token().as_deref(), Some("fresh-access"));
    }

    #[tokio::test]
    async fn test_refresh_with_rejected_token_stays_logged_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_raw(
                r#"{"error": "invalid_grant"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.store_refresh_token("expired-refresh");

        assert!(!client.refresh().await);
        assert!(!client.is_logged_in());
        assert!(client.access_token().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_stored_token_returns_false() {
        let server = MockServer::start().await;
        let mut client = client_for(&server);

        assert!(!client.refresh().await);
        assert!(!client.is_logged_in());
    }

    #[tokio::test]
    async fn test_refresh_with_malformed_body_returns_false() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.store_refresh_token("good-refresh");

        assert!(!client.refresh().await);
        assert!(!client.is_logged_in());
    }

    #[tokio::test]
    async fn test_refresh_rotates_refresh_token_when_provided() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("refresh_token=first"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"access_token": "a1", "expires_in": 3600, "refresh_token": "rotated"}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("refresh_token=rotated"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"access_token": "a2", "expires_in": 3600}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.store_refresh_token("first");

        assert!(client.refresh().await);
        assert!(client.refresh().await);
        assert_eq!(client.access_token().as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn test_store_refresh_token_drops_prior_access_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"access_token": "fresh-access", "expires_in": 3600}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.store_refresh_token("good-refresh");
        assert!(client.refresh().await);
        assert!(client.is_logged_in());

        client.store_refresh_token("replacement");
        assert!(!client.is_logged_in());
        assert!(client.access_token().is_none());
    }

    #[tokio::test]
    async fn test_rejected_refresh_logs_out_a_live_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_raw(
                r#"{"error": "invalid_grant"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        // Logged in already, but the refresh token has been revoked.
        let mut record = TokenRecord::new("user-1", "revoked-refresh");
        record.access_token = Some("still-live".to_string());
        record.expires_at = Some(now_unix() + 3600);
        let mut store = MemoryTokenStore::new();
        store.put(record);

        let mut client = client_with_store(&server, store);
        assert!(client.is_logged_in());

        assert!(!client.refresh().await);
        assert!(!client.is_logged_in());
        assert!(client.access_token().is_none());
    }

    #[tokio::test]
    async fn test_expired_access_token_counts_as_logged_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"access_token": "short-lived", "expires_in": 0}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let mut client = client_for(&server);
        client.store_refresh_token("good-refresh");

        assert!(client.refresh().await);
        assert!(!client.is_logged_in());
        assert!(client.access_token().is_none());
    }
}
