//! Session-token authentication.
//!
//! The extraction API authenticates with a session token from a login call.
//! The token is explicit process-scoped state with clear invalidation: it
//! lives behind a mutex, is invalidated on an authentication failure, and
//! each logical call re-authenticates at most once before escalating.

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use serde::Deserialize;
use terrasense_fetch::{FetchError, HttpClient};

// ============================================================================
// Session Token State
// ============================================================================

/// Process-scoped session token.
#[derive(Debug, Default)]
pub struct SessionTokenState {
    token: Mutex<Option<String>>,
}

impl SessionTokenState {
    /// Creates empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token, if any.
    pub async fn current(&self) -> Option<String> {
        self.token.lock().await.clone()
    }

    /// Replaces the token.
    pub async fn set(&self, token: String) {
        *self.token.lock().await = Some(token);
    }

    /// Drops the token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        debug!("Session token invalidated");
        *self.token.lock().await = None;
    }
}

// ============================================================================
// Login
// ============================================================================

/// Login endpoint response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Session authenticator for the extraction API.
///
/// Credentials are optional at construction so the rest of the pipeline can
/// run without them; the first call that actually needs a session escalates
/// `AuthenticationFailed` instead.
#[derive(Debug)]
pub(crate) struct SessionAuth {
    http: HttpClient,
    login_url: String,
    username: Option<String>,
    password: Option<String>,
    state: SessionTokenState,
}

impl SessionAuth {
    /// Creates an authenticator.
    pub fn new(
        http: HttpClient,
        endpoint: &str,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            http,
            login_url: format!("{endpoint}/login"),
            username,
            password,
            state: SessionTokenState::new(),
        }
    }

    /// Returns a session token, logging in if none is held.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` when the login call is rejected.
    pub async fn token(&self) -> Result<String, FetchError> {
        if let Some(token) = self.state.current().await {
            return Ok(token);
        }
        self.login().await
    }

    /// Drops the held token and logs in again. Called once per logical
    /// operation after an authentication failure; a second failure
    /// escalates.
    pub async fn refresh(&self) -> Result<String, FetchError> {
        self.state.invalidate().await;
        self.login().await
    }

    #[instrument(skip(self))]
    async fn login(&self) -> Result<String, FetchError> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            return Err(FetchError::AuthenticationFailed(
                "extraction API credentials not configured".to_string(),
            ));
        };

        debug!(url = %self.login_url, "Logging in to extraction API");

        let response: LoginResponse = self
            .http
            .post_empty_basic(&self.login_url, username, password)
            .await?;

        self.state.set(response.token.clone()).await;
        info!("Extraction API session established");
        Ok(response.token)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_starts_empty() {
        let state = SessionTokenState::new();
        assert!(state.current().await.is_none());
    }

    #[tokio::test]
    async fn test_set_and_invalidate() {
        let state = SessionTokenState::new();
        state.set("tok-1".to_string()).await;
        assert_eq!(state.current().await.as_deref(), Some("tok-1"));

        state.invalidate().await;
        assert!(state.current().await.is_none());
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"token": "abc123", "expiration": "2025-08-08T00:00:00Z"}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token, "abc123");
    }
}
