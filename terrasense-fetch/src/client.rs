//! Resilient HTTP client.
//!
//! One logical fetch against one upstream provider: attempt the call, and on
//! failure classify the error. Terminal failures return immediately;
//! retryable failures sleep according to the injected [`RetryPolicy`] and
//! try again until the attempt budget is spent. Both provider adapters use
//! this client identically.

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::retry::RetryPolicy;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What a failed attempt tells us about trying again.
enum AttemptFailure {
    /// Worth another attempt if budget remains.
    Retryable {
        reason: String,
        retry_after: Option<u64>,
    },
    /// Retrying cannot help; escalate immediately.
    Terminal(FetchError),
}

/// HTTP client with bounded retries and backoff.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Creates a new client with default settings.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the underlying client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the underlying client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("terrasense/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: client,
            retry: RetryPolicy::default(),
        })
    }

    /// Sets the retry policy for this client.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Performs a GET returning parsed JSON.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`] for the failure classification.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<T, FetchError> {
        let response = self
            .execute(url, || {
                let mut req = self.inner.get(url).query(query);
                if let Some(token) = bearer {
                    req = req.bearer_auth(token);
                }
                req
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Performs a POST with a JSON body, returning parsed JSON.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`] for the failure classification.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<T, FetchError> {
        let response = self
            .execute(url, || {
                let mut req = self.inner.post(url).json(body);
                if let Some(token) = bearer {
                    req = req.bearer_auth(token);
                }
                req
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Performs an empty POST with HTTP Basic credentials, returning parsed
    /// JSON. Used by session-token login endpoints.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`] for the failure classification.
    pub async fn post_empty_basic<T: DeserializeOwned>(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<T, FetchError> {
        let response = self
            .execute(url, || {
                self.inner
                    .post(url)
                    .basic_auth(username, Some(password))
                    .header(reqwest::header::CONTENT_LENGTH, 0)
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Performs a GET returning the raw body bytes.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`] for the failure classification.
    pub async fn get_bytes(&self, url: &str, bearer: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let response = self
            .execute(url, || {
                let mut req = self.inner.get(url);
                if let Some(token) = bearer {
                    req = req.bearer_auth(token);
                }
                req
            })
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Runs one logical request through the retry loop.
    ///
    /// Classification:
    /// - success status: returned as-is
    /// - 401/403: `AuthenticationFailed`, never retried
    /// - 400/404/other 4xx: `TerminalRequest`, never retried
    /// - 429: retried, honoring `Retry-After`; escalates as `RateLimited`
    /// - 5xx, connect failures, timeouts: retried; escalates as
    ///   `TransientProvider` with the attempt count
    async fn execute(
        &self,
        url: &str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<Response, FetchError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(url = %url, attempt, "Sending request");

            let failure = match build().send().await {
                Ok(response) => match Self::classify_response(response) {
                    Ok(response) => return Ok(response),
                    Err(failure) => failure,
                },
                Err(e) if e.is_connect() || e.is_timeout() => AttemptFailure::Retryable {
                    reason: e.to_string(),
                    retry_after: None,
                },
                Err(e) => AttemptFailure::Terminal(e.into()),
            };

            match failure {
                AttemptFailure::Terminal(error) => {
                    warn!(url = %url, attempt, class = error.class(), error = %error, "Terminal failure");
                    return Err(error);
                }
                AttemptFailure::Retryable {
                    reason,
                    retry_after,
                } => {
                    if attempt >= max_attempts {
                        warn!(url = %url, attempts = attempt, reason = %reason, "Retry budget exhausted");
                        return Err(match retry_after {
                            Some(secs) => FetchError::RateLimited {
                                retry_after: Some(secs),
                            },
                            None => FetchError::TransientProvider {
                                reason,
                                attempts: attempt,
                            },
                        });
                    }

                    let delay = retry_after
                        .map(Duration::from_secs)
                        .unwrap_or_else(|| self.retry.delay_for_attempt(attempt));
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Splits a response into success, terminal failure, or retryable failure.
    fn classify_response(response: Response) -> Result<Response, AttemptFailure> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttemptFailure::Terminal(FetchError::AuthenticationFailed(
                format!("HTTP {status}"),
            )));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(AttemptFailure::Retryable {
                reason: "HTTP 429".to_string(),
                retry_after,
            });
        }

        if status.is_client_error() {
            return Err(AttemptFailure::Terminal(FetchError::TerminalRequest(
                format!("HTTP {status}"),
            )));
        }

        // 5xx and anything else unexpected.
        Err(AttemptFailure::Retryable {
            reason: format!("HTTP {status}"),
            retry_after: None,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.retry.max_attempts, 3);
    }

    #[test]
    fn test_policy_injection() {
        let client = HttpClient::new()
            .unwrap()
            .with_retry_policy(RetryPolicy::no_retry());
        assert_eq!(client.retry.max_attempts, 1);
    }

    #[tokio::test]
    async fn test_connect_failure_exhausts_budget() {
        // Nothing listens on this port; connect errors are retryable and the
        // budget must be spent before escalation.
        let client = HttpClient::with_timeout(Duration::from_millis(500))
            .unwrap()
            .with_retry_policy(
                RetryPolicy::new(2).with_base_delay(Duration::from_millis(1)),
            );

        let result: Result<serde_json::Value, _> = client
            .get_json("http://127.0.0.1:9/unreachable", &[], None)
            .await;

        match result {
            Err(FetchError::TransientProvider { attempts, .. }) => assert_eq!(attempts, 2),
            Err(FetchError::Http(e)) => assert!(e.is_connect() || e.is_timeout()),
            other => panic!("expected transient failure, got {other:?}"),
        }
    }
}
