//! GitHub GraphQL client
//!
//! Provides a typed HTTP client for GitHub's GraphQL endpoint. Handles
//! authentication headers, the GraphQL response envelope, and retries of
//! rate-limited or failed requests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use revsync_github::client::GithubClient;
//! use revsync_github::queries;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = GithubClient::new("ghp_token");
//! let viewer: serde_json::Value = client
//!     .graphql(queries::VIEWER, serde_json::json!({}))
//!     .await?;
//! println!("{viewer}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::header::{RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use revsync_core::config::GithubConfig;

use crate::GithubError;

/// Public GitHub API root
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default number of retries for 429 and 5xx responses
const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff step when the server gives no `Retry-After`; doubles per attempt
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Longest `Retry-After` we are willing to honour
const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

const CLIENT_USER_AGENT: &str = concat!("revsync/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// GraphQL envelope
// ============================================================================

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

// ============================================================================
// GithubClient
// ============================================================================

/// HTTP client for GitHub GraphQL calls
///
/// Wraps `reqwest::Client` with bearer authentication, the `User-Agent`
/// GitHub requires, and base URL construction.
#[derive(Debug, Clone)]
pub struct GithubClient {
    /// The underlying HTTP client
    client: Client,
    /// API root; GraphQL requests go to `{base_url}/graphql`
    base_url: String,
    /// Personal access token or app token
    access_token: String,
    /// Retries on 429 / 5xx before giving up
    max_retries: u32,
    /// Backoff base when no `Retry-After` header is present
    retry_delay: Duration,
}

impl GithubClient {
    /// Creates a client for the public GitHub API
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, GITHUB_API_URL)
    }

    /// Creates a client with a custom API root (GitHub Enterprise, or a mock server in tests)
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Creates a client from the `github` configuration section
    ///
    /// # Errors
    /// Fails if the underlying HTTP client cannot be built.
    pub fn from_config(
        config: &GithubConfig,
        access_token: impl Into<String>,
    ) -> Result<Self, GithubError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            max_retries: config.max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Returns the API root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Creates an authenticated request builder for `path` under the API root
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }

    /// Runs a GraphQL document and deserializes its `data` member.
    ///
    /// Rate-limited (429) and server-error (5xx) responses are retried up to
    /// `max_retries` times, honouring `Retry-After` when present. A non-empty
    /// `errors` array fails the call even when partial data came back.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GithubError> {
        let body = GraphQlRequest { query, variables };
        let response = self.execute_with_retry(&body).await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(status_error(status, message));
        }

        let envelope: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| GithubError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        if !envelope.errors.is_empty() {
            return Err(graphql_error(envelope.errors));
        }

        envelope
            .data
            .ok_or_else(|| GithubError::InvalidResponse("response has no data".to_string()))
    }

    /// Sends `body` to the GraphQL endpoint, retrying 429 and 5xx responses.
    ///
    /// Returns the final response, which may itself be an error status when
    /// it is not retryable.
    async fn execute_with_retry(&self, body: &GraphQlRequest<'_>) -> Result<Response, GithubError> {
        for attempt in 0..=self.max_retries {
            let response = self.request(Method::POST, "/graphql").json(body).send().await?;
            let status = response.status();

            if !is_retryable_status(status) {
                if attempt > 0 {
                    info!(attempt, "Request succeeded after retry");
                }
                return Ok(response);
            }

            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(|v| parse_retry_after(v, self.backoff(attempt)))
                .unwrap_or_else(|| self.backoff(attempt));

            if attempt >= self.max_retries {
                warn!(
                    status = status.as_u16(),
                    attempts = attempt + 1,
                    "Retry limit exhausted"
                );
                return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                    GithubError::TooManyRequests { retry_after }
                } else {
                    let message = response.text().await.unwrap_or_default();
                    GithubError::ServerError(format!("{status}: {message}"))
                });
            }

            info!(
                status = status.as_u16(),
                attempt,
                retry_after_ms = retry_after.as_millis() as u64,
                "Retryable response, backing off"
            );
            tokio::time::sleep(retry_after).await;
        }

        Err(GithubError::ServerError(
            "retry loop exited unexpectedly".to_string(),
        ))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Maps a non-retryable error status to a [`GithubError`]
fn status_error(status: StatusCode, message: String) -> GithubError {
    debug!(status = status.as_u16(), "GitHub returned error status");
    match status {
        StatusCode::UNAUTHORIZED => GithubError::Unauthorized(message),
        StatusCode::FORBIDDEN => GithubError::Forbidden(message),
        StatusCode::NOT_FOUND => GithubError::NotFound(message),
        _ => GithubError::InvalidResponse(format!("{status}: {message}")),
    }
}

fn graphql_error(errors: Vec<GraphQlErrorEntry>) -> GithubError {
    let not_found = errors
        .iter()
        .any(|e| e.kind.as_deref() == Some("NOT_FOUND"));
    let message = errors
        .into_iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ");

    if not_found {
        GithubError::NotFound(message)
    } else {
        GithubError::GraphQl(message)
    }
}

/// Parses a `Retry-After` header value (delta-seconds or HTTP-date).
///
/// Falls back to `default` for unparseable values and for dates in the past
/// or more than an hour ahead.
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Duration::from_secs(seconds).min(MAX_RETRY_AFTER);
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let wait = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        if let Ok(wait) = wait.to_std() {
            if wait <= MAX_RETRY_AFTER {
                return wait;
            }
        }
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_auth_and_user_agent() {
        let client = GithubClient::new("test-token");
        let request = client.request(Method::POST, "/graphql").build().unwrap();

        assert_eq!(request.url().as_str(), "https://api.github.com/graphql");
        let auth = request.headers().get("authorization").unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer test-token");
        let agent = request.headers().get("user-agent").unwrap();
        assert!(agent.to_str().unwrap().starts_with("revsync/"));
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let client = GithubClient::with_base_url("token", "http://localhost:8080/api/");
        let request = client.request(Method::POST, "/graphql").build().unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:8080/api/graphql");
    }

    #[test]
    fn from_config_copies_settings() {
        let config = GithubConfig {
            api_url: "https://ghe.example.com/api".into(),
            max_retries: 7,
            ..GithubConfig::default()
        };
        let client = GithubClient::from_config(&config, "t").unwrap();
        assert_eq!(client.base_url(), "https://ghe.example.com/api");
        assert_eq!(client.max_retries(), 7);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let client = GithubClient::new("t").with_retry_delay(Duration::from_millis(100));
        assert_eq!(client.backoff(0), Duration::from_millis(100));
        assert_eq!(client.backoff(1), Duration::from_millis(200));
        assert_eq!(client.backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn parse_retry_after_seconds() {
        let default = Duration::from_secs(9);
        assert_eq!(parse_retry_after("2", default), Duration::from_secs(2));
        assert_eq!(parse_retry_after(" 0 ", default), Duration::ZERO);
        assert_eq!(parse_retry_after("999999", default), MAX_RETRY_AFTER);
    }

    #[test]
    fn parse_retry_after_garbage_uses_default() {
        let default = Duration::from_secs(9);
        assert_eq!(parse_retry_after("soon", default), default);
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", default),
            default
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "Bad credentials".into()),
            GithubError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, String::new()),
            GithubError::Forbidden(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, String::new()),
            GithubError::InvalidResponse(_)
        ));
    }

    #[test]
    fn graphql_errors_are_joined() {
        let err = graphql_error(vec![
            GraphQlErrorEntry {
                message: "first".into(),
                kind: None,
            },
            GraphQlErrorEntry {
                message: "second".into(),
                kind: Some("FORBIDDEN".into()),
            },
        ]);
        assert_eq!(err.to_string(), "GraphQL error: first; second");
    }

    #[test]
    fn graphql_not_found_is_classified() {
        let err = graphql_error(vec![GraphQlErrorEntry {
            message: "Could not resolve to a PullRequest with the number of 999.".into(),
            kind: Some("NOT_FOUND".into()),
        }]);
        assert!(matches!(err, GithubError::NotFound(_)));
    }

    #[test]
    fn envelope_with_errors_and_no_data() {
        let json = r#"{"data": null, "errors": [{"message": "boom"}]}"#;
        let parsed: GraphQlResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors.len(), 1);
    }
}
