//! revsync GitHub - GraphQL review gateway
//!
//! Provides async access to pull request review threads on GitHub:
//! - Paginated thread listing with comments and reactions
//! - Pending thread creation and review submission
//! - Replies, resolution, comment edits/deletes and reactions
//!
//! ## Modules
//!
//! - [`client`] - Authenticated GraphQL HTTP client with retry handling
//! - [`queries`] - GraphQL documents sent by the gateway
//! - [`provider`] - `IReviewGateway` implementation

pub mod client;
pub mod provider;
pub mod queries;

use std::time::Duration;

use thiserror::Error;

pub use client::GithubClient;
pub use provider::GithubReviewGateway;

/// Errors that can occur when communicating with the GitHub API
#[derive(Debug, Error)]
pub enum GithubError {
    /// The token is missing, invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The token lacks the scopes required for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The repository, pull request, thread or comment does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded and retries exhausted
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration the server asked us to wait
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx) and retries were exhausted
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The GraphQL endpoint answered with an `errors` array
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response could not be parsed or lacked expected data
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GithubError {
    /// Whether repeating the request may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TooManyRequests { .. } | Self::ServerError(_) | Self::NetworkError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(GithubError::ServerError("502".into()).is_retryable());
        assert!(GithubError::TooManyRequests {
            retry_after: Duration::from_secs(1)
        }
        .is_retryable());
        assert!(!GithubError::Unauthorized("bad token".into()).is_retryable());
        assert!(!GithubError::GraphQl("Could not resolve".into()).is_retryable());
    }
}
