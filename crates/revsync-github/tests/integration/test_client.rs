//! Integration tests for GithubClient transport behavior
//!
//! Covers retries on 429 and 5xx responses, retry exhaustion, and
//! mapping of error statuses.

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use revsync_github::{GithubClient, GithubError};

fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::with_base_url("test-token", server.uri())
        .with_retry_delay(Duration::from_millis(1))
        .with_max_retries(2)
}

async fn mount_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "viewer": { "login": "alice" } }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "ok": true }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data: serde_json::Value = client_for(&server)
        .graphql("query { ok }", serde_json::json!({}))
        .await
        .unwrap();
    assert_eq!(data["ok"], true);
}

#[tokio::test]
async fn test_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_success(&server).await;

    let data: serde_json::Value = client_for(&server)
        .graphql("query { viewer { login } }", serde_json::json!({}))
        .await
        .unwrap();

    assert_eq!(data["viewer"]["login"], "alice");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_retries_rate_limit_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_success(&server).await;

    let result: Result<serde_json::Value, GithubError> = client_for(&server)
        .graphql("query { viewer { login } }", serde_json::json!({}))
        .await;

    assert!(result.is_ok());
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_retry_limit_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .graphql::<serde_json::Value>("query { x }", serde_json::json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, GithubError::ServerError(_)));
    // First attempt plus two retries
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_rate_limit_exhausted_reports_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .with_max_retries(0)
        .graphql::<serde_json::Value>("query { x }", serde_json::json!({}))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GithubError::TooManyRequests { retry_after } if retry_after == Duration::ZERO
    ));
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .graphql::<serde_json::Value>("query { x }", serde_json::json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, GithubError::Unauthorized(ref m) if m == "Bad credentials"));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .graphql::<serde_json::Value>("query { x }", serde_json::json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, GithubError::InvalidResponse(_)));
}
