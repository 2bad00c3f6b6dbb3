//! Shared test helpers for GitHub GraphQL integration tests
//!
//! Provides wiremock-based mock server setup. Every GraphQL call is a
//! `POST /graphql`, so mocks are told apart by a fragment of the document
//! they carry.

use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use revsync_github::{GithubClient, GithubReviewGateway};

/// Starts a mock server and returns a gateway for `octo/widgets` pointing at it.
///
/// Retries back off for 1 ms so retry tests stay fast.
pub async fn setup_gateway() -> (MockServer, GithubReviewGateway) {
    let server = MockServer::start().await;
    let client = GithubClient::with_base_url("test-token", server.uri())
        .with_retry_delay(Duration::from_millis(1));
    let gateway = GithubReviewGateway::new(client, "octo", "widgets");
    (server, gateway)
}

/// Mounts a GraphQL response for requests whose body contains `fragment`
pub async fn mount_graphql(server: &MockServer, fragment: &str, data: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains(fragment))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data })))
        .mount(server)
        .await;
}

/// A review comment node as GitHub returns it
pub fn comment_node(id: &str, login: &str, body: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "body": body,
        "createdAt": "2026-02-01T12:00:00Z",
        "author": { "login": login },
        "reactionGroups": [
            { "content": "THUMBS_UP", "reactors": { "totalCount": 0 } }
        ]
    })
}

/// A review thread node with the given comments
pub fn thread_node(
    id: &str,
    path: &str,
    line: u32,
    comments: Vec<serde_json::Value>,
) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "path": path,
        "line": line,
        "originalLine": line,
        "startLine": null,
        "originalStartLine": null,
        "diffSide": "RIGHT",
        "isResolved": false,
        "isOutdated": false,
        "comments": {
            "pageInfo": { "hasNextPage": false },
            "nodes": comments
        }
    })
}

/// `data` for one page of review threads
pub fn threads_page(
    nodes: Vec<serde_json::Value>,
    next_cursor: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "repository": {
            "pullRequest": {
                "reviewThreads": {
                    "pageInfo": {
                        "hasNextPage": next_cursor.is_some(),
                        "endCursor": next_cursor
                    },
                    "nodes": nodes
                }
            }
        }
    })
}
