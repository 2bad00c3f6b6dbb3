//! Integration tests for review mutations and identity queries
//!
//! Each test mounts the single mutation it exercises with `expect(1)`, so
//! the mock server verifies on drop that exactly one request was sent.

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use revsync_core::domain::{
    CommentId, DiffSide, FilePath, ReactionKind, ReviewId, ReviewNodeId, ThreadId,
};
use revsync_core::ports::{IReviewGateway, PendingThreadRequest};

use crate::common;

/// Mounts a mutation matched on every fragment, expecting exactly one call
async fn expect_mutation(
    server: &wiremock::MockServer,
    fragments: &[&str],
    data: serde_json::Value,
) {
    let mut mock = Mock::given(method("POST")).and(path("/graphql"));
    for fragment in fragments {
        mock = mock.and(body_string_contains(*fragment));
    }
    mock.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_pending_thread_returns_thread_id() {
    let (server, gateway) = common::setup_gateway().await;

    expect_mutation(
        &server,
        &[
            "addPullRequestReviewThread",
            r#""pullRequestId":"PR_kw1""#,
            r#""path":"src/lib.rs""#,
            r#""startLine":3"#,
            r#""side":"LEFT""#,
        ],
        serde_json::json!({
            "addPullRequestReviewThread": { "thread": { "id": "PRRT_new" } }
        }),
    )
    .await;

    let request = PendingThreadRequest {
        review_node_id: ReviewNodeId::new("PR_kw1").unwrap(),
        path: FilePath::new("./src/lib.rs"),
        line: 5,
        start_line: Some(3),
        side: Some(DiffSide::Left),
        body: "Consider a match here".into(),
    };

    let id = gateway.create_pending_thread(&request).await.unwrap();
    assert_eq!(id, ThreadId::new("PRRT_new"));
}

#[tokio::test]
async fn test_create_pending_thread_without_thread_in_payload_fails() {
    let (server, gateway) = common::setup_gateway().await;

    common::mount_graphql(
        &server,
        "addPullRequestReviewThread",
        serde_json::json!({ "addPullRequestReviewThread": { "thread": null } }),
    )
    .await;

    let request = PendingThreadRequest {
        review_node_id: ReviewNodeId::new("PR_kw1").unwrap(),
        path: FilePath::new("a.py"),
        line: 1,
        start_line: None,
        side: None,
        body: "x".into(),
    };
    assert!(gateway.create_pending_thread(&request).await.is_err());
}

#[tokio::test]
async fn test_submit_publishes_as_comment() {
    let (server, gateway) = common::setup_gateway().await;

    expect_mutation(
        &server,
        &["submitPullRequestReview", r#""event":"COMMENT""#],
        serde_json::json!({
            "submitPullRequestReview": { "pullRequestReview": { "id": "PRR_1", "state": "COMMENTED" } }
        }),
    )
    .await;

    gateway
        .submit_pending_thread(&ReviewNodeId::new("PR_kw1").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reply_sends_thread_and_body() {
    let (server, gateway) = common::setup_gateway().await;

    expect_mutation(
        &server,
        &[
            "addPullRequestReviewThreadReply",
            r#""pullRequestReviewThreadId":"PRRT_1""#,
            r#""body":"Fixed in abc123""#,
        ],
        serde_json::json!({
            "addPullRequestReviewThreadReply": { "comment": { "id": "PRRC_9" } }
        }),
    )
    .await;

    gateway
        .reply(&ThreadId::new("PRRT_1"), "Fixed in abc123")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_resolve_and_unresolve() {
    let (server, gateway) = common::setup_gateway().await;

    expect_mutation(
        &server,
        &["mutation ResolveThread", r#""threadId":"PRRT_1""#],
        serde_json::json!({ "resolveReviewThread": { "thread": { "id": "PRRT_1", "isResolved": true } } }),
    )
    .await;
    expect_mutation(
        &server,
        &["mutation UnresolveThread", r#""threadId":"PRRT_2""#],
        serde_json::json!({ "unresolveReviewThread": { "thread": { "id": "PRRT_2", "isResolved": false } } }),
    )
    .await;

    gateway.resolve(&ThreadId::new("PRRT_1")).await.unwrap();
    gateway.unresolve(&ThreadId::new("PRRT_2")).await.unwrap();
}

#[tokio::test]
async fn test_update_and_delete_comment() {
    let (server, gateway) = common::setup_gateway().await;

    expect_mutation(
        &server,
        &[
            "updatePullRequestReviewComment",
            r#""pullRequestReviewCommentId":"PRRC_1""#,
            r#""body":"reworded""#,
        ],
        serde_json::json!({
            "updatePullRequestReviewComment": { "pullRequestReviewComment": { "id": "PRRC_1" } }
        }),
    )
    .await;
    expect_mutation(
        &server,
        &["deletePullRequestReviewComment", r#""id":"PRRC_2""#],
        serde_json::json!({
            "deletePullRequestReviewComment": { "pullRequestReview": { "id": "PRR_1" } }
        }),
    )
    .await;

    gateway
        .update_comment(&CommentId::new("PRRC_1"), "reworded")
        .await
        .unwrap();
    gateway.delete_comment(&CommentId::new("PRRC_2")).await.unwrap();
}

#[tokio::test]
async fn test_add_reaction_uses_wire_name() {
    let (server, gateway) = common::setup_gateway().await;

    expect_mutation(
        &server,
        &["addReaction", r#""subjectId":"PRRC_1""#, r#""content":"THUMBS_UP""#],
        serde_json::json!({ "addReaction": { "reaction": { "content": "THUMBS_UP" } } }),
    )
    .await;

    gateway
        .add_reaction(&CommentId::new("PRRC_1"), ReactionKind::ThumbsUp)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_current_user() {
    let (server, gateway) = common::setup_gateway().await;

    common::mount_graphql(
        &server,
        "viewer",
        serde_json::json!({ "viewer": { "login": "alice", "name": "Alice Liddell" } }),
    )
    .await;

    let user = gateway.current_user().await.unwrap();
    assert_eq!(user.login, "alice");
    assert_eq!(user.name.as_deref(), Some("Alice Liddell"));
}

#[tokio::test]
async fn test_pr_node_id() {
    let (server, gateway) = common::setup_gateway().await;

    common::mount_graphql(
        &server,
        "query PullRequestId",
        serde_json::json!({ "repository": { "pullRequest": { "id": "PR_kwDOA" } } }),
    )
    .await;

    let node_id = gateway.pr_node_id(ReviewId::new(12).unwrap()).await.unwrap();
    assert_eq!(node_id.as_str(), "PR_kwDOA");
}

#[tokio::test]
async fn test_mutation_error_is_reported() {
    let (server, gateway) = common::setup_gateway().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "resolveReviewThread": null },
            "errors": [{ "message": "Resource not accessible by integration", "type": "FORBIDDEN" }]
        })))
        .mount(&server)
        .await;

    let err = gateway.resolve(&ThreadId::new("PRRT_1")).await.unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("Failed to resolve thread"));
    assert!(chain.contains("Resource not accessible"));
}
