//! Integration tests for listing review threads
//!
//! Verifies against a wiremock-based GraphQL endpoint:
//! - Single page listing with path normalization
//! - Cursor pagination across pages
//! - Dropping threads without comments
//! - Reaction group mapping
//! - Missing pull requests and GraphQL errors

use revsync_core::domain::{ReactionKind, ReviewId};
use revsync_core::ports::IReviewGateway;

use crate::common;

fn pr(number: u64) -> ReviewId {
    ReviewId::new(number).unwrap()
}

#[tokio::test]
async fn test_list_threads_single_page() {
    let (server, gateway) = common::setup_gateway().await;

    common::mount_graphql(
        &server,
        "reviewThreads",
        common::threads_page(
            vec![
                common::thread_node(
                    "PRRT_1",
                    "./src/lib.rs",
                    10,
                    vec![
                        common::comment_node("PRRC_1", "alice", "Why?"),
                        common::comment_node("PRRC_2", "bob", "Because."),
                    ],
                ),
                common::thread_node(
                    "PRRT_2",
                    "README.md",
                    3,
                    vec![common::comment_node("PRRC_3", "bob", "typo")],
                ),
            ],
            None,
        ),
    )
    .await;

    let threads = gateway
        .list_threads(pr(7))
        .await
        .expect("list_threads failed");

    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].id().as_str(), "PRRT_1");
    assert_eq!(threads[0].path().as_str(), "src/lib.rs");
    assert_eq!(threads[0].line(), 10);
    assert_eq!(threads[0].comments().len(), 2);
    assert_eq!(threads[0].last_comment().unwrap().author, "bob");
    assert!(threads[0].comments()[0].reactions.is_empty());
    assert_eq!(threads[1].path().as_str(), "README.md");
}

#[tokio::test]
async fn test_list_threads_follows_cursor() {
    let (server, gateway) = common::setup_gateway().await;

    common::mount_graphql(
        &server,
        r#""after":null"#,
        common::threads_page(
            vec![common::thread_node(
                "PRRT_1",
                "a.py",
                1,
                vec![common::comment_node("PRRC_1", "alice", "one")],
            )],
            Some("cursor-1"),
        ),
    )
    .await;
    common::mount_graphql(
        &server,
        r#""after":"cursor-1""#,
        common::threads_page(
            vec![common::thread_node(
                "PRRT_2",
                "a.py",
                2,
                vec![common::comment_node("PRRC_2", "alice", "two")],
            )],
            None,
        ),
    )
    .await;

    let threads = gateway.list_threads(pr(7)).await.unwrap();

    let ids: Vec<&str> = threads.iter().map(|t| t.id().as_str()).collect();
    assert_eq!(ids, vec!["PRRT_1", "PRRT_2"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_threads_drops_threads_without_comments() {
    let (server, gateway) = common::setup_gateway().await;

    common::mount_graphql(
        &server,
        "reviewThreads",
        common::threads_page(
            vec![
                common::thread_node("PRRT_empty", "a.py", 4, vec![]),
                common::thread_node(
                    "PRRT_1",
                    "a.py",
                    5,
                    vec![common::comment_node("PRRC_1", "alice", "kept")],
                ),
            ],
            None,
        ),
    )
    .await;

    let threads = gateway.list_threads(pr(7)).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id().as_str(), "PRRT_1");
}

#[tokio::test]
async fn test_list_threads_maps_reactions() {
    let (server, gateway) = common::setup_gateway().await;

    let mut comment = common::comment_node("PRRC_1", "alice", "ship it");
    comment["reactionGroups"] = serde_json::json!([
        { "content": "HOORAY", "reactors": { "totalCount": 3 } },
        { "content": "EYES", "reactors": { "totalCount": 1 } },
        { "content": "HEART", "reactors": { "totalCount": 0 } }
    ]);
    common::mount_graphql(
        &server,
        "reviewThreads",
        common::threads_page(vec![common::thread_node("PRRT_1", "a.py", 5, vec![comment])], None),
    )
    .await;

    let threads = gateway.list_threads(pr(7)).await.unwrap();
    let reactions = &threads[0].comments()[0].reactions;

    assert_eq!(reactions.len(), 2);
    assert_eq!(reactions.get(&ReactionKind::Hooray), Some(&3));
    assert_eq!(reactions.get(&ReactionKind::Eyes), Some(&1));
    assert_eq!(threads[0].comments()[0].reaction_total(), 4);
}

#[tokio::test]
async fn test_list_threads_missing_pull_request() {
    let (server, gateway) = common::setup_gateway().await;

    common::mount_graphql(
        &server,
        "reviewThreads",
        serde_json::json!({ "repository": { "pullRequest": null } }),
    )
    .await;

    let err = gateway.list_threads(pr(404)).await.unwrap_err();
    assert!(format!("{err:#}").contains("Not found"));
}

#[tokio::test]
async fn test_list_threads_propagates_graphql_errors() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    let (server, gateway) = common::setup_gateway().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{ "message": "Could not resolve to a Repository", "type": "NOT_FOUND" }]
        })))
        .mount(&server)
        .await;

    let err = gateway.list_threads(pr(7)).await.unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("Failed to list review threads"));
    assert!(chain.contains("Could not resolve to a Repository"));
}
