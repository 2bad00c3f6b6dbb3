//! GithubReviewGateway - IReviewGateway implementation for GitHub GraphQL
//!
//! Wraps the [`GithubClient`] and maps GitHub's review-thread model onto the
//! port-level [`ReviewThread`].
//!
//! ## Design Notes
//!
//! - Threads are listed with cursor pagination; comments are fetched with the
//!   same page size per thread.
//! - Outdated threads have no current `line`; `originalLine` is used instead.
//! - Threads without comments and file-level threads (no line at all) are
//!   dropped.
//! - Pending threads are attached to the viewer's pending review via
//!   `pullRequestId`; submitting publishes that review as `COMMENT`.

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use revsync_core::domain::{
    Comment, CommentId, DiffSide, FilePath, ReactionKind, ReviewId, ReviewNodeId, ReviewThread,
    ThreadId,
};
use revsync_core::ports::{IReviewGateway, PendingThreadRequest, UserIdentity};

use crate::client::GithubClient;
use crate::queries;
use crate::GithubError;

/// Login shown for comments whose author account was deleted
const GHOST_LOGIN: &str = "ghost";

// ============================================================================
// GraphQL response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryData<T> {
    repository: Option<PullRequestData<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestData<T> {
    pull_request: Option<T>,
}

#[derive(Debug, Deserialize)]
struct NodeId {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadsPullRequest {
    review_threads: Connection<ThreadNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
struct Connection<T> {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<Option<T>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    end_cursor: Option<String>,
}

/// One `PullRequestReviewThread`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadNode {
    id: String,
    path: String,
    line: Option<u32>,
    original_line: Option<u32>,
    start_line: Option<u32>,
    original_start_line: Option<u32>,
    diff_side: Option<String>,
    #[serde(default)]
    is_resolved: bool,
    #[serde(default)]
    is_outdated: bool,
    comments: Connection<CommentNode>,
}

/// One `PullRequestReviewComment`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    id: String,
    body: String,
    created_at: DateTime<Utc>,
    author: Option<Author>,
    #[serde(default)]
    reaction_groups: Vec<ReactionGroup>,
}

#[derive(Debug, Deserialize)]
struct Author {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ReactionGroup {
    content: String,
    reactors: Option<TotalCount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u32,
}

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    login: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddThreadData {
    add_pull_request_review_thread: Option<AddThreadPayload>,
}

#[derive(Debug, Deserialize)]
struct AddThreadPayload {
    thread: Option<NodeId>,
}

// ============================================================================
// Mapping
// ============================================================================

/// Converts a [`ThreadNode`] into a domain [`ReviewThread`]
///
/// Returns `Ok(None)` for threads the store cannot represent (no comments,
/// no line).
fn thread_from_node(node: ThreadNode) -> Result<Option<ReviewThread>> {
    let Some(line) = node.line.or(node.original_line) else {
        debug!(thread = %node.id, path = %node.path, "Skipping thread without a line");
        return Ok(None);
    };

    if node.comments.page_info.has_next_page {
        warn!(thread = %node.id, "Thread has more comments than one page; the rest are not shown");
    }

    let comments: Vec<Comment> = node
        .comments
        .nodes
        .into_iter()
        .flatten()
        .map(comment_from_node)
        .collect();
    if comments.is_empty() {
        debug!(thread = %node.id, "Skipping thread without comments");
        return Ok(None);
    }

    let side = match node.diff_side.as_deref() {
        Some(side) => DiffSide::from_str(side)?,
        None => DiffSide::default(),
    };
    let start_line = if node.line.is_some() {
        node.start_line
    } else {
        node.original_start_line
    };

    let thread = ReviewThread::new(
        ThreadId::new(node.id),
        FilePath::new(&node.path),
        line,
        side,
        comments,
    )?
    .with_start_line(start_line)?
    .with_resolved(node.is_resolved)
    .with_outdated(node.is_outdated);

    Ok(Some(thread))
}

fn comment_from_node(node: CommentNode) -> Comment {
    let author = node
        .author
        .map(|a| a.login)
        .unwrap_or_else(|| GHOST_LOGIN.to_string());

    let mut comment = Comment::new(CommentId::new(node.id), author, node.body, node.created_at);
    comment.reactions = reactions_from_groups(node.reaction_groups);
    comment
}

/// Keeps non-zero counts of the reactions the domain knows about
fn reactions_from_groups(groups: Vec<ReactionGroup>) -> BTreeMap<ReactionKind, u32> {
    let mut reactions = BTreeMap::new();
    for group in groups {
        let count = group.reactors.map_or(0, |r| r.total_count);
        if count == 0 {
            continue;
        }
        match ReactionKind::from_str(&group.content) {
            Ok(kind) => {
                reactions.insert(kind, count);
            }
            Err(_) => debug!(content = %group.content, "Ignoring unknown reaction"),
        }
    }
    reactions
}

/// Builds the `AddPullRequestReviewThreadInput` object, omitting absent fields
fn add_thread_input(request: &PendingThreadRequest) -> Value {
    let mut input = Map::new();
    input.insert("pullRequestId".into(), json!(request.review_node_id.as_str()));
    input.insert("path".into(), json!(request.path.as_str()));
    input.insert("line".into(), json!(request.line));
    input.insert("body".into(), json!(request.body));
    if let Some(side) = request.side {
        input.insert("side".into(), json!(side.as_str()));
    }
    if let Some(start_line) = request.start_line.filter(|&s| s != request.line) {
        input.insert("startLine".into(), json!(start_line));
        if let Some(side) = request.side {
            input.insert("startSide".into(), json!(side.as_str()));
        }
    }
    Value::Object(input)
}

// ============================================================================
// GithubReviewGateway
// ============================================================================

/// Review gateway backed by the GitHub GraphQL API
pub struct GithubReviewGateway {
    client: GithubClient,
    owner: String,
    repo: String,
    /// `first:` argument for thread and comment connections (1..=100)
    page_size: u32,
}

impl GithubReviewGateway {
    /// Creates a gateway for `owner/repo`
    pub fn new(client: GithubClient, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            page_size: 100,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 100);
        self
    }

    /// `owner/repo` this gateway talks to
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Fetches one page of threads starting after `cursor`
    async fn threads_page(
        &self,
        review_id: ReviewId,
        cursor: Option<&str>,
    ) -> Result<Connection<ThreadNode>> {
        let variables = json!({
            "owner": self.owner,
            "repo": self.repo,
            "number": review_id.number(),
            "first": self.page_size,
            "after": cursor,
        });

        let data: RepositoryData<ThreadsPullRequest> = self
            .client
            .graphql(queries::REVIEW_THREADS, variables)
            .await
            .with_context(|| format!("Failed to list review threads of {review_id}"))?;

        let pull_request = data
            .repository
            .and_then(|r| r.pull_request)
            .ok_or_else(|| {
                GithubError::NotFound(format!("pull request {review_id} in {}", self.repository()))
            })?;

        Ok(pull_request.review_threads)
    }

    /// Runs a mutation taking a single `$input` and discards its payload
    async fn mutate(&self, document: &str, input: Value, what: &str) -> Result<()> {
        let _: Value = self
            .client
            .graphql(document, json!({ "input": input }))
            .await
            .with_context(|| format!("Failed to {what}"))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl IReviewGateway for GithubReviewGateway {
    async fn list_threads(&self, review_id: ReviewId) -> Result<Vec<ReviewThread>> {
        let mut threads = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let page = self.threads_page(review_id, cursor.as_deref()).await?;
            pages += 1;

            for node in page.nodes.into_iter().flatten() {
                if let Some(thread) = thread_from_node(node)? {
                    threads.push(thread);
                }
            }

            match (page.page_info.has_next_page, page.page_info.end_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        debug!(
            review = %review_id,
            threads = threads.len(),
            pages,
            "Listed review threads"
        );
        Ok(threads)
    }

    async fn create_pending_thread(&self, request: &PendingThreadRequest) -> Result<ThreadId> {
        debug!(path = %request.path, line = request.line, "Creating pending review thread");

        let data: AddThreadData = self
            .client
            .graphql(
                queries::ADD_REVIEW_THREAD,
                json!({ "input": add_thread_input(request) }),
            )
            .await
            .context("Failed to create review thread")?;

        let id = data
            .add_pull_request_review_thread
            .and_then(|p| p.thread)
            .map(|t| t.id)
            .ok_or_else(|| {
                GithubError::InvalidResponse("addPullRequestReviewThread returned no thread".into())
            })?;

        Ok(ThreadId::new(id))
    }

    async fn submit_pending_thread(&self, review_node_id: &ReviewNodeId) -> Result<()> {
        self.mutate(
            queries::SUBMIT_REVIEW,
            json!({ "pullRequestId": review_node_id.as_str(), "event": "COMMENT" }),
            "submit pending review",
        )
        .await
    }

    async fn reply(&self, thread_id: &ThreadId, body: &str) -> Result<()> {
        self.mutate(
            queries::ADD_THREAD_REPLY,
            json!({ "pullRequestReviewThreadId": thread_id.as_str(), "body": body }),
            "reply to thread",
        )
        .await
    }

    async fn resolve(&self, thread_id: &ThreadId) -> Result<()> {
        self.mutate(
            queries::RESOLVE_THREAD,
            json!({ "threadId": thread_id.as_str() }),
            "resolve thread",
        )
        .await
    }

    async fn unresolve(&self, thread_id: &ThreadId) -> Result<()> {
        self.mutate(
            queries::UNRESOLVE_THREAD,
            json!({ "threadId": thread_id.as_str() }),
            "unresolve thread",
        )
        .await
    }

    async fn update_comment(&self, comment_id: &CommentId, body: &str) -> Result<()> {
        self.mutate(
            queries::UPDATE_COMMENT,
            json!({ "pullRequestReviewCommentId": comment_id.as_str(), "body": body }),
            "update comment",
        )
        .await
    }

    async fn delete_comment(&self, comment_id: &CommentId) -> Result<()> {
        self.mutate(
            queries::DELETE_COMMENT,
            json!({ "id": comment_id.as_str() }),
            "delete comment",
        )
        .await
    }

    async fn add_reaction(&self, comment_id: &CommentId, reaction: ReactionKind) -> Result<()> {
        self.mutate(
            queries::ADD_REACTION,
            json!({ "subjectId": comment_id.as_str(), "content": reaction.as_str() }),
            "add reaction",
        )
        .await
    }

    async fn current_user(&self) -> Result<UserIdentity> {
        let data: ViewerData = self
            .client
            .graphql(queries::VIEWER, json!({}))
            .await
            .context("Failed to fetch authenticated user")?;

        Ok(UserIdentity {
            login: data.viewer.login,
            name: data.viewer.name,
        })
    }

    async fn pr_node_id(&self, review_id: ReviewId) -> Result<ReviewNodeId> {
        let variables = json!({
            "owner": self.owner,
            "repo": self.repo,
            "number": review_id.number(),
        });

        let data: RepositoryData<NodeId> = self
            .client
            .graphql(queries::PULL_REQUEST_ID, variables)
            .await
            .with_context(|| format!("Failed to resolve pull request {review_id}"))?;

        let id = data
            .repository
            .and_then(|r| r.pull_request)
            .map(|pr| pr.id)
            .ok_or_else(|| {
                GithubError::NotFound(format!("pull request {review_id} in {}", self.repository()))
            })?;

        Ok(ReviewNodeId::new(id)?)
    }
}
