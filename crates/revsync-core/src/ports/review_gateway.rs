//! Review gateway port (driven/secondary port)
//!
//! This module defines the interface for talking to the remote
//! pull-request review service. The primary implementation targets GitHub's
//! GraphQL API (`revsync-github`), but the trait is provider-agnostic.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific;
//!   the sync engine treats every gateway failure the same way regardless of
//!   cause (network, authentication, malformed payload).
//! - Uses `#[async_trait]` for async trait methods.
//! - Timeouts and retries belong to the implementation.

use serde::{Deserialize, Serialize};

use crate::domain::{
    CommentId, DiffSide, FilePath, ReactionKind, ReviewId, ReviewNodeId, ReviewThread, ThreadId,
};

/// The authenticated user of the review service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Login, matched against comment authors
    pub login: String,
    /// Display name, when the service exposes one
    pub name: Option<String>,
}

impl UserIdentity {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            name: None,
        }
    }
}

/// Parameters of a new pending thread
///
/// A port-level DTO; the sync engine validates it before it ever reaches
/// an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingThreadRequest {
    /// Pull request node the thread belongs to
    pub review_node_id: ReviewNodeId,
    /// Normalized file path
    pub path: FilePath,
    /// Anchor (last) line
    pub line: u32,
    /// First line for multi-line spans
    pub start_line: Option<u32>,
    /// Diff side; the service default (right) when absent
    pub side: Option<DiffSide>,
    /// Body of the opening comment
    pub body: String,
}

/// Port trait for remote review service operations
///
/// ## Implementation Notes
///
/// - `create_pending_thread` must leave the thread in a draft state that
///   `submit_pending_thread` publishes; callers tolerate a failed submit.
/// - `list_threads` returns every thread of the review; threads with no
///   comments must be dropped by the implementation.
#[async_trait::async_trait]
pub trait IReviewGateway: Send + Sync {
    /// Lists all threads of a review
    async fn list_threads(&self, review_id: ReviewId) -> anyhow::Result<Vec<ReviewThread>>;

    /// Creates a pending (draft) thread and returns its identifier
    async fn create_pending_thread(
        &self,
        request: &PendingThreadRequest,
    ) -> anyhow::Result<ThreadId>;

    /// Publishes the pending review so other participants can see it
    async fn submit_pending_thread(&self, review_node_id: &ReviewNodeId) -> anyhow::Result<()>;

    /// Adds a reply to an existing thread
    async fn reply(&self, thread_id: &ThreadId, body: &str) -> anyhow::Result<()>;

    /// Marks a thread resolved
    async fn resolve(&self, thread_id: &ThreadId) -> anyhow::Result<()>;

    /// Re-opens a resolved thread
    async fn unresolve(&self, thread_id: &ThreadId) -> anyhow::Result<()>;

    /// Replaces the body of a comment
    async fn update_comment(&self, comment_id: &CommentId, body: &str) -> anyhow::Result<()>;

    /// Deletes a comment
    async fn delete_comment(&self, comment_id: &CommentId) -> anyhow::Result<()>;

    /// Adds a reaction to a comment
    async fn add_reaction(
        &self,
        comment_id: &CommentId,
        reaction: ReactionKind,
    ) -> anyhow::Result<()>;

    /// Returns the authenticated user
    async fn current_user(&self) -> anyhow::Result<UserIdentity>;

    /// Resolves a review number into the node ID used by mutations
    async fn pr_node_id(&self, review_id: ReviewId) -> anyhow::Result<ReviewNodeId>;
}
