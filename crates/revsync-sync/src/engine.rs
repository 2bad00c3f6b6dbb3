//! Review synchronization engine
//!
//! The [`SyncEngine`] keeps a [`ReviewSession`]'s thread store in step with
//! the remote review service.
//!
//! ## Pipelines
//!
//! Every mutating action runs **validate → remote call → local reconcile**:
//!
//! 1. **Validate**: caller input is checked before anything is sent; a
//!    rejection is a [`SyncError::Validation`] and the gateway is never called.
//! 2. **Remote call**: a single gateway mutation (two for thread creation).
//!    A failure is a [`SyncError::Gateway`] and the store is left untouched.
//! 3. **Reconcile**: one authoritative fetch replaces the whole snapshot.
//!    Thread creation inserts a placeholder first and defers the fetch to the
//!    [`ReconcileScheduler`].
//!
//! A failed follow-up fetch after a successful mutation is logged and not
//! surfaced: the remote change happened, the local view is merely stale
//! until the next fetch.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use revsync_core::config::Config;
use revsync_core::domain::{
    Comment, CommentId, DiffSide, DomainError, FilePath, ReactionKind, ReviewId, ReviewThread,
    ThreadId,
};
use revsync_core::ports::{IHostOverlay, IReviewGateway, PendingThreadRequest};
use revsync_core::store::ThreadStore;

use crate::scheduler::{ReconcileHandle, ReconcileScheduler};
use crate::session::{read_store, write_store, ReviewSession};
use crate::{Result, SyncError};

/// Input of [`SyncEngine::create_thread`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThread {
    /// File path as the host reports it; normalized before use
    pub path: String,
    /// Anchor (last) line, 1-based
    pub line: u32,
    /// First line of a multi-line span
    pub start_line: Option<u32>,
    /// Diff side; the service default when absent
    pub side: Option<DiffSide>,
    /// Body of the opening comment
    pub body: String,
}

impl NewThread {
    pub fn new(path: impl Into<String>, line: u32, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line,
            start_line: None,
            side: None,
            body: body.into(),
        }
    }

    pub fn with_start_line(mut self, start_line: u32) -> Self {
        self.start_line = Some(start_line);
        self
    }

    pub fn with_side(mut self, side: DiffSide) -> Self {
        self.side = Some(side);
        self
    }
}

/// Whether the pending thread was published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Visible to every participant
    Submitted,
    /// Created, but the submit step failed; only the author can see it
    Draft,
}

/// Result of a successful [`SyncEngine::create_thread`]
#[derive(Debug)]
pub struct CreatedThread {
    /// Placeholder ID of the optimistic thread now in the store
    pub thread_id: ThreadId,
    /// ID the review service assigned to the new thread
    pub remote_thread_id: ThreadId,
    pub submit: SubmitStatus,
    /// Deferred reconciliation; may be ignored, cancelled or awaited
    pub reconcile: ReconcileHandle,
}

/// Synchronizes review sessions with the review service
///
/// ## Dependencies
///
/// - `gateway`: Remote review operations (IReviewGateway)
/// - `overlay`: Rendering host, refreshed after every store change (IHostOverlay)
pub struct SyncEngine {
    gateway: Arc<dyn IReviewGateway>,
    overlay: Arc<dyn IHostOverlay>,
    scheduler: ReconcileScheduler,
    /// Author of optimistic comments when the current user cannot be resolved
    fallback_author: String,
}

impl SyncEngine {
    /// Creates a new `SyncEngine` with the given dependencies
    ///
    /// # Arguments
    /// * `gateway` - Remote review service
    /// * `overlay` - Rendering host
    /// * `config` - Application configuration for sync settings
    pub fn new(
        gateway: Arc<dyn IReviewGateway>,
        overlay: Arc<dyn IHostOverlay>,
        config: &Config,
    ) -> Self {
        Self {
            gateway,
            overlay,
            scheduler: ReconcileScheduler::new(Duration::from_millis(
                config.sync.reconcile_delay_ms,
            )),
            fallback_author: config.sync.fallback_author.clone(),
        }
    }

    /// Thread under the host's cursor
    pub fn thread_at_cursor(&self, session: &ReviewSession) -> Option<ReviewThread> {
        session.thread_at_cursor(self.overlay.as_ref())
    }

    // ========================================================================
    // Fetch
    // ========================================================================

    /// Replaces the session snapshot with the remote state.
    ///
    /// Returns the number of threads fetched. On failure the store is left
    /// exactly as it was.
    #[tracing::instrument(skip(self, session), fields(review = %session.review_id()))]
    pub async fn fetch(&self, session: &ReviewSession) -> Result<usize> {
        let count = fetch_into(
            self.gateway.as_ref(),
            self.overlay.as_ref(),
            &session.shared_store(),
            session.review_id(),
        )
        .await
        .map_err(|e| SyncError::gateway("list_threads", e))?;

        info!(threads = count, "Fetched review threads");
        Ok(count)
    }

    // ========================================================================
    // Create thread
    // ========================================================================

    /// Creates and publishes a new thread, showing it locally right away.
    ///
    /// The thread is created as pending and then submitted. If the submit
    /// step fails the call still succeeds with [`SubmitStatus::Draft`]. A
    /// placeholder thread is inserted immediately; the returned
    /// [`ReconcileHandle`] replaces it with the remote state after the
    /// configured delay.
    #[tracing::instrument(
        skip(self, session, new),
        fields(review = %session.review_id(), path = %new.path, line = new.line)
    )]
    pub async fn create_thread(
        &self,
        session: &ReviewSession,
        new: NewThread,
    ) -> Result<CreatedThread> {
        // Validate
        validate_body(&new.body)?;
        provisional_thread(&new, &self.fallback_author)?;

        // Remote call
        let review_node_id = session
            .node_id(self.gateway.as_ref())
            .await
            .map_err(|e| SyncError::gateway("pr_node_id", e))?
            .clone();

        let request = PendingThreadRequest {
            review_node_id: review_node_id.clone(),
            path: FilePath::new(&new.path),
            line: new.line,
            start_line: new.start_line,
            side: new.side,
            body: new.body.clone(),
        };
        let remote_thread_id = self
            .gateway
            .create_pending_thread(&request)
            .await
            .map_err(|e| SyncError::gateway("create_pending_thread", e))?;

        let submit = match self.gateway.submit_pending_thread(&review_node_id).await {
            Ok(()) => SubmitStatus::Submitted,
            Err(err) => {
                warn!(
                    thread = %remote_thread_id,
                    error = %err,
                    "Thread created but submitting the review failed; it remains a draft"
                );
                SubmitStatus::Draft
            }
        };

        // Local reconcile
        let author = match session.current_user(self.gateway.as_ref()).await {
            Ok(user) => user.login.clone(),
            Err(err) => {
                debug!(error = %err, "Current user unavailable; using fallback author");
                self.fallback_author.clone()
            }
        };
        let thread = provisional_thread(&new, &author)?;
        let thread_id = thread.id().clone();

        {
            let store = session.shared_store();
            write_store(&store).insert_optimistic(thread);
            self.overlay.refresh(&read_store(&store));
        }

        let reconcile = self.schedule_reconcile(session);

        info!(
            placeholder = %thread_id,
            remote = %remote_thread_id,
            submit = ?submit,
            "Created review thread"
        );

        Ok(CreatedThread {
            thread_id,
            remote_thread_id,
            submit,
            reconcile,
        })
    }

    fn schedule_reconcile(&self, session: &ReviewSession) -> ReconcileHandle {
        let gateway = Arc::clone(&self.gateway);
        let overlay = Arc::clone(&self.overlay);
        let store = session.shared_store();
        let review_id = session.review_id();

        self.scheduler.schedule(async move {
            fetch_into(gateway.as_ref(), overlay.as_ref(), &store, review_id).await
        })
    }

    // ========================================================================
    // Thread-level mutations
    // ========================================================================

    /// Adds a reply to `thread`
    #[tracing::instrument(skip(self, session, thread, body), fields(thread = %thread.id()))]
    pub async fn reply(
        &self,
        session: &ReviewSession,
        thread: &ReviewThread,
        body: &str,
    ) -> Result<()> {
        validate_body(body)?;
        ensure_confirmed(thread)?;

        self.gateway
            .reply(thread.id(), body)
            .await
            .map_err(|e| SyncError::gateway("reply", e))?;

        info!("Replied to thread");
        self.refresh_after(session, "reply").await;
        Ok(())
    }

    /// Resolves an open thread or re-opens a resolved one.
    ///
    /// Returns the new resolved state.
    #[tracing::instrument(skip(self, session, thread), fields(thread = %thread.id()))]
    pub async fn toggle_resolve(
        &self,
        session: &ReviewSession,
        thread: &ReviewThread,
    ) -> Result<bool> {
        ensure_confirmed(thread)?;

        let resolved = if thread.is_resolved() {
            self.gateway
                .unresolve(thread.id())
                .await
                .map_err(|e| SyncError::gateway("unresolve", e))?;
            false
        } else {
            self.gateway
                .resolve(thread.id())
                .await
                .map_err(|e| SyncError::gateway("resolve", e))?;
            true
        };

        info!(resolved, "Toggled thread resolution");
        self.refresh_after(session, "toggle_resolve").await;
        Ok(resolved)
    }

    // ========================================================================
    // Comment-level mutations
    // ========================================================================

    /// Replaces the body of the current user's last comment in `thread`.
    ///
    /// Returns the ID of the edited comment.
    #[tracing::instrument(skip(self, session, thread, body), fields(thread = %thread.id()))]
    pub async fn edit_last_comment(
        &self,
        session: &ReviewSession,
        thread: &ReviewThread,
        body: &str,
    ) -> Result<CommentId> {
        validate_body(body)?;
        ensure_confirmed(thread)?;
        let comment_id = self.own_last_comment(session, thread).await?;

        self.gateway
            .update_comment(&comment_id, body)
            .await
            .map_err(|e| SyncError::gateway("update_comment", e))?;

        info!(comment = %comment_id, "Edited comment");
        self.refresh_after(session, "edit_last_comment").await;
        Ok(comment_id)
    }

    /// Deletes the current user's last comment in `thread`.
    ///
    /// Returns the ID of the deleted comment.
    #[tracing::instrument(skip(self, session, thread), fields(thread = %thread.id()))]
    pub async fn delete_last_comment(
        &self,
        session: &ReviewSession,
        thread: &ReviewThread,
    ) -> Result<CommentId> {
        ensure_confirmed(thread)?;
        let comment_id = self.own_last_comment(session, thread).await?;

        self.gateway
            .delete_comment(&comment_id)
            .await
            .map_err(|e| SyncError::gateway("delete_comment", e))?;

        info!(comment = %comment_id, "Deleted comment");
        self.refresh_after(session, "delete_last_comment").await;
        Ok(comment_id)
    }

    /// Reacts to the last comment of `thread`, whoever wrote it.
    ///
    /// Returns the ID of the comment reacted to.
    #[tracing::instrument(skip(self, session, thread), fields(thread = %thread.id()))]
    pub async fn add_reaction(
        &self,
        session: &ReviewSession,
        thread: &ReviewThread,
        reaction: ReactionKind,
    ) -> Result<CommentId> {
        ensure_confirmed(thread)?;
        let comment_id = thread
            .last_comment()
            .map(|c| c.id.clone())
            .ok_or_else(|| SyncError::NotFound(format!("Thread {} has no comments", thread.id())))?;

        self.gateway
            .add_reaction(&comment_id, reaction)
            .await
            .map_err(|e| SyncError::gateway("add_reaction", e))?;

        info!(comment = %comment_id, %reaction, "Added reaction");
        self.refresh_after(session, "add_reaction").await;
        Ok(comment_id)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Last comment in `thread` written by the authenticated user
    async fn own_last_comment(
        &self,
        session: &ReviewSession,
        thread: &ReviewThread,
    ) -> Result<CommentId> {
        let user = session
            .current_user(self.gateway.as_ref())
            .await
            .map_err(|e| SyncError::gateway("current_user", e))?;

        thread
            .last_comment_by(&user.login)
            .map(|c| c.id.clone())
            .ok_or_else(|| {
                SyncError::NotFound(format!(
                    "No comment by {} in thread {}",
                    user.login,
                    thread.id()
                ))
            })
    }

    async fn refresh_after(&self, session: &ReviewSession, operation: &'static str) {
        if let Err(err) = self.fetch(session).await {
            warn!(
                operation,
                error = %err,
                "Follow-up fetch failed; local threads are stale until the next fetch"
            );
        }
    }
}

/// Fetches every thread of `review_id` into `store` and refreshes the host
async fn fetch_into(
    gateway: &dyn IReviewGateway,
    overlay: &dyn IHostOverlay,
    store: &RwLock<ThreadStore>,
    review_id: ReviewId,
) -> anyhow::Result<usize> {
    let threads = gateway.list_threads(review_id).await?;
    let count = threads.len();
    write_store(store).replace_all(threads);
    overlay.refresh(&read_store(store));
    Ok(count)
}

/// Locally synthesized stand-in for a thread the service has not reported yet
fn provisional_thread(new: &NewThread, author: &str) -> std::result::Result<ReviewThread, DomainError> {
    let now = Utc::now();
    let id = ThreadId::placeholder(now);
    let comment = Comment::new(CommentId::placeholder_for(&id), author, new.body.clone(), now);

    ReviewThread::new(
        id,
        FilePath::new(&new.path),
        new.line,
        new.side.unwrap_or_default(),
        vec![comment],
    )?
    .with_start_line(new.start_line)
}

fn validate_body(body: &str) -> std::result::Result<(), DomainError> {
    if body.trim().is_empty() {
        return Err(DomainError::ValidationFailed(
            "comment body must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Placeholder threads have no remote counterpart to mutate yet
fn ensure_confirmed(thread: &ReviewThread) -> std::result::Result<(), DomainError> {
    if thread.is_pending() {
        return Err(DomainError::InvalidId(format!(
            "thread {} is awaiting reconciliation",
            thread.id()
        )));
    }
    Ok(())
}
