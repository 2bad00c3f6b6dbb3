//! Review session - the state of one review under inspection
//!
//! A [`ReviewSession`] owns the [`ThreadStore`] for a single review together
//! with values resolved lazily from the review service (the review's node ID
//! and the authenticated user). The store sits behind an
//! `Arc<RwLock<..>>` so a deferred reconciliation task can swap the snapshot
//! while the host keeps reading it.
//!
//! Locks are only held for a single read or a single assignment and never
//! across an `.await`.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::OnceCell;
use tracing::debug;

use revsync_core::domain::{ReviewId, ReviewNodeId, ReviewThread, SessionId, ThreadId};
use revsync_core::ports::{IHostOverlay, IReviewGateway, UserIdentity};
use revsync_core::store::ThreadStore;

/// Shared handle to a session's thread store
pub type SharedStore = Arc<RwLock<ThreadStore>>;

/// State of one review under inspection
#[derive(Debug)]
pub struct ReviewSession {
    id: SessionId,
    review_id: ReviewId,
    store: SharedStore,
    node_id: OnceCell<ReviewNodeId>,
    current_user: OnceCell<UserIdentity>,
}

impl ReviewSession {
    /// Opens a session with an empty store
    pub fn new(review_id: ReviewId) -> Self {
        Self {
            id: SessionId::new(),
            review_id,
            store: Arc::new(RwLock::new(ThreadStore::new())),
            node_id: OnceCell::new(),
            current_user: OnceCell::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn review_id(&self) -> ReviewId {
        self.review_id
    }

    /// Runs `f` against the current snapshot
    pub fn read<R>(&self, f: impl FnOnce(&ThreadStore) -> R) -> R {
        f(&read_store(&self.store))
    }

    /// Owned copy of the current snapshot
    pub fn snapshot(&self) -> ThreadStore {
        self.read(ThreadStore::clone)
    }

    /// Threads anchored in `path`, in insertion order
    pub fn threads_for_file(&self, path: &str) -> Vec<ReviewThread> {
        self.read(|store| store.get_for_file(path).into_iter().cloned().collect())
    }

    /// First thread anchored at `line` in `path`
    pub fn thread_at(&self, path: &str, line: u32) -> Option<ReviewThread> {
        self.read(|store| store.get_at_line(path, line).cloned())
    }

    pub fn thread(&self, id: &ThreadId) -> Option<ReviewThread> {
        self.read(|store| store.get(id).cloned())
    }

    pub fn next_thread(&self, path: &str, line: u32) -> Option<ReviewThread> {
        self.read(|store| store.next_thread(path, line).cloned())
    }

    pub fn prev_thread(&self, path: &str, line: u32) -> Option<ReviewThread> {
        self.read(|store| store.prev_thread(path, line).cloned())
    }

    /// Thread under the host's cursor.
    ///
    /// `None` when the host has no cursor in a diff buffer, or when no
    /// thread is anchored at the cursor line.
    pub fn thread_at_cursor(&self, overlay: &dyn IHostOverlay) -> Option<ReviewThread> {
        let cursor = overlay.cursor_position()?;
        self.thread_at(cursor.path.as_str(), cursor.line)
    }

    /// Drops every cached thread and tells the host to redraw
    pub fn clear(&self, overlay: &dyn IHostOverlay) {
        debug!(session = %self.id, "Clearing session store");
        write_store(&self.store).clear();
        overlay.refresh(&read_store(&self.store));
    }

    /// Node ID of the review, resolved once per session
    pub(crate) async fn node_id(
        &self,
        gateway: &dyn IReviewGateway,
    ) -> anyhow::Result<&ReviewNodeId> {
        self.node_id
            .get_or_try_init(|| gateway.pr_node_id(self.review_id))
            .await
    }

    /// Authenticated user, resolved once per session.
    ///
    /// Failures are not cached; the next call asks the gateway again.
    pub(crate) async fn current_user(
        &self,
        gateway: &dyn IReviewGateway,
    ) -> anyhow::Result<&UserIdentity> {
        self.current_user
            .get_or_try_init(|| gateway.current_user())
            .await
    }

    pub(crate) fn shared_store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }
}

pub(crate) fn read_store(store: &RwLock<ThreadStore>) -> RwLockReadGuard<'_, ThreadStore> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_store(store: &RwLock<ThreadStore>) -> RwLockWriteGuard<'_, ThreadStore> {
    store.write().unwrap_or_else(PoisonError::into_inner)
}
