//! revsync Sync - Review thread synchronization engine
//!
//! Provides:
//! - Authoritative fetches of every thread of a review
//! - Optimistic thread creation with deferred reconciliation
//! - Reply, resolve, edit, delete and reaction pipelines
//!
//! ## Modules
//!
//! - [`engine`] - Validate → remote call → local reconcile pipelines
//! - [`scheduler`] - Cancellable delayed reconciliation tasks
//! - [`session`] - Per-review state shared between the engine and the host

pub mod engine;
pub mod scheduler;
pub mod session;

pub use engine::{CreatedThread, NewThread, SubmitStatus, SyncEngine};
pub use scheduler::{ReconcileHandle, ReconcileOutcome, ReconcileScheduler};
pub use session::ReviewSession;

use revsync_core::domain::DomainError;
use thiserror::Error;

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Caller input was rejected before any remote call was made
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),

    /// The review service rejected or failed a call; the local store is unchanged
    #[error("Gateway error during {operation}: {source}")]
    Gateway {
        /// Gateway method that failed
        operation: &'static str,
        /// Underlying adapter error
        #[source]
        source: anyhow::Error,
    },

    /// There was nothing to act on (e.g. no comment of the current user)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl SyncError {
    pub(crate) fn gateway(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Gateway { operation, source }
    }

    /// Whether the remote service was involved in the failure
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Gateway { .. })
    }
}

/// Result alias for synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;
