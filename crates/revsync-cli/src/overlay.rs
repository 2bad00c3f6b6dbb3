//! Terminal host overlay
//!
//! The CLI has no editor buffer: the "cursor" is the file and line given on
//! the command line, and a refresh just records the latest snapshot size.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use revsync_core::ports::{CursorPosition, IHostOverlay};
use revsync_core::store::ThreadStore;

/// Host overlay backed by command-line arguments
#[derive(Debug, Default)]
pub struct CliOverlay {
    cursor: Option<CursorPosition>,
    refreshes: AtomicUsize,
}

impl CliOverlay {
    pub fn new(cursor: Option<CursorPosition>) -> Self {
        Self {
            cursor,
            refreshes: AtomicUsize::new(0),
        }
    }

    /// Number of snapshot changes seen so far
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::Relaxed)
    }
}

impl IHostOverlay for CliOverlay {
    fn cursor_position(&self) -> Option<CursorPosition> {
        self.cursor.clone()
    }

    fn refresh(&self, store: &ThreadStore) {
        let n = self.refreshes.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            refresh = n,
            threads = store.len(),
            files = store.files().len(),
            pending = store.pending_count(),
            "Thread snapshot changed"
        );
    }
}
