//! Host overlay port (driving side)
//!
//! The diff-rendering host owns buffers and cursors; the core only needs to
//! know where the cursor is and to tell the host when the thread snapshot
//! changed so it can redraw.

use serde::{Deserialize, Serialize};

use crate::domain::FilePath;
use crate::store::ThreadStore;

/// Cursor location translated into review coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    /// File shown in the focused buffer (normalized)
    pub path: FilePath,
    /// 1-based line under the cursor
    pub line: u32,
}

impl CursorPosition {
    pub fn new(path: &str, line: u32) -> Self {
        Self {
            path: FilePath::new(path),
            line,
        }
    }
}

/// Port trait for the rendering host
///
/// `refresh` is called with the store read-locked after every snapshot
/// change (fetch, optimistic insert, clear); implementations should copy
/// what they need and return quickly.
pub trait IHostOverlay: Send + Sync {
    /// Current cursor position, or `None` when no diff buffer has focus
    fn cursor_position(&self) -> Option<CursorPosition>;

    /// Called after the thread snapshot changed
    fn refresh(&self, store: &ThreadStore);
}

/// Host that has no cursor and draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOverlay;

impl IHostOverlay for NoopOverlay {
    fn cursor_position(&self) -> Option<CursorPosition> {
        None
    }

    fn refresh(&self, _store: &ThreadStore) {}
}
