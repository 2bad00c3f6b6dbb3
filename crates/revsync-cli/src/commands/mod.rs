pub mod config;
pub mod mutate;
pub mod navigate;
pub mod threads;

use clap::Args;
use revsync_core::domain::ReviewId;
use revsync_core::ports::CursorPosition;

/// Pull request plus a position inside one of its files
#[derive(Debug, Clone, Args)]
pub struct Location {
    /// Pull request number (e.g. 42 or #42)
    pub pr: ReviewId,
    /// File path as shown in the diff
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

impl Location {
    pub fn cursor(&self) -> CursorPosition {
        CursorPosition::new(&self.file, self.line)
    }
}
