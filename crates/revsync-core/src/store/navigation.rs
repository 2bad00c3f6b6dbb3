//! Thread navigation
//!
//! Cyclic "jump to next / previous thread" over the threads of one file.
//! The sequence is rebuilt from the store on every call, so repeated calls
//! against the same snapshot always give the same answer.

use std::cmp::Reverse;

use super::ThreadStore;
use crate::domain::ReviewThread;

/// Direction of a navigation jump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards higher line numbers
    Next,
    /// Towards lower line numbers
    Prev,
}

impl ThreadStore {
    /// First thread after `current_line` in `path`, wrapping to the topmost one
    #[must_use]
    pub fn next_thread(&self, path: &str, current_line: u32) -> Option<&ReviewThread> {
        self.navigate(path, current_line, Direction::Next)
    }

    /// First thread before `current_line` in `path`, wrapping to the bottommost one
    #[must_use]
    pub fn prev_thread(&self, path: &str, current_line: u32) -> Option<&ReviewThread> {
        self.navigate(path, current_line, Direction::Prev)
    }

    /// Jumps from `current_line` in `direction`.
    ///
    /// The file bucket is stably sorted by anchor line (ascending for
    /// [`Direction::Next`], descending for [`Direction::Prev`]); the first
    /// thread strictly past `current_line` wins, otherwise the first element
    /// of the sorted sequence. Returns `None` only for a file without threads.
    #[must_use]
    pub fn navigate(
        &self,
        path: &str,
        current_line: u32,
        direction: Direction,
    ) -> Option<&ReviewThread> {
        let mut ordered = self.get_for_file(path);
        match direction {
            Direction::Next => ordered.sort_by_key(|t| t.line()),
            Direction::Prev => ordered.sort_by_key(|t| Reverse(t.line())),
        }

        let past = |thread: &&ReviewThread| match direction {
            Direction::Next => thread.line() > current_line,
            Direction::Prev => thread.line() < current_line,
        };

        ordered
            .iter()
            .copied()
            .find(past)
            .or_else(|| ordered.first().copied())
    }
}
