//! Domain error types
//!
//! This module defines error types specific to domain operations:
//! caller input validation, thread invariants and identifier parsing.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Empty or otherwise unusable file path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Anchor line outside the 1-based line range
    #[error("Invalid line: {0}")]
    InvalidLine(String),

    /// Multi-line span whose start is past its anchor
    #[error("Invalid span: start line {start} is after anchor line {line}")]
    InvalidSpan {
        /// First line of the span
        start: u32,
        /// Anchor (last) line of the span
        line: u32,
    },

    /// A thread must carry at least one comment
    #[error("Thread {0} has no comments")]
    EmptyThread(String),

    /// Unknown reaction name
    #[error("Invalid reaction: {0}")]
    InvalidReaction(String),

    /// Unknown diff side
    #[error("Invalid diff side: {0}")]
    InvalidSide(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
