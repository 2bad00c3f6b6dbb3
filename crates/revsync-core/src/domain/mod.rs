//! Domain entities and business logic
//!
//! This module contains the core domain types for revsync:
//! - Path normalization and the normalized `FilePath` key
//! - Newtypes for review, thread and comment identifiers
//! - Review threads, comments, diff sides and reactions
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod path;
pub mod thread;

// Re-export commonly used types
pub use errors::DomainError;
pub use newtypes::*;
pub use path::{normalize_opt, normalize_path, FilePath};
pub use thread::{Comment, DiffSide, ReactionKind, ReviewThread, ThreadRecord};
