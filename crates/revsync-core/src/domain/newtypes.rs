//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for review identifiers.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Prefix of locally generated thread identifiers
pub const PLACEHOLDER_PREFIX: &str = "pending_";

// ============================================================================
// Session identity
// ============================================================================

/// Identifier for a review session (one per opened review)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random SessionId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid SessionId: {e}")))
    }
}

// ============================================================================
// Review identifiers
// ============================================================================

/// Number of the pull request under review (e.g. `42` for `#42`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(u64);

impl ReviewId {
    /// Create a new ReviewId
    ///
    /// # Errors
    /// Returns error if the number is zero
    pub fn new(number: u64) -> Result<Self, DomainError> {
        if number == 0 {
            return Err(DomainError::InvalidId(
                "Review number must be positive".to_string(),
            ));
        }
        Ok(Self(number))
    }

    /// Get the pull request number
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.0
    }
}

impl Display for ReviewId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for ReviewId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        let number = digits
            .parse::<u64>()
            .map_err(|e| DomainError::InvalidId(format!("Invalid review number '{s}': {e}")))?;
        Self::new(number)
    }
}

/// Remote node identifier of the pull request (GraphQL global ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewNodeId(String);

impl ReviewNodeId {
    /// Create a new ReviewNodeId
    ///
    /// # Errors
    /// Returns error if the ID is empty
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidId(
                "Review node ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ReviewNodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Thread and comment identifiers
// ============================================================================

/// Identifier of a review thread
///
/// Either the remote ID once the service has confirmed the thread, or a
/// locally generated `pending_<timestamp>` placeholder before that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Wraps a remote-assigned thread ID
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a placeholder ID for an optimistic thread.
    ///
    /// The timestamp has nanosecond resolution so two placeholders created
    /// in the same session do not collide.
    #[must_use]
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        let stamp = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));
        Self(format!("{PLACEHOLDER_PREFIX}{stamp}"))
    }

    /// Whether this ID was generated locally and awaits reconciliation
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ThreadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of a single comment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    /// Wraps a comment ID
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Placeholder comment ID paired with a placeholder thread
    #[must_use]
    pub fn placeholder_for(thread: &ThreadId) -> Self {
        Self(format!("{}_comment", thread.as_str()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CommentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
