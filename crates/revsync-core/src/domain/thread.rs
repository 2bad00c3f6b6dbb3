//! Review threads and comments
//!
//! A [`ReviewThread`] is a conversation anchored to a line (or a span of
//! lines) of one side of a diff. Threads are built either from remote data
//! or optimistically after a successful create request; both paths go
//! through the same invariant checks.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{CommentId, ThreadId};
use super::path::FilePath;

// ============================================================================
// DiffSide
// ============================================================================

/// Which side of the diff a thread is attached to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiffSide {
    /// The base (old) version
    Left,
    /// The head (new) version
    #[default]
    Right,
}

impl DiffSide {
    /// Wire name (`LEFT` / `RIGHT`)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

impl Display for DiffSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffSide {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LEFT" | "OLD" | "BASE" => Ok(Self::Left),
            "RIGHT" | "NEW" | "HEAD" => Ok(Self::Right),
            _ => Err(DomainError::InvalidSide(s.to_string())),
        }
    }
}

// ============================================================================
// ReactionKind
// ============================================================================

/// Reactions supported by the review service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionKind {
    ThumbsUp,
    ThumbsDown,
    Laugh,
    Hooray,
    Confused,
    Heart,
    Rocket,
    Eyes,
}

impl ReactionKind {
    /// Every supported reaction, in display order
    pub const ALL: [Self; 8] = [
        Self::ThumbsUp,
        Self::ThumbsDown,
        Self::Laugh,
        Self::Hooray,
        Self::Confused,
        Self::Heart,
        Self::Rocket,
        Self::Eyes,
    ];

    /// Wire name, e.g. `THUMBS_UP`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ThumbsUp => "THUMBS_UP",
            Self::ThumbsDown => "THUMBS_DOWN",
            Self::Laugh => "LAUGH",
            Self::Hooray => "HOORAY",
            Self::Confused => "CONFUSED",
            Self::Heart => "HEART",
            Self::Rocket => "ROCKET",
            Self::Eyes => "EYES",
        }
    }
}

impl Display for ReactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = DomainError;

    /// Accepts wire names (`THUMBS_UP`) and the short aliases used in
    /// comment UIs (`+1`, `-1`, `tada`, ...), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase().replace('-', "_");
        let kind = match lowered.as_str() {
            "thumbs_up" | "+1" | "thumbsup" => Self::ThumbsUp,
            "thumbs_down" | "_1" | "thumbsdown" => Self::ThumbsDown,
            "laugh" => Self::Laugh,
            "hooray" | "tada" => Self::Hooray,
            "confused" => Self::Confused,
            "heart" => Self::Heart,
            "rocket" => Self::Rocket,
            "eyes" => Self::Eyes,
            _ => return Err(DomainError::InvalidReaction(s.to_string())),
        };
        Ok(kind)
    }
}

// ============================================================================
// Comment
// ============================================================================

/// One authored message within a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Remote comment ID (or a placeholder for optimistic comments)
    pub id: CommentId,
    /// Login of the author
    pub author: String,
    /// Markdown body, possibly multi-line
    pub body: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Reaction counts keyed by kind
    #[serde(default)]
    pub reactions: BTreeMap<ReactionKind, u32>,
}

impl Comment {
    /// Creates a comment with no reactions
    pub fn new(
        id: CommentId,
        author: impl Into<String>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author: author.into(),
            body: body.into(),
            created_at,
            reactions: BTreeMap::new(),
        }
    }

    /// Total number of reactions across all kinds
    #[must_use]
    pub fn reaction_total(&self) -> u32 {
        self.reactions.values().sum()
    }
}

// ============================================================================
// ReviewThread
// ============================================================================

/// Wire-level record of a thread
///
/// `ReviewThread` serializes through this shape so that every deserialized
/// thread passes the same invariant checks as one built in code. Adapters
/// fill a record and convert it with `ReviewThread::try_from`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub id: ThreadId,
    pub path: FilePath,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default)]
    pub side: DiffSide,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub is_outdated: bool,
    pub comments: Vec<Comment>,
}

/// A comment conversation anchored to a location in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThreadRecord", into = "ThreadRecord")]
pub struct ReviewThread {
    id: ThreadId,
    path: FilePath,
    line: u32,
    start_line: Option<u32>,
    side: DiffSide,
    is_resolved: bool,
    is_outdated: bool,
    comments: Vec<Comment>,
}

impl ReviewThread {
    /// Creates a single-line, unresolved, current thread
    ///
    /// # Errors
    /// Returns an error if the path normalizes to nothing, the line is 0,
    /// or there are no comments.
    pub fn new(
        id: ThreadId,
        path: FilePath,
        line: u32,
        side: DiffSide,
        comments: Vec<Comment>,
    ) -> Result<Self, DomainError> {
        if path.is_empty() {
            return Err(DomainError::InvalidPath(format!(
                "Thread {id} has an empty path"
            )));
        }
        if line == 0 {
            return Err(DomainError::InvalidLine(format!(
                "Thread {id} is anchored at line 0; lines are 1-based"
            )));
        }
        if comments.is_empty() {
            return Err(DomainError::EmptyThread(id.to_string()));
        }

        Ok(Self {
            id,
            path,
            line,
            start_line: None,
            side,
            is_resolved: false,
            is_outdated: false,
            comments,
        })
    }

    /// Turns the thread into a multi-line span starting at `start_line`
    ///
    /// A start equal to the anchor line is kept as a single-line thread.
    ///
    /// # Errors
    /// Returns an error if `start_line` is 0 or past the anchor line.
    pub fn with_start_line(mut self, start_line: Option<u32>) -> Result<Self, DomainError> {
        self.start_line = validate_span(start_line, self.line)?;
        Ok(self)
    }

    /// Sets the resolved flag
    #[must_use]
    pub fn with_resolved(mut self, resolved: bool) -> Self {
        self.is_resolved = resolved;
        self
    }

    /// Sets the outdated flag
    #[must_use]
    pub fn with_outdated(mut self, outdated: bool) -> Self {
        self.is_outdated = outdated;
        self
    }

    #[must_use]
    pub fn id(&self) -> &ThreadId {
        &self.id
    }

    #[must_use]
    pub fn path(&self) -> &FilePath {
        &self.path
    }

    /// Anchor line (last line of the span)
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn start_line(&self) -> Option<u32> {
        self.start_line
    }

    /// Inclusive `(first, last)` line range covered by the thread
    #[must_use]
    pub fn span(&self) -> (u32, u32) {
        (self.start_line.unwrap_or(self.line), self.line)
    }

    #[must_use]
    pub fn is_multiline(&self) -> bool {
        self.start_line.is_some()
    }

    #[must_use]
    pub fn side(&self) -> DiffSide {
        self.side
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.is_resolved
    }

    #[must_use]
    pub fn is_outdated(&self) -> bool {
        self.is_outdated
    }

    /// Whether the thread is an optimistic placeholder awaiting reconciliation
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.id.is_placeholder()
    }

    /// Comments in chronological order (never empty)
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// First comment, which opened the thread
    #[must_use]
    pub fn root_comment(&self) -> Option<&Comment> {
        self.comments.first()
    }

    /// Most recent comment regardless of author
    #[must_use]
    pub fn last_comment(&self) -> Option<&Comment> {
        self.comments.last()
    }

    /// Most recent comment written by `author`
    #[must_use]
    pub fn last_comment_by(&self, author: &str) -> Option<&Comment> {
        self.comments.iter().rev().find(|c| c.author == author)
    }
}

fn validate_span(start_line: Option<u32>, line: u32) -> Result<Option<u32>, DomainError> {
    match start_line {
        None => Ok(None),
        Some(0) => Err(DomainError::InvalidLine(
            "start line must be 1-based".to_string(),
        )),
        Some(start) if start > line => Err(DomainError::InvalidSpan { start, line }),
        Some(start) if start == line => Ok(None),
        Some(start) => Ok(Some(start)),
    }
}

impl TryFrom<ThreadRecord> for ReviewThread {
    type Error = DomainError;

    fn try_from(record: ThreadRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(
            record.id,
            record.path,
            record.line,
            record.side,
            record.comments,
        )?
        .with_start_line(record.start_line)?
        .with_resolved(record.is_resolved)
        .with_outdated(record.is_outdated))
    }
}

impl From<ReviewThread> for ThreadRecord {
    fn from(thread: ReviewThread) -> Self {
        Self {
            id: thread.id,
            path: thread.path,
            line: thread.line,
            start_line: thread.start_line,
            side: thread.side,
            is_resolved: thread.is_resolved,
            is_outdated: thread.is_outdated,
            comments: thread.comments,
        }
    }
}
