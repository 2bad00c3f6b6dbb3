//! Path normalization
//!
//! Remote review services and diff hosts disagree on how they spell a file
//! path (`./src/lib.rs`, `src/lib.rs`, `src/`). Every store key goes through
//! [`normalize_path`] so that both sides compare equal.
//!
//! Normalization strips leading `./` segments and any trailing run of `/`.
//! It only ever slices its input, so it never allocates and never fails.

use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Canonicalizes a file path for use as a store key.
///
/// Leading `./` segments are removed repeatedly so the function is
/// idempotent: `normalize_path(normalize_path(p)) == normalize_path(p)`.
///
/// ```
/// use revsync_core::domain::normalize_path;
///
/// assert_eq!(normalize_path("./src/main.rs"), "src/main.rs");
/// assert_eq!(normalize_path("docs/"), "docs");
/// assert_eq!(normalize_path("src/main.rs"), "src/main.rs");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.trim_end_matches('/')
}

/// Absent-aware variant of [`normalize_path`]: `None` passes through.
#[must_use]
pub fn normalize_opt(path: Option<&str>) -> Option<&str> {
    path.map(normalize_path)
}

/// A normalized file path, the only key type accepted by the thread store.
///
/// Construction always runs [`normalize_path`], so two `FilePath`s built
/// from different spellings of the same file are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FilePath(String);

impl FilePath {
    /// Builds a normalized path
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self(normalize_path(path).to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether normalization left nothing (e.g. `""`, `"./"`, `"/"`)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for FilePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for FilePath {
    fn from(path: String) -> Self {
        if normalize_path(&path).len() == path.len() {
            Self(path)
        } else {
            Self::new(&path)
        }
    }
}

impl From<FilePath> for String {
    fn from(path: FilePath) -> Self {
        path.0
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FilePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}
