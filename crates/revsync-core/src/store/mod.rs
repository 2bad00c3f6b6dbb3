//! Session-scoped thread index
//!
//! The [`ThreadStore`] holds the local snapshot of every thread of the
//! review under inspection, plus a per-file index used by renderers and
//! navigation.
//!
//! ## Consistency rules
//!
//! - The per-file index is always exactly reconstructible from the full list.
//!   [`replace_all`](ThreadStore::replace_all) and [`clear`](ThreadStore::clear)
//!   rebuild it from scratch; it is never patched in place.
//! - [`insert_optimistic`](ThreadStore::insert_optimistic) appends to both the
//!   list and the file bucket, which keeps the two consistent without a rebuild.
//! - Keys are always [`FilePath`]s, so raw, un-normalized paths can never be
//!   used to index the store.

pub mod navigation;

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{normalize_path, FilePath, ReviewThread, ThreadId};

/// Local snapshot of all threads of one review
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadStore {
    /// Every thread in fetch / insertion order
    threads: Vec<ReviewThread>,
    /// Normalized path -> positions in `threads`, in insertion order
    by_file: HashMap<FilePath, Vec<usize>>,
}

impl ThreadStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a fetched snapshot
    #[must_use]
    pub fn from_threads(threads: Vec<ReviewThread>) -> Self {
        let mut store = Self::new();
        store.replace_all(threads);
        store
    }

    /// Replaces the whole snapshot and rebuilds the per-file index.
    ///
    /// Both fields are assigned together while the caller holds `&mut self`,
    /// so readers never observe a list and an index from different snapshots.
    pub fn replace_all(&mut self, threads: Vec<ReviewThread>) {
        let by_file = index_by_file(&threads);
        debug!(
            threads = threads.len(),
            files = by_file.len(),
            "Replacing thread snapshot"
        );
        self.threads = threads;
        self.by_file = by_file;
    }

    /// Empties the store. Calling it repeatedly is a no-op.
    pub fn clear(&mut self) {
        self.threads.clear();
        self.by_file.clear();
    }

    /// Appends a locally synthesized thread ahead of remote confirmation.
    ///
    /// The thread lands at the end of both the full list and its file bucket
    /// (the bucket is created when the file had no threads yet).
    pub fn insert_optimistic(&mut self, thread: ReviewThread) {
        let position = self.threads.len();
        debug!(
            id = %thread.id(),
            path = %thread.path(),
            line = thread.line(),
            "Inserting optimistic thread"
        );
        self.by_file
            .entry(thread.path().clone())
            .or_default()
            .push(position);
        self.threads.push(thread);
    }

    /// Threads anchored in `path`, in insertion order.
    ///
    /// `path` is normalized first; an unknown file yields an empty vector.
    #[must_use]
    pub fn get_for_file(&self, path: &str) -> Vec<&ReviewThread> {
        self.by_file
            .get(normalize_path(path))
            .map(|positions| positions.iter().map(|&i| &self.threads[i]).collect())
            .unwrap_or_default()
    }

    /// First thread in `path` anchored exactly at `line`.
    ///
    /// Two independent threads may share an anchor line; this returns the one
    /// inserted first. Use [`get_all_at_line`](Self::get_all_at_line) to see
    /// every thread on a line.
    #[must_use]
    pub fn get_at_line(&self, path: &str, line: u32) -> Option<&ReviewThread> {
        self.get_for_file(path)
            .into_iter()
            .find(|thread| thread.line() == line)
    }

    /// Every thread in `path` anchored at `line`, in insertion order
    #[must_use]
    pub fn get_all_at_line(&self, path: &str, line: u32) -> Vec<&ReviewThread> {
        self.get_for_file(path)
            .into_iter()
            .filter(|thread| thread.line() == line)
            .collect()
    }

    /// Looks a thread up by identifier
    #[must_use]
    pub fn get(&self, id: &ThreadId) -> Option<&ReviewThread> {
        self.threads.iter().find(|thread| thread.id() == id)
    }

    /// Full list in fetch / insertion order
    #[must_use]
    pub fn all(&self) -> &[ReviewThread] {
        &self.threads
    }

    /// Files that currently carry at least one thread, sorted
    #[must_use]
    pub fn files(&self) -> Vec<&FilePath> {
        let mut files: Vec<&FilePath> = self.by_file.keys().collect();
        files.sort();
        files
    }

    /// Number of optimistic placeholders awaiting reconciliation
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.threads.iter().filter(|t| t.is_pending()).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

fn index_by_file(threads: &[ReviewThread]) -> HashMap<FilePath, Vec<usize>> {
    let mut by_file: HashMap<FilePath, Vec<usize>> = HashMap::new();
    for (position, thread) in threads.iter().enumerate() {
        by_file
            .entry(thread.path().clone())
            .or_default()
            .push(position);
    }
    by_file
}
