//! Completion markers and per-article claims
//!
//! An article is complete iff `<output>/<id>/index.json` exists. The marker
//! file's existence is the sole signal consulted on re-runs; its content is
//! never validated. `ClaimRegistry` closes the window where two URLs that
//! resolve to the same article id are processed at the same time.

use crate::site::ArticleId;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Read-only view over which articles already carry a completion marker
#[derive(Debug, Clone)]
pub struct CompletionIndex {
    root: PathBuf,
}

impl CompletionIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root all article directories live under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one article's marker and image files
    pub fn article_dir(&self, id: ArticleId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Path of the completion marker for one article
    pub fn marker_path(&self, id: ArticleId) -> PathBuf {
        self.article_dir(id).join("index.json")
    }

    /// Whether the article was fully archived by a previous visit
    pub fn is_complete(&self, id: ArticleId) -> bool {
        self.marker_path(id).is_file()
    }
}

/// In-process registry of article ids currently being processed
///
/// Two discovered URLs can resolve to the same article id. Claiming the id
/// before any extraction work turns the check-then-act `exists()` test into
/// an atomic step: the loser sees `None` and leaves the page for a later run.
#[derive(Debug, Clone, Default)]
pub struct ClaimRegistry {
    inner: Arc<Mutex<HashSet<u64>>>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to claim an article id for the duration of the returned guard
    ///
    /// Returns `None` when another worker already holds the claim.
    pub fn claim(&self, id: ArticleId) -> Option<Claim> {
        let mut held = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !held.insert(id.get()) {
            return None;
        }
        Some(Claim {
            id: id.get(),
            registry: Arc::clone(&self.inner),
        })
    }
}

/// Guard for a claimed article id; the claim is released on drop
#[derive(Debug)]
pub struct Claim {
    id: u64,
    registry: Arc<Mutex<HashSet<u64>>>,
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut held = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        held.remove(&self.id);
    }
}
