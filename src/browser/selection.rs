//! Multi-select set for bulk operations.

use std::collections::HashSet;

use crate::store::DirectoryListing;

/// Set of file paths marked for a bulk operation.
///
/// Client-local and ephemeral: cleared on multi-select exit, on navigation,
/// and after a fully successful bulk action. A path may only be a member
/// while it appears in the most recently loaded listing's files; stale
/// members are pruned on every reload.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    paths: HashSet<String>,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of selected paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether a path is selected.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Toggle a path; returns the new membership state.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.to_string());
            true
        }
    }

    /// Insert a path.
    pub fn insert(&mut self, path: &str) {
        self.paths.insert(path.to_string());
    }

    /// Remove a path.
    pub fn remove(&mut self, path: &str) {
        self.paths.remove(path);
    }

    /// Clear the whole selection.
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Drop every member not present in the listing's files.
    pub fn retain_listed(&mut self, listing: &DirectoryListing) {
        self.paths
            .retain(|p| listing.files.iter().any(|f| f.path == *p));
    }

    /// Snapshot of the selected paths.
    pub fn paths(&self) -> Vec<String> {
        self.paths.iter().cloned().collect()
    }
}
