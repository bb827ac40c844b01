//! The canonical navigation and selection state model.
//!
//! One `DirectoryBrowser` replaces the per-surface copies of path, listing,
//! and selection state. It owns the load/refresh cycle: a path change or a
//! successful mutation triggers a full re-list of the current directory, and
//! a listing is only ever replaced wholesale.
//!
//! Loads are issued as tickets so that responses arriving for a directory
//! the user has already left are discarded instead of clobbering the new
//! listing. The async convenience methods wrap the awaited call between the
//! issue and apply steps; the ticket API is public for callers that
//! interleave loads themselves.

use std::sync::Arc;

use tracing::debug;

use crate::batch::{self, BulkReport, UploadReport, UploadSource};
use crate::error::{Result, StowageError};
use crate::path::{self, Crumb};
use crate::store::{DirectoryListing, RemoteStore};

use super::selection::SelectionSet;

/// Handle for one in-flight listing load.
///
/// Created by [`DirectoryBrowser::begin_navigation`] or
/// [`DirectoryBrowser::begin_refresh`] and consumed by
/// [`DirectoryBrowser::apply_load`]. A ticket whose generation has been
/// superseded applies as a silent no-op.
#[derive(Debug)]
pub struct LoadTicket {
    path: String,
    generation: u64,
}

impl LoadTicket {
    /// The path this load was issued for.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Navigation and selection state over a remote store.
pub struct DirectoryBrowser<S> {
    store: Arc<S>,
    current_path: String,
    listing: Option<DirectoryListing>,
    loading: bool,
    selection: SelectionSet,
    multi_select: bool,
    generation: u64,
}

impl<S: RemoteStore> DirectoryBrowser<S> {
    /// Create a browser positioned at the root, with nothing loaded yet.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            current_path: String::new(),
            listing: None,
            loading: false,
            selection: SelectionSet::new(),
            multi_select: false,
            generation: 0,
        }
    }

    /// The current directory path (`""` for the root).
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// The most recently applied listing, if any. Kept stale-but-visible
    /// across failed loads so the view never flashes empty.
    pub fn listing(&self) -> Option<&DirectoryListing> {
        self.listing.as_ref()
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether multi-select mode is active.
    pub fn multi_select_active(&self) -> bool {
        self.multi_select
    }

    /// The current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Breadcrumb trail for the current path.
    pub fn breadcrumbs(&self) -> Vec<Crumb> {
        path::breadcrumb(&self.current_path)
    }

    // ------------------------------------------------------------------
    // Load cycle
    // ------------------------------------------------------------------

    /// Commit a navigation and issue a load ticket for the target path.
    ///
    /// The current path changes immediately and the selection is cleared;
    /// the listing only changes once the matching [`apply_load`] succeeds.
    ///
    /// [`apply_load`]: DirectoryBrowser::apply_load
    pub fn begin_navigation(&mut self, target: &str) -> LoadTicket {
        let target = path::normalize(target);
        self.current_path = target.clone();
        self.selection.clear();
        self.loading = true;
        self.generation += 1;
        LoadTicket {
            path: target,
            generation: self.generation,
        }
    }

    /// Issue a load ticket for the current path without touching the
    /// selection.
    pub fn begin_refresh(&mut self) -> LoadTicket {
        self.loading = true;
        self.generation += 1;
        LoadTicket {
            path: self.current_path.clone(),
            generation: self.generation,
        }
    }

    /// Apply the result of a load.
    ///
    /// Returns `Ok(true)` when the listing was replaced, `Ok(false)` when
    /// the ticket was stale and the response discarded. A failed load for a
    /// current ticket surfaces its error and leaves the previous listing in
    /// place.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DirectoryListing>,
    ) -> Result<bool> {
        if ticket.generation != self.generation {
            debug!(path = %ticket.path, "discarding stale listing response");
            return Ok(false);
        }

        self.loading = false;
        match result {
            Ok(listing) => {
                self.selection.retain_listed(&listing);
                self.listing = Some(listing);
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    /// Navigate to a path and load its listing.
    pub async fn navigate_to(&mut self, target: &str) -> Result<()> {
        let ticket = self.begin_navigation(target);
        let store = Arc::clone(&self.store);
        let result = store.list_directory(ticket.path()).await;
        self.apply_load(ticket, result).map(|_| ())
    }

    /// Navigate into a child folder of the current directory.
    pub async fn navigate_into(&mut self, folder_name: &str) -> Result<()> {
        let target = path::join(&self.current_path, folder_name);
        self.navigate_to(&target).await
    }

    /// Navigate to the parent directory. A no-op at the root.
    pub async fn navigate_up(&mut self) -> Result<()> {
        if self.current_path.is_empty() {
            return Ok(());
        }
        let target = path::parent(&self.current_path);
        self.navigate_to(&target).await
    }

    /// Reload the current directory.
    pub async fn refresh(&mut self) -> Result<()> {
        let ticket = self.begin_refresh();
        let store = Arc::clone(&self.store);
        let result = store.list_directory(ticket.path()).await;
        self.apply_load(ticket, result).map(|_| ())
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Enter multi-select mode.
    pub fn enter_multi_select(&mut self) {
        self.multi_select = true;
    }

    /// Exit multi-select mode; always clears the selection.
    pub fn exit_multi_select(&mut self) {
        self.multi_select = false;
        self.selection.clear();
    }

    /// Toggle a file path in the selection; returns the new membership
    /// state. Paths not present in the loaded listing are ignored.
    pub fn toggle_selected(&mut self, file_path: &str) -> bool {
        let listed = self
            .listing
            .as_ref()
            .is_some_and(|l| l.files.iter().any(|f| f.path == file_path));
        if !listed {
            return false;
        }
        self.selection.toggle(file_path)
    }

    /// Select every file in the loaded listing.
    pub fn select_all(&mut self) {
        if let Some(listing) = &self.listing {
            for file in &listing.files {
                self.selection.insert(&file.path);
            }
        }
    }

    /// Clear the selection without leaving multi-select mode.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ------------------------------------------------------------------
    // Mutations (wire call, then exactly one refresh)
    // ------------------------------------------------------------------

    /// Create a folder in the current directory.
    ///
    /// Fails fast with [`StowageError::Conflict`] when the loaded listing
    /// already carries a case-insensitive match; the check is advisory and
    /// the backend stays authoritative.
    pub async fn create_folder(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StowageError::InvalidArgument(
                "folder name is empty".to_string(),
            ));
        }

        if let Some(listing) = &self.listing {
            if listing.has_subfolder_named(name) {
                return Err(StowageError::Conflict(format!(
                    "folder \"{name}\" already exists here"
                )));
            }
        }

        let store = Arc::clone(&self.store);
        store.create_folder(&self.current_path, name).await?;
        self.refresh().await
    }

    /// Delete a file by absolute path.
    pub async fn delete_file(&mut self, file_path: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        store.delete_file(file_path).await?;
        self.refresh().await
    }

    /// Rename a file; `new_name` is a bare name.
    pub async fn rename_file(&mut self, file_path: &str, new_name: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        store.rename_file(file_path, new_name).await?;
        self.refresh().await
    }

    /// Delete a child folder of the current directory by name.
    pub async fn delete_folder(&mut self, folder_name: &str) -> Result<()> {
        let target = path::join(&self.current_path, folder_name);
        let store = Arc::clone(&self.store);
        store.delete_folder(&target).await?;
        self.refresh().await
    }

    /// Rename a child folder of the current directory.
    pub async fn rename_folder(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let store = Arc::clone(&self.store);
        store
            .rename_folder(&self.current_path, old_name, new_name)
            .await?;
        self.refresh().await
    }

    // ------------------------------------------------------------------
    // Bulk operations (delegate to the batch layer, then one refresh)
    // ------------------------------------------------------------------

    /// Upload a batch of files into the current directory, sequentially.
    pub async fn upload_many(&mut self, sources: Vec<UploadSource>) -> Result<UploadReport> {
        let store = Arc::clone(&self.store);
        let report = batch::upload_many(store.as_ref(), sources, &self.current_path).await?;
        self.refresh().await?;
        Ok(report)
    }

    /// Delete every selected file, concurrently, and reload once.
    ///
    /// The selection is cleared only when every delete succeeded; after a
    /// partial failure the reload prune keeps exactly the still-existing
    /// selected paths.
    pub async fn bulk_delete_selected(&mut self) -> Result<BulkReport> {
        let paths = self.selection.paths();
        let store = Arc::clone(&self.store);
        let report = batch::bulk_delete(store.as_ref(), &paths).await?;
        if report.failed.is_empty() {
            self.selection.clear();
        }
        self.refresh().await?;
        Ok(report)
    }

    /// Rename every selected file to `prefix + name`, concurrently, and
    /// reload once.
    pub async fn bulk_rename_selected(&mut self, prefix: &str) -> Result<BulkReport> {
        let paths = self.selection.paths();
        let store = Arc::clone(&self.store);
        let report = batch::bulk_rename_with_prefix(store.as_ref(), &paths, prefix).await?;
        if report.failed.is_empty() {
            self.selection.clear();
        }
        self.refresh().await?;
        Ok(report)
    }
}
