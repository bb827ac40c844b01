//! Remote store clients for the file-storage backend.
//!
//! Two endpoint families expose the same operations:
//! - the direct API (`/api/...`, REST verbs), implemented by [`StoreClient`]
//! - the webhook variant (`/webhook/...`, POST for writes, enveloped
//!   responses), implemented by [`WebhookClient`]
//!
//! Both implement [`RemoteStore`], the seam the navigation model and the
//! bulk-mutation layer are written against.

mod auth;
mod client;
mod types;
mod webhook;

pub use auth::AuthContext;
pub use client::StoreClient;
pub use types::{
    format_size, DirectoryListing, FileEntry, FileKind, FileList, FolderCreate, FolderRename,
    UploadedFileRef, WebhookEnvelope,
};
pub use webhook::WebhookClient;

use async_trait::async_trait;

use crate::Result;

/// Default advisory upload size ceiling (100MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Operations against the remote file store.
///
/// All write operations are fire-and-wait: nothing is mutated locally, and
/// callers re-list the affected directory after a success. A repeat delete of
/// an already-deleted path surfaces the backend's 404 rather than being
/// swallowed.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List the direct children of a directory. The root is addressed by the
    /// empty path and encoded as the absence of the query parameter.
    async fn list_directory(&self, path: &str) -> Result<DirectoryListing>;

    /// List all files at or below a path.
    async fn list_all_files(&self, path: &str) -> Result<FileList>;

    /// Upload one file into `dest_path`. Multi-file sequencing belongs to the
    /// batch layer, not here.
    async fn upload_file(
        &self,
        name: &str,
        content: Vec<u8>,
        dest_path: &str,
    ) -> Result<UploadedFileRef>;

    /// Delete a file by absolute path.
    async fn delete_file(&self, path: &str) -> Result<()>;

    /// Rename a file in place; `new_name` is a bare name, the backend
    /// computes the destination path.
    async fn rename_file(&self, path: &str, new_name: &str) -> Result<()>;

    /// Create a folder under `parent_path`.
    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<()>;

    /// Delete a folder by absolute path.
    async fn delete_folder(&self, path: &str) -> Result<()>;

    /// Rename a folder under `parent_path`.
    async fn rename_folder(&self, parent_path: &str, old_name: &str, new_name: &str)
        -> Result<()>;

    /// Build the download URL for a file path. Pure; no network call.
    fn download_url(&self, path: &str) -> String;
}
