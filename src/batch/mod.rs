//! Batch mutations with partial-failure aggregation.
//!
//! The store only supports one-at-a-time operations; this layer sequences
//! multi-item work and reports both outcome partitions instead of escalating
//! a partial failure into a total one. The only error these functions return
//! themselves is a local precondition failure (empty input), raised before
//! any network call.
//!
//! Uploads run strictly sequentially to bound backend load and keep progress
//! reporting deterministic; deletes and renames have no cross-item ordering
//! dependency and are dispatched concurrently, so their reports are keyed by
//! path, never by position.

use futures::future::join_all;
use tracing::debug;

use crate::error::{Result, StowageError};
use crate::path;
use crate::store::{RemoteStore, UploadedFileRef};

/// One file queued for upload.
#[derive(Debug, Clone)]
pub struct UploadSource {
    /// Target filename.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadSource {
    /// Create a new upload source.
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// A failed upload, paired with its error.
#[derive(Debug)]
pub struct UploadFailure {
    /// Filename that failed to upload.
    pub name: String,
    /// The error for this file.
    pub error: StowageError,
}

/// Aggregate result of a multi-file upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Uploads that succeeded, in submission order.
    pub succeeded: Vec<UploadedFileRef>,
    /// Uploads that failed, in submission order.
    pub failed: Vec<UploadFailure>,
}

impl UploadReport {
    /// True if every upload succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A failed bulk item, keyed by path.
#[derive(Debug)]
pub struct BulkFailure {
    /// The path the operation failed for.
    pub path: String,
    /// The error for this path.
    pub error: StowageError,
}

/// Aggregate result of a concurrent bulk operation.
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Number of items that succeeded.
    pub succeeded: usize,
    /// Items that failed, keyed by path.
    pub failed: Vec<BulkFailure>,
}

impl BulkReport {
    /// True if every item succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// The paths that failed.
    pub fn failed_paths(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Upload files into `dest_path`, strictly one after another.
///
/// Every file is attempted; a failure never aborts the remainder. The caller
/// refreshes the listing once after the whole batch.
pub async fn upload_many<S: RemoteStore + ?Sized>(
    store: &S,
    sources: Vec<UploadSource>,
    dest_path: &str,
) -> Result<UploadReport> {
    if sources.is_empty() {
        return Err(StowageError::InvalidArgument(
            "no files to upload".to_string(),
        ));
    }

    let total = sources.len();
    let mut report = UploadReport::default();
    for (index, source) in sources.into_iter().enumerate() {
        let UploadSource { name, content } = source;
        debug!(name = %name, index, total, "uploading batch item");
        match store.upload_file(&name, content, dest_path).await {
            Ok(uploaded) => report.succeeded.push(uploaded),
            Err(error) => report.failed.push(UploadFailure { name, error }),
        }
    }

    Ok(report)
}

/// Delete every path, concurrently, and wait for all to settle.
pub async fn bulk_delete<S: RemoteStore + ?Sized>(
    store: &S,
    paths: &[String],
) -> Result<BulkReport> {
    if paths.is_empty() {
        return Err(StowageError::InvalidArgument(
            "selection is empty".to_string(),
        ));
    }

    let outcomes = join_all(paths.iter().map(|p| async move {
        let result = store.delete_file(p).await;
        (p.clone(), result)
    }))
    .await;

    Ok(aggregate(outcomes))
}

/// Rename every path to `prefix + original name`, concurrently.
///
/// No collision pre-check: a collision surfaces as the backend's error for
/// that specific path.
pub async fn bulk_rename_with_prefix<S: RemoteStore + ?Sized>(
    store: &S,
    paths: &[String],
    prefix: &str,
) -> Result<BulkReport> {
    if paths.is_empty() {
        return Err(StowageError::InvalidArgument(
            "selection is empty".to_string(),
        ));
    }

    let outcomes = join_all(paths.iter().map(|p| async move {
        let new_name = format!("{prefix}{}", path::file_name(p).unwrap_or_default());
        let result = store.rename_file(p, &new_name).await;
        (p.clone(), result)
    }))
    .await;

    Ok(aggregate(outcomes))
}

fn aggregate(outcomes: Vec<(String, Result<()>)>) -> BulkReport {
    let mut report = BulkReport::default();
    for (path, result) in outcomes {
        match result {
            Ok(()) => report.succeeded += 1,
            Err(error) => report.failed.push(BulkFailure { path, error }),
        }
    }
    report
}
