//! Wire types for the remote store protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path;

/// A file entry as reported by the backend.
///
/// Entries are owned by the backend; the client never mutates one in place,
/// only replaces the whole listing after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Display name (final path segment).
    pub name: String,
    /// Absolute path within the store, backend-supplied.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Backend-reported content type string.
    #[serde(rename = "type")]
    pub content_type: String,
}

/// The direct children of a directory, as returned by one listing call.
///
/// `subfolders` carries bare names, not full paths; use
/// [`DirectoryListing::subfolder_path`] whenever an absolute child reference
/// is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// The listed path.
    pub path: String,
    /// Files directly under the path.
    pub files: Vec<FileEntry>,
    /// Names of subfolders directly under the path.
    pub subfolders: Vec<String>,
}

impl DirectoryListing {
    /// An empty listing for the given path.
    pub fn empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            files: Vec::new(),
            subfolders: Vec::new(),
        }
    }

    /// Absolute path of a child folder of this listing.
    pub fn subfolder_path(&self, name: &str) -> String {
        path::join(&self.path, name)
    }

    /// True if the listing has neither files nor subfolders.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.subfolders.is_empty()
    }

    /// Whether a subfolder with the given name exists, compared
    /// case-insensitively.
    pub fn has_subfolder_named(&self, name: &str) -> bool {
        self.subfolders
            .iter()
            .any(|f| f.eq_ignore_ascii_case(name))
    }
}

/// Reference to a freshly uploaded file, as returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFileRef {
    /// Stored filename.
    pub filename: String,
    /// Absolute path of the stored file.
    pub path: String,
    /// Stored size in bytes.
    pub size: u64,
    /// Direct download URL.
    pub url: String,
}

/// Result of the recursive file-listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileList {
    /// All files at or below the requested path.
    pub files: Vec<FileEntry>,
    /// Total file count.
    pub count: usize,
}

/// Envelope shape shared by every webhook-family response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Whether the backend accepted the operation.
    pub success: bool,
    /// Human-readable outcome message.
    pub message: String,
    /// Operation-specific payload, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Request body for folder creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderCreate {
    /// New folder name (bare name, not a path).
    pub name: String,
    /// Parent path; empty for the root.
    pub parent_path: String,
}

/// Request body for folder renaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRename {
    /// Current folder name.
    pub old_name: String,
    /// New folder name.
    pub new_name: String,
    /// Parent path; empty for the root.
    pub parent_path: String,
}

/// Coarse file classification by extension, for display hints only.
///
/// The backend's `type` field stays authoritative; this is the client-side
/// fallback used when grouping or labelling entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Image files (jpg, png, gif, webp, ...).
    Image,
    /// Video files (mp4, mov, ...).
    Video,
    /// PDF documents.
    Pdf,
    /// Office documents.
    Document,
    /// Archives (zip, rar, ...).
    Archive,
    /// Everything else.
    Other,
}

impl FileKind {
    /// Classify a file name by its extension.
    pub fn from_name(name: &str) -> Self {
        let ext = name
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => FileKind::Image,
            "mp4" | "avi" | "mov" | "wmv" | "flv" => FileKind::Video,
            "pdf" => FileKind::Pdf,
            "doc" | "docx" => FileKind::Document,
            "zip" | "rar" => FileKind::Archive,
            _ => FileKind::Other,
        }
    }

    /// Display label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Image => "Image",
            FileKind::Video => "Video",
            FileKind::Pdf => "PDF",
            FileKind::Document => "Document",
            FileKind::Archive => "Archive",
            FileKind::Other => "File",
        }
    }
}

/// Format a byte count for display (binary units, two decimals).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    // Trim trailing zeros the way a float display would
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}
