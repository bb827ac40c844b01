//! stowage - typed client for a path-addressed remote file store.
//!
//! Browsing and mutating a server-side folder hierarchy through a small HTTP
//! contract: a store client per endpoint family, one canonical
//! navigation/selection state model, and a batch layer that aggregates
//! partial failures instead of escalating them.

pub mod batch;
pub mod browser;
pub mod config;
pub mod error;
pub mod logging;
pub mod path;
pub mod store;

pub use batch::{
    bulk_delete, bulk_rename_with_prefix, upload_many, BulkFailure, BulkReport, UploadFailure,
    UploadReport, UploadSource,
};
pub use browser::{DirectoryBrowser, LoadTicket, SelectionSet};
pub use config::Config;
pub use error::{Result, StowageError};
pub use path::{breadcrumb, Crumb, ROOT_LABEL};
pub use store::{
    format_size, AuthContext, DirectoryListing, FileEntry, FileKind, FileList, RemoteStore,
    StoreClient, UploadedFileRef, WebhookClient, WebhookEnvelope,
};
