//! Direct-API client for the remote file store.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, StowageError};
use crate::path;

use super::auth::AuthContext;
use super::types::{
    DirectoryListing, FileList, FolderCreate, FolderRename, UploadedFileRef,
};
use super::{RemoteStore, DEFAULT_MAX_UPLOAD_SIZE};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for store requests.
const USER_AGENT: &str = "stowage/0.1";

/// Client for the direct (`/api/...`) endpoint family.
pub struct StoreClient {
    client: Client,
    base_url: String,
    auth: AuthContext,
    max_upload_size: u64,
}

impl StoreClient {
    /// Create a new client with default timeouts.
    pub fn new(base_url: &str, auth: AuthContext) -> Result<Self> {
        Self::with_timeouts(
            base_url,
            auth,
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            Duration::from_secs(TOTAL_TIMEOUT_SECS),
            MAX_REDIRECTS,
        )
    }

    /// Create a new client from the application configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::with_timeouts(
            &config.api.base_url,
            AuthContext::from_config_token(&config.auth.access_token),
            Duration::from_secs(config.api.connect_timeout_secs),
            Duration::from_secs(config.api.total_timeout_secs),
            config.api.max_redirects,
        )?;
        Ok(client.with_max_upload_size(config.upload.max_upload_size_mb * 1024 * 1024))
    }

    /// Create a new client with explicit timeouts.
    pub fn with_timeouts(
        base_url: &str,
        auth: AuthContext,
        connect_timeout: Duration,
        total_timeout: Duration,
        max_redirects: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(total_timeout)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StowageError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        })
    }

    /// Set a custom advisory upload size ceiling in bytes.
    pub fn with_max_upload_size(mut self, max_size: u64) -> Self {
        self.max_upload_size = max_size;
        self
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}{}", self.base_url, suffix)
    }

    /// Turn a failure status into an `Http` error carrying the body.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StowageError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StowageError::Decode(e.to_string()))
    }

    async fn read_ok(response: Response) -> Result<()> {
        Self::check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for StoreClient {
    async fn list_directory(&self, path: &str) -> Result<DirectoryListing> {
        debug!(path, "listing directory");
        let mut request = self.client.get(self.endpoint("/api/folders/status"));
        // The root is "no parameter", never an empty-string parameter, to
        // keep it distinct from a folder literally named "".
        if !path.is_empty() {
            request = request.query(&[("folder_path", path)]);
        }
        let response = self.auth.apply(request).send().await?;
        Self::read_json(response).await
    }

    async fn list_all_files(&self, path: &str) -> Result<FileList> {
        debug!(path, "listing all files");
        let mut request = self.client.get(self.endpoint("/api/files/list"));
        if !path.is_empty() {
            request = request.query(&[("folder_path", path)]);
        }
        let response = self.auth.apply(request).send().await?;
        Self::read_json(response).await
    }

    async fn upload_file(
        &self,
        name: &str,
        content: Vec<u8>,
        dest_path: &str,
    ) -> Result<UploadedFileRef> {
        if content.len() as u64 > self.max_upload_size {
            let max_mb = self.max_upload_size / 1024 / 1024;
            return Err(StowageError::Validation(format!(
                "file too large: {} bytes (max {max_mb}MB)",
                content.len()
            )));
        }

        debug!(name, dest_path, size = content.len(), "uploading file");
        let part = Part::bytes(content).file_name(name.to_string());
        let form = Form::new()
            .part("file", part)
            .text("folder_path", dest_path.to_string());

        let request = self.client.post(self.endpoint("/api/files/upload")).multipart(form);
        let response = self.auth.apply(request).send().await?;
        Self::read_json(response).await
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        debug!(path, "deleting file");
        let request = self
            .client
            .delete(self.endpoint("/api/files"))
            .query(&[("file_path", path)]);
        let response = self.auth.apply(request).send().await?;
        Self::read_ok(response).await
    }

    async fn rename_file(&self, path: &str, new_name: &str) -> Result<()> {
        debug!(path, new_name, "renaming file");
        let request = self
            .client
            .put(self.endpoint("/api/files/rename"))
            .query(&[("old_path", path), ("new_name", new_name)]);
        let response = self.auth.apply(request).send().await?;
        Self::read_ok(response).await
    }

    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<()> {
        debug!(parent_path, name, "creating folder");
        let body = FolderCreate {
            name: name.to_string(),
            parent_path: parent_path.to_string(),
        };
        let request = self.client.post(self.endpoint("/api/folders")).json(&body);
        let response = self.auth.apply(request).send().await?;
        Self::read_ok(response).await
    }

    async fn delete_folder(&self, path: &str) -> Result<()> {
        debug!(path, "deleting folder");
        let request = self
            .client
            .delete(self.endpoint("/api/folders"))
            .query(&[("folder_path", path)]);
        let response = self.auth.apply(request).send().await?;
        Self::read_ok(response).await
    }

    async fn rename_folder(
        &self,
        parent_path: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        debug!(parent_path, old_name, new_name, "renaming folder");
        let body = FolderRename {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            parent_path: parent_path.to_string(),
        };
        let request = self
            .client
            .put(self.endpoint("/api/folders/rename"))
            .json(&body);
        let response = self.auth.apply(request).send().await?;
        Self::read_ok(response).await
    }

    fn download_url(&self, path: &str) -> String {
        let encoded = path::segments(path)
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/api/files/download/{}", self.base_url, encoded)
    }
}
