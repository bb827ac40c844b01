//! Webhook-variant client for the remote file store.
//!
//! The webhook family mirrors the direct API with identical semantics but a
//! different wire shape: writes are always POST, and every response is a
//! [`WebhookEnvelope`] whose `success` flag carries the outcome. A rejected
//! operation surfaces with the same error taxonomy as the direct family.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, StowageError};
use crate::path;

use super::auth::AuthContext;
use super::types::{
    DirectoryListing, FileList, FolderCreate, FolderRename, UploadedFileRef, WebhookEnvelope,
};
use super::{RemoteStore, DEFAULT_MAX_UPLOAD_SIZE};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for webhook requests.
const USER_AGENT: &str = "stowage/0.1 (webhook)";

/// Client for the webhook (`/webhook/...`) endpoint family.
pub struct WebhookClient {
    client: Client,
    base_url: String,
    auth: AuthContext,
    max_upload_size: u64,
}

impl WebhookClient {
    /// Create a new client with default timeouts.
    pub fn new(base_url: &str, auth: AuthContext) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
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

    /// Create a new client from the application configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::new(
            &config.api.base_url,
            AuthContext::from_config_token(&config.auth.access_token),
        )?;
        Ok(client.with_max_upload_size(config.upload.max_upload_size_mb * 1024 * 1024))
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

    /// Read a response as an envelope and enforce the `success` flag.
    async fn read_envelope(response: Response) -> Result<WebhookEnvelope> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StowageError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = response
            .json::<WebhookEnvelope>()
            .await
            .map_err(|e| StowageError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(StowageError::Http {
                status: status.as_u16(),
                body: envelope.message,
            });
        }

        Ok(envelope)
    }

    /// Extract the typed payload from an envelope's `data` field.
    fn decode_data<T: DeserializeOwned>(envelope: WebhookEnvelope) -> Result<T> {
        let data = envelope
            .data
            .ok_or_else(|| StowageError::Decode("envelope has no data payload".to_string()))?;
        serde_json::from_value(data).map_err(|e| StowageError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteStore for WebhookClient {
    async fn list_directory(&self, path: &str) -> Result<DirectoryListing> {
        debug!(path, "listing directory via webhook");
        let mut request = self.client.get(self.endpoint("/webhook/folders/status"));
        if !path.is_empty() {
            request = request.query(&[("folder_path", path)]);
        }
        let response = self.auth.apply(request).send().await?;
        let envelope = Self::read_envelope(response).await?;
        Self::decode_data(envelope)
    }

    async fn list_all_files(&self, path: &str) -> Result<FileList> {
        // Recursive listing has no webhook variant; the direct endpoint
        // serves both families.
        debug!(path, "listing all files");
        let mut request = self.client.get(self.endpoint("/api/files/list"));
        if !path.is_empty() {
            request = request.query(&[("folder_path", path)]);
        }
        let response = self.auth.apply(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StowageError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<FileList>()
            .await
            .map_err(|e| StowageError::Decode(e.to_string()))
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

        debug!(name, dest_path, size = content.len(), "uploading file via webhook");
        let part = reqwest::multipart::Part::bytes(content).file_name(name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder_path", dest_path.to_string());

        let request = self
            .client
            .post(self.endpoint("/webhook/files/upload"))
            .multipart(form);
        let response = self.auth.apply(request).send().await?;
        let envelope = Self::read_envelope(response).await?;
        Self::decode_data(envelope)
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        debug!(path, "deleting file via webhook");
        let request = self
            .client
            .post(self.endpoint("/webhook/files/delete"))
            .query(&[("file_path", path)]);
        let response = self.auth.apply(request).send().await?;
        Self::read_envelope(response).await?;
        Ok(())
    }

    async fn rename_file(&self, path: &str, new_name: &str) -> Result<()> {
        debug!(path, new_name, "renaming file via webhook");
        let request = self
            .client
            .post(self.endpoint("/webhook/files/rename"))
            .query(&[("old_path", path), ("new_name", new_name)]);
        let response = self.auth.apply(request).send().await?;
        Self::read_envelope(response).await?;
        Ok(())
    }

    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<()> {
        debug!(parent_path, name, "creating folder via webhook");
        let body = FolderCreate {
            name: name.to_string(),
            parent_path: parent_path.to_string(),
        };
        let request = self
            .client
            .post(self.endpoint("/webhook/folders/create"))
            .json(&body);
        let response = self.auth.apply(request).send().await?;
        Self::read_envelope(response).await?;
        Ok(())
    }

    async fn delete_folder(&self, path: &str) -> Result<()> {
        debug!(path, "deleting folder via webhook");
        let request = self
            .client
            .post(self.endpoint("/webhook/folders/delete"))
            .query(&[("folder_path", path)]);
        let response = self.auth.apply(request).send().await?;
        Self::read_envelope(response).await?;
        Ok(())
    }

    async fn rename_folder(
        &self,
        parent_path: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        debug!(parent_path, old_name, new_name, "renaming folder via webhook");
        let body = FolderRename {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            parent_path: parent_path.to_string(),
        };
        let request = self
            .client
            .post(self.endpoint("/webhook/folders/rename"))
            .json(&body);
        let response = self.auth.apply(request).send().await?;
        Self::read_envelope(response).await?;
        Ok(())
    }

    fn download_url(&self, path: &str) -> String {
        // Downloads have no webhook variant either.
        let encoded = path::segments(path)
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/api/files/download/{}", self.base_url, encoded)
    }
}
