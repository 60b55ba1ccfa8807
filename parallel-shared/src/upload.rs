/// Asset store boundary
///
/// Images for workspaces and projects are either a URL the caller already
/// has, or bytes pushed through an [`AssetUploader`] that returns a public
/// URL. The core only ever persists the URL string.
///
/// # Uploaders
///
/// - [`HttpAssetUploader`]: POSTs the raw bytes to a configured endpoint and
///   expects `{"url": "..."}` back
/// - [`DisabledUploader`]: used when no endpoint is configured; every upload
///   fails with `UploadError::Disabled`
///
/// # Example
///
/// ```no_run
/// use parallel_shared::upload::{AssetUploader, HttpAssetUploader};
/// use bytes::Bytes;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let uploader = HttpAssetUploader::new("https://assets.example.com/upload")?;
/// let url = uploader.upload(Bytes::from_static(b"\x89PNG..."), "image/png").await?;
/// println!("stored at {}", url);
/// # Ok(())
/// # }
/// ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

/// Error type for uploads
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// No asset store is configured
    #[error("Uploads are not configured")]
    Disabled,

    /// Nothing to upload
    #[error("Upload body is empty")]
    Empty,

    /// Body exceeds the configured limit
    #[error("Upload of {size} bytes exceeds the limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// The asset store answered with an error status
    #[error("Asset store rejected the upload with status {0}")]
    Rejected(u16),

    /// Network or decoding failure
    #[error("Asset store request failed: {0}")]
    Transport(String),
}

/// Stores binary content and returns its public URL
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, content: Bytes, content_type: &str) -> Result<String, UploadError>;
}

/// Uploader for deployments without an asset store
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledUploader;

#[async_trait]
impl AssetUploader for DisabledUploader {
    async fn upload(&self, _content: Bytes, _content_type: &str) -> Result<String, UploadError> {
        Err(UploadError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Uploader backed by an HTTP asset store
#[derive(Debug, Clone)]
pub struct HttpAssetUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAssetUploader {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AssetUploader for HttpAssetUploader {
    async fn upload(&self, content: Bytes, content_type: &str) -> Result<String, UploadError> {
        if content.is_empty() {
            return Err(UploadError::Empty);
        }

        let size = content.len();
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), size, "Asset store rejected upload");
            return Err(UploadError::Rejected(status.as_u16()));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        tracing::debug!(size, url = %body.url, "Asset uploaded");
        Ok(body.url)
    }
}

/// Checks an upload body against the size limit
pub fn check_size(content: &Bytes, limit: usize) -> Result<(), UploadError> {
    if content.is_empty() {
        return Err(UploadError::Empty);
    }
    if content.len() > limit {
        return Err(UploadError::TooLarge {
            size: content.len(),
            limit,
        });
    }
    Ok(())
}
