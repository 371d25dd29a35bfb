//! services/api/src/adapters/blob.rs
//!
//! This module contains the blob-storage adapter used for uploaded Anki
//! packages. It implements the `BlobStorage` port with upload-if-absent
//! semantics keyed by filename: re-uploading the same package name reuses
//! the existing blob.

use async_trait::async_trait;
use reqwest::StatusCode;
use toffee_core::ports::{BlobStorage, PortError, PortResult};

/// A blob-store adapter speaking the Vercel Blob HTTP API.
#[derive(Clone)]
pub struct VercelBlobAdapter {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl VercelBlobAdapter {
    /// Creates a new `VercelBlobAdapter`.
    pub fn new(client: reqwest::Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn blob_url(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url, filename)
    }
}

#[async_trait]
impl BlobStorage for VercelBlobAdapter {
    async fn upload_if_absent(&self, filename: &str, bytes: Vec<u8>) -> PortResult<String> {
        let url = self.blob_url(filename);

        // Probe first: same filename means same package, so the existing
        // blob is reused instead of re-uploaded.
        let head = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if head.status() == StatusCode::OK {
            return Ok(url);
        }

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header("x-content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // The API echoes the canonical URL back; fall back to the keyed
        // path when the body isn't the expected shape.
        #[derive(serde::Deserialize)]
        struct PutResponse {
            url: String,
        }
        match response.json::<PutResponse>().await {
            Ok(put) => Ok(put.url),
            Err(_) => Ok(url),
        }
    }
}
