//! HTTP blob storage upload client.
//!
//! Objects are written with a bearer-authenticated `PUT {endpoint}/{pathname}`;
//! the service answers with JSON carrying the public `url`.

use super::{BlobStore, UploadOptions, UploadedBlob};
use crate::error::GenerationError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use tracing::debug;
use uuid::Uuid;

pub struct HttpBlobStore {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpBlobStore {
    pub fn new(client: Client, endpoint: String, token: String) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        }
    }
}

/// File extension for an image content type.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// Unique object path under `folder`.
pub fn object_pathname(folder: &str, content_type: &str) -> String {
    format!(
        "{}/{}-{}.{}",
        folder.trim_matches('/'),
        chrono::Utc::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple(),
        extension_for(content_type)
    )
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(
        &self,
        base64: &str,
        content_type: &str,
        options: &UploadOptions,
    ) -> Result<UploadedBlob, GenerationError> {
        let bytes = BASE64
            .decode(base64.trim())
            .map_err(|e| GenerationError::Upload(format!("Invalid base64 payload: {}", e)))?;
        let pathname = object_pathname(&options.folder, content_type);
        let url = format!("{}/{}", self.endpoint, pathname);
        let size = bytes.len();

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| GenerationError::Upload(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Upload(format!(
                "Upload rejected with status {}: {}",
                status, body
            )));
        }

        let blob: UploadedBlob = response
            .json()
            .await
            .map_err(|e| GenerationError::Upload(format!("Failed to parse upload response: {}", e)))?;
        debug!(pathname = %pathname, size, url = %blob.url, "Uploaded image");
        Ok(blob)
    }
}
