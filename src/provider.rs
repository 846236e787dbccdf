//! External Service Clients
//!
//! The generation pipeline talks to three collaborators through narrow traits:
//! a prompt generator (LLM), an image generator, and a blob store. Concrete
//! HTTP clients live in the submodules; tests substitute in-memory fakes.

use crate::content::BlogContent;
use crate::error::{ApiError, GenerationError};
use crate::style::{ImageQuality, StyleParams};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub mod blob;
pub mod openai;

pub use blob::HttpBlobStore;
pub use openai::{OpenAIImageClient, OpenAIPromptClient};

/// Prompt produced for one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResult {
    /// Flattened natural-language prompt
    pub prompt: String,
    /// Structured XML brief, when the model produced one
    pub xml_prompt: Option<String>,
}

/// Image returned by the image generator: a URL, an inline base64 payload, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: Option<String>,
    pub base64: Option<String>,
}

/// Fixed image generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParams {
    pub model: String,
    pub size: String,
    pub quality: ImageQuality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedBlob {
    pub url: String,
}

/// Turns blog content plus a style into an image prompt.
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    async fn generate_prompt(
        &self,
        content: &BlogContent,
        style: &StyleParams,
    ) -> Result<PromptResult, GenerationError>;
}

/// Renders a prompt into an image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<GeneratedImage, GenerationError>;
}

/// Persists base64 image payloads and returns a public URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        base64: &str,
        content_type: &str,
        options: &UploadOptions,
    ) -> Result<UploadedBlob, GenerationError>;
}

/// Provider connection settings (`[providers]` config section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key; falls back to OPENAI_API_KEY when unset
    #[serde(default)]
    pub api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model used to write image prompts
    #[serde(default = "default_prompt_model")]
    pub prompt_model: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_prompt_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            prompt_model: default_prompt_model(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProviderSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt_model.trim().is_empty() {
            return Err("Prompt model cannot be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("Invalid base_url '{}'", self.base_url));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    /// The configured key, ignoring blank values.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Blob storage settings (`[storage]` config section)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Blob API base URL; uploads are skipped when unset
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Write token; falls back to BLOB_READ_WRITE_TOKEN when unset
    #[serde(default)]
    pub token: Option<String>,
}

impl StorageSettings {
    pub fn validate(&self) -> Result<(), String> {
        match self.endpoint.as_deref() {
            Some(endpoint) if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") => {
                Err(format!("Invalid storage endpoint '{}'", endpoint))
            }
            _ => Ok(()),
        }
    }
}

/// The collaborator set used by one orchestrator.
#[derive(Clone)]
pub struct Providers {
    pub prompts: Arc<dyn PromptGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    /// Absent when no blob storage is configured
    pub storage: Option<Arc<dyn BlobStore>>,
}

impl Providers {
    pub fn new(
        prompts: Arc<dyn PromptGenerator>,
        images: Arc<dyn ImageGenerator>,
        storage: Option<Arc<dyn BlobStore>>,
    ) -> Self {
        Self {
            prompts,
            images,
            storage,
        }
    }

    /// Build HTTP clients from configuration.
    ///
    /// A missing API key rejects the request before any task starts. Missing
    /// storage settings only disable uploads.
    pub fn from_settings(
        providers: &ProviderSettings,
        storage: &StorageSettings,
    ) -> Result<Self, ApiError> {
        let api_key = providers.credential().ok_or_else(|| {
            ApiError::MissingCredential(
                "No API key configured (set providers.api_key or OPENAI_API_KEY)".to_string(),
            )
        })?;
        let client = build_http_client(providers)?;

        let prompts = OpenAIPromptClient::new(
            client.clone(),
            providers.base_url.clone(),
            api_key.to_string(),
            providers.prompt_model.clone(),
        );
        let images = OpenAIImageClient::new(
            client.clone(),
            providers.base_url.clone(),
            api_key.to_string(),
        );

        let blob_store: Option<Arc<dyn BlobStore>> = match (
            storage.endpoint.as_deref(),
            storage.token.as_deref().filter(|t| !t.trim().is_empty()),
        ) {
            (Some(endpoint), Some(token)) => Some(Arc::new(HttpBlobStore::new(
                client,
                endpoint.to_string(),
                token.to_string(),
            ))),
            _ => {
                tracing::warn!("Blob storage not configured; generated images will not be uploaded");
                None
            }
        };

        Ok(Self::new(Arc::new(prompts), Arc::new(images), blob_store))
    }
}

/// Build the shared HTTP client with connect and request timeouts.
pub fn build_http_client(settings: &ProviderSettings) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
        .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Map transport-level reqwest failures to a tagged error.
pub(crate) fn map_http_error(error: reqwest::Error) -> GenerationError {
    if let Some(status) = error.status() {
        GenerationError::from_status(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        GenerationError::Transient(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        GenerationError::Transient(format!("Connection error: {}", error))
    } else {
        GenerationError::classify(format!("HTTP error: {}", error))
    }
}

/// Read a response's status and body text.
pub(crate) async fn read_response(
    response: reqwest::Response,
) -> Result<(u16, String), GenerationError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(map_http_error)?;
    Ok((status, body))
}

/// Turn a non-success status into a tagged error carrying the body.
pub(crate) fn ensure_success(status: u16, body: &str) -> Result<(), GenerationError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(GenerationError::from_status(status, body))
    }
}
