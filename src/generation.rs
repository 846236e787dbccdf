//! Cover-art variant generation.
//!
//! The orchestrator fans one [`task::VariantRunner`] out per style preset and always
//! returns a complete batch: failed tasks carry an error string instead of an image.

use crate::concurrency::RetryPolicy;
use crate::provider::GeneratedImage;
use crate::style::StyleConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod orchestrator;
pub mod task;

pub use orchestrator::VariantOrchestrator;
pub use task::{GenerationTask, VariantRunner};

/// Wall-clock budget for prompt and image generation of one variant, retries included.
pub const GENERATION_TIMEOUT_MS: u64 = 180_000;

/// Maximum number of variant tasks in flight at once.
pub const MAX_CONCURRENT_GENERATIONS: usize = 3;

/// Content type of images returned by the image generator.
pub const GENERATED_IMAGE_CONTENT_TYPE: &str = "image/png";

/// Generation tuning (`[generation]` config section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-variant deadline covering prompt and image generation
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base; the n-th retry waits `base_delay_ms * 2^n`
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// `WIDTHxHEIGHT` or `auto`
    #[serde(default = "default_image_size")]
    pub image_size: String,

    /// Logical folder for uploaded images
    #[serde(default = "default_upload_folder")]
    pub upload_folder: String,
}

fn default_max_concurrency() -> usize {
    MAX_CONCURRENT_GENERATIONS
}

fn default_timeout_ms() -> u64 {
    GENERATION_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_image_model() -> String {
    "gpt-image-1".to_string()
}

fn default_image_size() -> String {
    "1536x1024".to_string()
}

fn default_upload_folder() -> String {
    "blog-images".to_string()
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            upload_folder: default_upload_folder(),
        }
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be at least 1".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }
        if self.image_model.trim().is_empty() {
            return Err("image_model cannot be empty".to_string());
        }
        if self.upload_folder.trim_matches('/').is_empty() {
            return Err("upload_folder cannot be empty".to_string());
        }
        if self.image_size != "auto" {
            let valid = self
                .image_size
                .split_once('x')
                .map(|(w, h)| w.parse::<u32>().is_ok() && h.parse::<u32>().is_ok())
                .unwrap_or(false);
            if !valid {
                return Err(format!(
                    "image_size '{}' must be WIDTHxHEIGHT or 'auto'",
                    self.image_size
                ));
            }
        }
        Ok(())
    }
}

/// One generated variant. Exactly one of `image` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub style: String,
    pub style_label: String,
    /// Empty on failure
    pub prompt: String,
    pub image: Option<GeneratedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Variant {
    pub fn succeeded(style: &StyleConfig, prompt: String, image: GeneratedImage) -> Self {
        Self {
            id: variant_id(style),
            style: style.id.to_string(),
            style_label: style.label.to_string(),
            prompt,
            image: Some(image),
            error: None,
        }
    }

    pub fn failed(style: &StyleConfig, error: impl ToString) -> Self {
        Self {
            id: variant_id(style),
            style: style.id.to_string(),
            style_label: style.label.to_string(),
            prompt: String::new(),
            image: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.image.is_some()
    }
}

fn variant_id(style: &StyleConfig) -> String {
    format!("{}-{}", style.id, chrono::Utc::now().timestamp_millis())
}

/// Batch summary computed once every task has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    /// Wall-clock milliseconds for the whole batch
    pub total_generation_time: u64,
    pub success_count: usize,
    pub error_count: usize,
}

impl AggregateMetrics {
    pub fn from_variants(variants: &[Variant], elapsed: Duration) -> Self {
        Self {
            total_generation_time: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            success_count: variants.iter().filter(|v| v.image.is_some()).count(),
            error_count: variants.iter().filter(|v| v.error.is_some()).count(),
        }
    }
}

/// Orchestrator result: one variant per style plus metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub variants: Vec<Variant>,
    pub metadata: AggregateMetrics,
}
