//! Variant task runner: one style in, one [`Variant`] out.
//!
//! Sequence inside a held gate permit:
//! deadline { retry { prompt -> image } } then an optional upload. Every failure is
//! captured on the returned variant; `run` never errors and never panics on
//! collaborator failure.

use super::{GenerationSettings, Variant, GENERATED_IMAGE_CONTENT_TYPE};
use crate::concurrency::{retry_with_backoff, with_timeout, ConcurrencyGate};
use crate::content::BlogContent;
use crate::error::GenerationError;
use crate::provider::{GeneratedImage, ImageParams, PromptResult, Providers, UploadOptions};
use crate::style::StyleConfig;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// One unit of work: a style applied to the shared request content.
#[derive(Debug, Clone, Copy)]
pub struct GenerationTask<'a> {
    pub style: &'a StyleConfig,
    pub content: &'a BlogContent,
}

impl<'a> GenerationTask<'a> {
    pub fn new(style: &'a StyleConfig, content: &'a BlogContent) -> Self {
        Self { style, content }
    }
}

/// Runs generation tasks against a shared gate and collaborator set.
pub struct VariantRunner<'a> {
    providers: &'a Providers,
    settings: &'a GenerationSettings,
    gate: Arc<ConcurrencyGate>,
}

impl<'a> VariantRunner<'a> {
    pub fn new(
        providers: &'a Providers,
        settings: &'a GenerationSettings,
        gate: Arc<ConcurrencyGate>,
    ) -> Self {
        Self {
            providers,
            settings,
            gate,
        }
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Produce exactly one variant for `task`.
    pub async fn run(&self, task: GenerationTask<'_>) -> Variant {
        let style = task.style;
        let permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(err) => {
                warn!(style = style.id, error = %err, "Could not acquire generation slot");
                return Variant::failed(style, err);
            }
        };
        let started = Instant::now();
        debug!(style = style.id, in_flight = self.gate.in_flight(), "Variant generation started");

        let outcome = with_timeout(
            self.settings.timeout(),
            retry_with_backoff(self.settings.retry_policy(), || self.generate_once(task)),
        )
        .await;

        let variant = match outcome {
            Ok((prompt, image)) => {
                let image = self.persist(image, style).await;
                info!(
                    style = style.id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    uploaded = image.base64.is_none(),
                    "Variant generated"
                );
                Variant::succeeded(style, prompt.prompt, image)
            }
            Err(err) => {
                error!(
                    style = style.id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "Variant generation failed"
                );
                Variant::failed(style, err)
            }
        };

        permit.release();
        variant
    }

    /// A single attempt: prompt generation followed by image generation.
    async fn generate_once(
        &self,
        task: GenerationTask<'_>,
    ) -> Result<(PromptResult, GeneratedImage), GenerationError> {
        let prompt = self
            .providers
            .prompts
            .generate_prompt(task.content, &task.style.params)
            .await?;
        if prompt.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let params = ImageParams {
            model: self.settings.image_model.clone(),
            size: self.settings.image_size.clone(),
            quality: task.style.quality(),
        };
        let source = prompt.xml_prompt.as_deref().unwrap_or(&prompt.prompt);
        let image = self.providers.images.generate_image(source, &params).await?;
        Ok((prompt, image))
    }

    /// Upload an inline payload and return the persisted image.
    ///
    /// On success the result carries the storage URL and no base64. Upload
    /// failure is logged and the generated image is returned as-is.
    async fn persist(&self, image: GeneratedImage, style: &StyleConfig) -> GeneratedImage {
        let Some(storage) = self.providers.storage.as_ref() else {
            return image;
        };
        let Some(payload) = image.base64.as_deref() else {
            return image;
        };

        let options = UploadOptions {
            folder: self.settings.upload_folder.clone(),
        };
        let uploaded = storage
            .upload(payload, GENERATED_IMAGE_CONTENT_TYPE, &options)
            .await;
        match uploaded {
            Ok(blob) => GeneratedImage {
                url: Some(blob.url),
                base64: None,
            },
            Err(err) => {
                warn!(style = style.id, error = %err, "Upload failed, keeping generated image");
                image
            }
        }
    }
}
