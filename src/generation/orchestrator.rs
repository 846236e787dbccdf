//! Variant orchestrator: fans the task runner out over every style preset.

use super::task::{GenerationTask, VariantRunner};
use super::{AggregateMetrics, GenerationResponse, GenerationSettings, Variant};
use crate::concurrency::ConcurrencyGate;
use crate::content::BlogContent;
use crate::error::ApiError;
use crate::provider::Providers;
use crate::style::{StyleConfig, STYLE_PRESETS};
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, info_span, Instrument};

/// Generates one variant per style for a piece of content.
///
/// Each call to [`generate`](Self::generate) builds its own gate, so nothing is
/// shared between requests.
pub struct VariantOrchestrator {
    providers: Providers,
    settings: GenerationSettings,
    styles: Vec<StyleConfig>,
}

impl VariantOrchestrator {
    pub fn new(providers: Providers, settings: GenerationSettings) -> Self {
        Self {
            providers,
            settings,
            styles: STYLE_PRESETS.to_vec(),
        }
    }

    /// Replace the preset list.
    pub fn with_styles(mut self, styles: Vec<StyleConfig>) -> Self {
        self.styles = styles;
        self
    }

    pub fn styles(&self) -> &[StyleConfig] {
        &self.styles
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Run every style concurrently and wait for all of them.
    ///
    /// Only structurally invalid content is rejected. Individual task failures
    /// come back as variants carrying an error, so the batch is always complete.
    pub async fn generate(&self, content: &BlogContent) -> Result<GenerationResponse, ApiError> {
        let gate = Arc::new(ConcurrencyGate::new(self.settings.max_concurrency));
        self.generate_with_gate(content, gate).await
    }

    /// [`generate`](Self::generate) against a caller-supplied gate.
    pub async fn generate_with_gate(
        &self,
        content: &BlogContent,
        gate: Arc<ConcurrencyGate>,
    ) -> Result<GenerationResponse, ApiError> {
        content.validate()?;
        let started = Instant::now();
        info!(
            title = %content.title,
            styles = self.styles.len(),
            max_concurrency = gate.capacity(),
            "Generating image variants"
        );

        let runner = VariantRunner::new(&self.providers, &self.settings, gate);
        let tasks = self.styles.iter().map(|style| {
            runner
                .run(GenerationTask::new(style, content))
                .instrument(info_span!("variant", style = style.id))
        });
        let variants: Vec<Variant> = join_all(tasks).await;

        let metadata = AggregateMetrics::from_variants(&variants, started.elapsed());
        info!(
            total_ms = metadata.total_generation_time,
            success_count = metadata.success_count,
            error_count = metadata.error_count,
            "Variant generation finished"
        );

        Ok(GenerationResponse { variants, metadata })
    }
}
