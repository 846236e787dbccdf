//! Shared test utilities for integration tests
//!
//! In-memory collaborators with call counters and in-flight instrumentation,
//! plus environment isolation for config loading.

use async_trait::async_trait;
use coverforge::content::BlogContent;
use coverforge::error::GenerationError;
use coverforge::provider::{
    BlobStore, GeneratedImage, ImageGenerator, ImageParams, PromptGenerator, PromptResult,
    Providers, UploadOptions, UploadedBlob,
};
use coverforge::style::StyleParams;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub fn sample_content() -> BlogContent {
    let mut content = BlogContent::new(
        "Shipping a Rust rewrite",
        "What we learned moving the ingest path off the old service.",
    );
    content.tags = vec!["rust".to_string(), "migrations".to_string()];
    content
}

pub fn image_url(url: &str) -> GeneratedImage {
    GeneratedImage {
        url: Some(url.to_string()),
        base64: None,
    }
}

pub fn image_payload(url: &str, base64: &str) -> GeneratedImage {
    GeneratedImage {
        url: Some(url.to_string()),
        base64: Some(base64.to_string()),
    }
}

/// Prompt generator that echoes the style's visual style as the prompt.
#[derive(Default)]
pub struct EchoPrompts {
    pub calls: AtomicUsize,
}

#[async_trait]
impl PromptGenerator for EchoPrompts {
    async fn generate_prompt(
        &self,
        _content: &BlogContent,
        style: &StyleParams,
    ) -> Result<PromptResult, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PromptResult {
            prompt: style.visual_style.to_string(),
            xml_prompt: None,
        })
    }
}

impl EchoPrompts {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Image generator that replays scripted outcomes, then falls back to a default.
pub struct ScriptedImages {
    script: Mutex<VecDeque<Result<GeneratedImage, GenerationError>>>,
    fallback: Result<GeneratedImage, GenerationError>,
    calls: AtomicUsize,
}

impl ScriptedImages {
    pub fn always(outcome: Result<GeneratedImage, GenerationError>) -> Self {
        Self::scripted(Vec::new(), outcome)
    }

    pub fn scripted(
        script: Vec<Result<GeneratedImage, GenerationError>>,
        fallback: Result<GeneratedImage, GenerationError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for ScriptedImages {
    async fn generate_image(
        &self,
        _prompt: &str,
        _params: &ImageParams,
    ) -> Result<GeneratedImage, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Image generator that never resolves.
pub struct HangingImages;

#[async_trait]
impl ImageGenerator for HangingImages {
    async fn generate_image(
        &self,
        _prompt: &str,
        _params: &ImageParams,
    ) -> Result<GeneratedImage, GenerationError> {
        std::future::pending().await
    }
}

/// Start and finish time of one image call, keyed by prompt.
#[derive(Debug, Clone)]
pub struct CallSpan {
    pub prompt: String,
    pub started: Instant,
    pub finished: Instant,
}

/// Image generator that takes `delay` and records how many calls overlap.
pub struct InstrumentedImages {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    spans: Mutex<Vec<CallSpan>>,
}

impl InstrumentedImages {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            spans: Mutex::new(Vec::new()),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn span(&self, prompt: &str) -> CallSpan {
        self.spans
            .lock()
            .iter()
            .find(|span| span.prompt == prompt)
            .cloned()
            .unwrap_or_else(|| panic!("no call recorded for prompt '{}'", prompt))
    }
}

#[async_trait]
impl ImageGenerator for InstrumentedImages {
    async fn generate_image(
        &self,
        prompt: &str,
        _params: &ImageParams,
    ) -> Result<GeneratedImage, GenerationError> {
        let started = Instant::now();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.spans.lock().push(CallSpan {
            prompt: prompt.to_string(),
            started,
            finished: Instant::now(),
        });
        Ok(image_url(&format!("https://images.example.com/{}.png", prompt.len())))
    }
}

/// Blob store that hands back a URL under `host`, or fails every upload.
pub struct RecordingStorage {
    host: Option<&'static str>,
    pub uploads: Mutex<Vec<(String, String)>>,
}

impl RecordingStorage {
    pub fn serving(host: &'static str) -> Self {
        Self {
            host: Some(host),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            host: None,
            uploads: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BlobStore for RecordingStorage {
    async fn upload(
        &self,
        _base64: &str,
        content_type: &str,
        options: &UploadOptions,
    ) -> Result<UploadedBlob, GenerationError> {
        self.uploads
            .lock()
            .push((content_type.to_string(), options.folder.clone()));
        match self.host {
            Some(host) => Ok(UploadedBlob {
                url: format!("{}/{}/{}.png", host, options.folder, self.uploads.lock().len()),
            }),
            None => Err(GenerationError::Upload("storage unavailable".to_string())),
        }
    }
}

pub fn providers(
    prompts: Arc<EchoPrompts>,
    images: Arc<dyn ImageGenerator>,
    storage: Option<Arc<RecordingStorage>>,
) -> Providers {
    Providers::new(
        prompts,
        images,
        storage.map(|s| s as Arc<dyn BlobStore>),
    )
}

/// Serializes tests that touch process environment variables.
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

const ISOLATED_VARS: [&str; 5] = [
    "XDG_CONFIG_HOME",
    "COVERFORGE_ENV",
    "COVERFORGE__GENERATION__MAX_RETRIES",
    "OPENAI_API_KEY",
    "BLOB_READ_WRITE_TOKEN",
];

/// Run `f` with the loader's environment variables cleared and XDG pointed at `xdg_home`.
pub fn with_isolated_env<F, R>(xdg_home: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<_> = ISOLATED_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect();
    for name in ISOLATED_VARS {
        std::env::remove_var(name);
    }
    std::env::set_var("XDG_CONFIG_HOME", xdg_home);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(name, value),
            None => std::env::remove_var(name),
        }
    }
    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
