//! Configuration System
//!
//! Layered configuration for providers, generation tuning, blob storage and
//! logging. Sources are merged in order: built-in defaults, the global config
//! file, workspace config files, then `COVERFORGE__SECTION__KEY` environment
//! variables. Credentials also fall back to the conventional `OPENAI_API_KEY`
//! and `BLOB_READ_WRITE_TOKEN` variables.

use crate::generation::GenerationSettings;
use crate::logging::LoggingConfig;
use crate::provider::{ProviderSettings, StorageSettings};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Serializes tests that read or mutate loader environment variables.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverforgeConfig {
    /// Prompt and image model provider
    #[serde(default)]
    pub providers: ProviderSettings,

    /// Concurrency, deadline, retry and image parameters
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Blob storage for generated images
    #[serde(default)]
    pub storage: StorageSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Providers(String),
    Generation(String),
    Storage(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Providers(msg) => write!(f, "Providers: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CoverforgeConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.providers.validate() {
            errors.push(ValidationError::Providers(e));
        }
        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }
        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy with secrets replaced, for display.
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        masked.providers.api_key = masked.providers.api_key.as_deref().map(mask_secret);
        masked.storage.token = masked.storage.token.as_deref().map(mask_secret);
        masked
    }
}

/// Keep the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
