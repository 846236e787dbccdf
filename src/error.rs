//! Error types for the cover-art generation pipeline.
//!
//! Two layers: [`ApiError`] fails a whole request, [`GenerationError`] fails a
//! single variant task and is reported as data on that variant.

use thiserror::Error;

/// Per-task errors raised by collaborators and the resilience wrappers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transient provider error: {0}")]
    Transient(String),

    #[error("Prompt generation returned no usable prompt text")]
    EmptyPrompt,

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Generation timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Generation cancelled: {0}")]
    Cancelled(String),
}

impl GenerationError {
    /// Whether another attempt may succeed.
    ///
    /// Rate limits, quota and auth failures are terminal for the task; so are
    /// timeouts, since retries run inside the deadline and never around it.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Transient(_) => true,
            GenerationError::EmptyPrompt => true,
            GenerationError::InvalidResponse(_) => true,
            GenerationError::RateLimited(_) => false,
            GenerationError::QuotaExceeded(_) => false,
            GenerationError::Unauthorized(_) => false,
            GenerationError::Timeout { .. } => false,
            GenerationError::Upload(_) => false,
            GenerationError::Cancelled(_) => false,
        }
    }

    /// Classify a free-form provider message that carries no status code.
    ///
    /// Matching is case-insensitive and only applied at the client boundary;
    /// everything downstream inspects the variant, never the text.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if lowered.contains("quota") {
            GenerationError::QuotaExceeded(message)
        } else if lowered.contains("rate limit") || lowered.contains("rate_limit") {
            GenerationError::RateLimited(message)
        } else if lowered.contains("unauthorized") {
            GenerationError::Unauthorized(message)
        } else {
            GenerationError::Transient(message)
        }
    }

    /// Map a non-success HTTP status and its body to a tagged error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => GenerationError::Unauthorized(format!("status {}: {}", status, body)),
            402 => GenerationError::QuotaExceeded(format!("status {}: {}", status, body)),
            429 => {
                let lowered = body.to_lowercase();
                if lowered.contains("insufficient_quota") || lowered.contains("quota") {
                    GenerationError::QuotaExceeded(format!("status {}: {}", status, body))
                } else {
                    GenerationError::RateLimited(format!("status {}: {}", status, body))
                }
            }
            _ => GenerationError::Transient(format!("status {}: {}", status, body)),
        }
    }
}

/// Request-level errors: the only failures that reject a whole generation request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed request body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP-equivalent status for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidContent(_) | ApiError::Serialization(_) => 400,
            ApiError::MissingCredential(_) | ApiError::ConfigError(_) | ApiError::Io(_) => 500,
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
