//! Blog content accepted by the generator and its structural validation.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};

/// Upper bound on body text forwarded to the prompt generator.
pub const MAX_BODY_CHARS: usize = 4000;

/// Blog post content. Only `title` and `content` are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl BlogContent {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Parse a request body and validate it.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        let content: BlogContent = serde_json::from_str(body)?;
        content.validate()?;
        Ok(content)
    }

    /// Reject content missing a non-blank title or body.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.content.trim().is_empty() {
            missing.push("content");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::InvalidContent(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Body text cut to [`MAX_BODY_CHARS`] on a character boundary.
    pub fn body_excerpt(&self) -> &str {
        let body = self.content.trim();
        match body.char_indices().nth(MAX_BODY_CHARS) {
            Some((idx, _)) => &body[..idx],
            None => body,
        }
    }
}
