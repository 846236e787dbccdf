//! OpenAI-compatible prompt and image clients.

use super::{
    ensure_success, map_http_error, read_response, GeneratedImage, ImageGenerator, ImageParams,
    PromptGenerator, PromptResult,
};
use crate::content::BlogContent;
use crate::error::GenerationError;
use crate::style::{ImageQuality, StyleParams};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROMPT_SYSTEM_MESSAGE: &str = "You are an art director writing briefs for an image model. \
Respond with a single <image_prompt> XML element containing <subject>, <composition>, <style>, \
<lighting>, <palette>, <mood> and <constraints> children. Never ask for text, letters or logos \
inside the image.";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Writes image prompts with a chat-completions model.
pub struct OpenAIPromptClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAIPromptClient {
    pub fn new(client: Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }
}

/// User message describing the post and the target style.
pub fn build_prompt_request(content: &BlogContent, style: &StyleParams) -> String {
    let mut message = format!("Blog title: {}\n", content.title.trim());
    if let Some(excerpt) = content.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
        message.push_str(&format!("Excerpt: {}\n", excerpt.trim()));
    }
    if let Some(category) = content.category.as_deref() {
        message.push_str(&format!("Category: {}\n", category));
    }
    if !content.tags.is_empty() {
        message.push_str(&format!("Tags: {}\n", content.tags.join(", ")));
    }
    message.push_str(&format!("\nArticle:\n{}\n\n", content.body_excerpt()));
    message.push_str(&format!(
        "Write a cover image brief.\nVisual style: {}\nMood: {}\nAesthetic: {}\n\
         Color palette: {}\nAspect ratio: {}\nFraming: {}\n",
        style.visual_style,
        style.mood,
        style.aesthetic,
        style.color_palette,
        style.aspect_ratio,
        style.framing,
    ));
    if style.text_overlay_space {
        message.push_str("Keep a calm, uncluttered area free for a headline overlay.\n");
    }
    message
}

/// Split a model reply into the XML brief and its flattened text.
///
/// Replies without an `<image_prompt>` element are used verbatim as the prompt.
pub fn parse_prompt_reply(reply: &str) -> Result<PromptResult, GenerationError> {
    const OPEN: &str = "<image_prompt>";
    const CLOSE: &str = "</image_prompt>";

    let xml = reply.find(OPEN).and_then(|start| {
        reply[start..]
            .find(CLOSE)
            .map(|end| &reply[start..start + end + CLOSE.len()])
    });

    let (prompt, xml_prompt) = match xml {
        Some(xml) => (flatten_xml(xml), Some(xml.to_string())),
        None => (
            reply
                .trim()
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim()
                .to_string(),
            None,
        ),
    };

    if prompt.is_empty() {
        return Err(GenerationError::EmptyPrompt);
    }
    Ok(PromptResult { prompt, xml_prompt })
}

/// Turn a chat-completions reply into a prompt.
pub fn parse_completion_response(status: u16, body: &str) -> Result<PromptResult, GenerationError> {
    ensure_success(status, body)?;
    let completion: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        GenerationError::InvalidResponse(format!("Failed to parse completion: {}", e))
    })?;

    let reply = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    parse_prompt_reply(&reply)
}

/// Strip tags and collapse whitespace; each element's text becomes a sentence fragment.
fn flatten_xml(xml: &str) -> String {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut in_tag = false;
    for ch in xml.chars() {
        match ch {
            '<' => {
                in_tag = true;
                let text = current.split_whitespace().collect::<Vec<_>>().join(" ");
                if !text.is_empty() {
                    fragments.push(text);
                }
                current.clear();
            }
            '>' => in_tag = false,
            _ if !in_tag => current.push(ch),
            _ => {}
        }
    }
    fragments.join(". ")
}

#[async_trait]
impl PromptGenerator for OpenAIPromptClient {
    async fn generate_prompt(
        &self,
        content: &BlogContent,
        style: &StyleParams,
    ) -> Result<PromptResult, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(PROMPT_SYSTEM_MESSAGE.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(build_prompt_request(content, style)),
                },
            ],
            temperature: 0.8,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        let (status, body) = read_response(response).await?;
        debug!(model = %self.model, status, body_len = body.len(), "Prompt completion received");
        parse_completion_response(status, &body)
    }
}

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'static str,
    n: u8,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

/// Generates images through `/images/generations`.
pub struct OpenAIImageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAIImageClient {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

/// Quality value understood by `model`; DALL-E 3 uses its own vocabulary.
pub fn quality_for_model(model: &str, quality: ImageQuality) -> &'static str {
    if model.starts_with("dall-e") {
        match quality {
            ImageQuality::High => "hd",
            ImageQuality::Medium => "standard",
        }
    } else {
        quality.as_str()
    }
}

/// Turn an `/images/generations` reply into an image.
///
/// Both `url` and `b64_json` are kept when present; the runner uploads the
/// inline payload and prefers the stored URL.
pub fn parse_image_response(status: u16, body: &str) -> Result<GeneratedImage, GenerationError> {
    ensure_success(status, body)?;
    let generated: ImageGenerationResponse = serde_json::from_str(body).map_err(|e| {
        GenerationError::InvalidResponse(format!("Failed to parse image response: {}", e))
    })?;

    let image = generated
        .data
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse("No image in response".to_string()))?;

    if image.url.is_none() && image.b64_json.is_none() {
        return Err(GenerationError::InvalidResponse(
            "Image response carried neither url nor b64_json".to_string(),
        ));
    }

    Ok(GeneratedImage {
        url: image.url,
        base64: image.b64_json,
    })
}

#[async_trait]
impl ImageGenerator for OpenAIImageClient {
    async fn generate_image(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<GeneratedImage, GenerationError> {
        let request = ImageGenerationRequest {
            model: &params.model,
            prompt,
            size: &params.size,
            quality: quality_for_model(&params.model, params.quality),
            n: 1,
        };

        let url = format!("{}/images/generations", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        let (status, body) = read_response(response).await?;
        parse_image_response(status, &body)
    }
}
