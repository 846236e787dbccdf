//! CLI presentation: text and json formatters per command.

use crate::config::{CoverforgeConfig, ValidationError};
use crate::content::BlogContent;
use crate::error::ApiError;
use crate::generation::GenerationResponse;
use crate::style::StyleConfig;
use comfy_table::Table;
use owo_colors::{OwoColorize, Style};

/// ANSI styles for text output; every style is plain when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    ok: Style,
    failed: Style,
    label: Style,
    muted: Style,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        if color {
            Self {
                ok: Style::new().green(),
                failed: Style::new().red(),
                label: Style::new().bold(),
                muted: Style::new().dimmed(),
            }
        } else {
            Self::plain()
        }
    }

    pub fn plain() -> Self {
        Self {
            ok: Style::new(),
            failed: Style::new(),
            label: Style::new(),
            muted: Style::new(),
        }
    }

    /// Color only when enabled in config, stdout is a terminal and NO_COLOR is unset.
    pub fn for_stdout(color_enabled: bool) -> Self {
        use std::io::IsTerminal;
        let color = color_enabled
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        Self::new(color)
    }
}

pub fn format_generation_json(response: &GenerationResponse) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(response)?)
}

pub fn format_generation_text(response: &GenerationResponse, palette: Palette) -> String {
    let mut output = String::new();
    for variant in &response.variants {
        match (&variant.image, &variant.error) {
            (Some(image), _) => {
                let location = image
                    .url
                    .clone()
                    .unwrap_or_else(|| "(inline base64 image)".to_string());
                output.push_str(&format!(
                    "{} {} {}\n",
                    "✓".style(palette.ok),
                    variant.style_label.style(palette.label),
                    location
                ));
                output.push_str(&format!(
                    "    prompt: {}\n",
                    variant.prompt.style(palette.muted)
                ));
            }
            (None, error) => {
                output.push_str(&format!(
                    "{} {} {}\n",
                    "✗".style(palette.failed),
                    variant.style_label.style(palette.label),
                    error.as_deref().unwrap_or("unknown error").style(palette.failed)
                ));
            }
        }
    }
    let metrics = &response.metadata;
    output.push_str(&format!(
        "\n{} succeeded, {} failed in {}ms",
        metrics.success_count, metrics.error_count, metrics.total_generation_time
    ));
    output
}

pub fn format_styles_text(styles: &[StyleConfig]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["ID", "Label", "Visual Style", "Mood", "Quality", "Overlay Space"]);
    for style in styles {
        table.add_row(vec![
            style.id,
            style.label,
            style.params.visual_style,
            style.params.mood,
            style.quality().as_str(),
            if style.params.text_overlay_space { "yes" } else { "no" },
        ]);
    }
    table.to_string()
}

pub fn format_styles_json(styles: &[StyleConfig]) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(styles)?)
}

/// Effective configuration with secrets masked.
pub fn format_config(config: &CoverforgeConfig, format: &str) -> Result<String, ApiError> {
    let masked = config.masked();
    if format == "json" {
        return Ok(serde_json::to_string_pretty(&masked)?);
    }
    toml::to_string_pretty(&masked)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
}

pub fn format_config_validation(
    result: &Result<(), Vec<ValidationError>>,
    palette: Palette,
) -> String {
    match result {
        Ok(()) => format!("{} Configuration is valid", "✓".style(palette.ok)),
        Err(errors) => {
            let mut output = format!(
                "{} Configuration has {} error(s):\n",
                "✗".style(palette.failed),
                errors.len()
            );
            for error in errors {
                output.push_str(&format!("  - {}\n", error));
            }
            output
        }
    }
}

pub fn format_content_summary(content: &BlogContent, palette: Palette) -> String {
    format!(
        "{} Content is valid: \"{}\" ({} characters, {} tag(s))",
        "✓".style(palette.ok),
        content.title.trim(),
        content.content.chars().count(),
        content.tags.len()
    )
}
