//! Style presets for cover-art variants.
//!
//! Each preset yields exactly one variant per generation request. Presets are
//! immutable `'static` data; the orchestrator borrows them for every task.

use serde::Serialize;

/// Generation parameters handed to the prompt generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleParams {
    pub visual_style: &'static str,
    pub mood: &'static str,
    pub aesthetic: &'static str,
    pub color_palette: &'static str,
    pub aspect_ratio: &'static str,
    pub framing: &'static str,
    /// Leave calm negative space where a headline can be overlaid
    pub text_overlay_space: bool,
}

/// A named style preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub id: &'static str,
    pub label: &'static str,
    pub params: StyleParams,
}

/// Image quality tier requested from the image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Medium,
    High,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Medium => "medium",
            ImageQuality::High => "high",
        }
    }
}

impl StyleConfig {
    /// Photographic styles need the high tier to hold detail; flat styles do not.
    pub fn quality(&self) -> ImageQuality {
        if self.params.visual_style.contains("photo") {
            ImageQuality::High
        } else {
            ImageQuality::Medium
        }
    }
}

pub const PHOTOREALISTIC: StyleConfig = StyleConfig {
    id: "photorealistic",
    label: "Photorealistic",
    params: StyleParams {
        visual_style: "editorial photography",
        mood: "confident and aspirational",
        aesthetic: "clean modern commercial",
        color_palette: "natural tones with a single saturated accent",
        aspect_ratio: "16:9",
        framing: "wide shot, subject on the right third",
        text_overlay_space: true,
    },
};

pub const ILLUSTRATION: StyleConfig = StyleConfig {
    id: "illustration",
    label: "Illustrated",
    params: StyleParams {
        visual_style: "flat vector illustration",
        mood: "optimistic and friendly",
        aesthetic: "contemporary tech editorial",
        color_palette: "vibrant complementary colors",
        aspect_ratio: "16:9",
        framing: "centered composition with layered depth",
        text_overlay_space: false,
    },
};

pub const MINIMALIST: StyleConfig = StyleConfig {
    id: "minimalist",
    label: "Minimalist",
    params: StyleParams {
        visual_style: "minimalist abstract graphic",
        mood: "calm and focused",
        aesthetic: "Swiss design with generous negative space",
        color_palette: "monochrome with one accent color",
        aspect_ratio: "16:9",
        framing: "off-center subject, open space on the left",
        text_overlay_space: true,
    },
};

/// The fixed preset list, in response order.
pub static STYLE_PRESETS: [StyleConfig; 3] = [PHOTOREALISTIC, ILLUSTRATION, MINIMALIST];

/// Look up a preset by id.
pub fn find_style(id: &str) -> Option<&'static StyleConfig> {
    STYLE_PRESETS.iter().find(|style| style.id == id)
}
