//! coverforge: Cover-Art Variant Generation
//!
//! Generates one cover image per style preset for a blog post. Each variant runs
//! prompt generation, image generation and an optional blob upload under a shared
//! concurrency gate, a per-variant deadline and retry with exponential backoff.
//! A batch always completes: failed variants carry an error instead of an image.

pub mod cli;
pub mod concurrency;
pub mod config;
pub mod content;
pub mod error;
pub mod generation;
pub mod logging;
pub mod provider;
pub mod style;
