//! Merge rules: defaults, override order, conflict handling.

use crate::generation::{GENERATION_TIMEOUT_MS, MAX_CONCURRENT_GENERATIONS};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("generation.max_concurrency", MAX_CONCURRENT_GENERATIONS as i64)?
        .set_default("generation.timeout_ms", GENERATION_TIMEOUT_MS as i64)?
        .set_default("generation.max_retries", 2_i64)?
        .set_default("generation.base_delay_ms", 1000_i64)?
        .set_default("logging.output", "stderr")
}
