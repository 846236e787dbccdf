//! Loader facade: assembles the source layers into a [`CoverforgeConfig`].

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::CoverforgeConfig;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fallback variable for the provider API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Fallback variable for the blob storage write token.
pub const BLOB_TOKEN_ENV: &str = "BLOB_READ_WRITE_TOKEN";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence, lowest first: defaults, global file, `config/config.toml`,
    /// `config/{COVERFORGE_ENV}.toml`, `COVERFORGE__*` variables.
    pub fn load(workspace_root: &Path) -> Result<CoverforgeConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: CoverforgeConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            environment = %workspace_file::environment_name(),
            "Configuration loaded"
        );
        Ok(with_credential_fallbacks(config))
    }

    /// Load configuration from one explicit file instead of the file layers.
    /// Environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<CoverforgeConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);

        let config: CoverforgeConfig = builder.build()?.try_deserialize()?;
        Ok(with_credential_fallbacks(config))
    }

    /// Path of the global config file, if one can be determined.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}

fn with_credential_fallbacks(mut config: CoverforgeConfig) -> CoverforgeConfig {
    if config.providers.credential().is_none() {
        config.providers.api_key = env_value(API_KEY_ENV);
    }
    if config.storage.token.as_deref().map_or(true, |t| t.trim().is_empty()) {
        config.storage.token = env_value(BLOB_TOKEN_ENV);
    }
    config
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
