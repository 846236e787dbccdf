//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, ConfigCommands};
use crate::cli::presentation::{
    format_config, format_config_validation, format_content_summary, format_generation_json,
    format_generation_text, format_styles_json, format_styles_text, Palette,
};
use crate::config::{ConfigLoader, CoverforgeConfig};
use crate::content::BlogContent;
use crate::error::ApiError;
use crate::generation::VariantOrchestrator;
use crate::provider::Providers;
use crate::style::STYLE_PRESETS;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace and the loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: CoverforgeConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &CoverforgeConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = %name, "Executing command");
        let result = self.execute_inner(command);
        info!(
            command = %name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate {
                input,
                title,
                content,
                format,
            } => {
                let content = read_content(input.as_deref(), title.as_deref(), content.as_deref())?;
                self.handle_generate(&content, format)
            }
            Commands::Validate { input } => {
                let content = read_content(Some(input.as_path()), None, None)?;
                Ok(format_content_summary(&content, self.palette()))
            }
            Commands::Styles { format } => {
                if format == "json" {
                    format_styles_json(&STYLE_PRESETS)
                } else {
                    Ok(format_styles_text(&STYLE_PRESETS))
                }
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show { format } => format_config(&self.config, format),
                ConfigCommands::Validate => {
                    let result = self.config.validate();
                    let report = format_config_validation(&result, self.palette());
                    match result {
                        Ok(()) => Ok(report),
                        Err(_) => Err(ApiError::ConfigError(report)),
                    }
                }
            },
        }
    }

    fn handle_generate(&self, content: &BlogContent, format: &str) -> Result<String, ApiError> {
        self.ensure_valid_config()?;
        let providers = Providers::from_settings(&self.config.providers, &self.config.storage)?;
        let orchestrator = VariantOrchestrator::new(providers, self.config.generation.clone());

        let rt = tokio::runtime::Runtime::new()?;
        let response = rt.block_on(orchestrator.generate(content))?;

        if format == "json" {
            format_generation_json(&response)
        } else {
            Ok(format_generation_text(&response, self.palette()))
        }
    }

    fn palette(&self) -> Palette {
        Palette::for_stdout(self.config.logging.color)
    }

    fn ensure_valid_config(&self) -> Result<(), ApiError> {
        self.config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}

/// Read and validate blog content from a JSON file, stdin ("-") or inline flags.
pub fn read_content(
    input: Option<&Path>,
    title: Option<&str>,
    content: Option<&str>,
) -> Result<BlogContent, ApiError> {
    match (input, title, content) {
        (Some(path), _, _) => {
            let body = if path == Path::new("-") {
                let mut body = String::new();
                std::io::stdin().read_to_string(&mut body)?;
                body
            } else {
                std::fs::read_to_string(path)?
            };
            BlogContent::from_json(&body)
        }
        (None, Some(title), Some(content)) => {
            let content = BlogContent::new(title, content);
            content.validate()?;
            Ok(content)
        }
        _ => Err(ApiError::InvalidContent(
            "provide --input <file> or both --title and --content".to_string(),
        )),
    }
}
