//! CLI parse: clap types for coverforge. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// coverforge CLI - Cover-art variant generation for blog posts
#[derive(Parser)]
#[command(name = "coverforge")]
#[command(about = "Generate cover image variants for blog posts across style presets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/ is read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one image variant per style preset
    Generate {
        /// JSON file with blog content ("-" reads stdin)
        #[arg(long, conflicts_with_all = ["title", "content"])]
        input: Option<PathBuf>,

        /// Blog title (used with --content)
        #[arg(long, requires = "content")]
        title: Option<String>,

        /// Blog body text (used with --title)
        #[arg(long, requires = "title")]
        content: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Validate blog content without generating anything
    Validate {
        /// JSON file with blog content ("-" reads stdin)
        #[arg(long)]
        input: PathBuf,
    },
    /// List style presets
    Styles {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration with secrets masked
    Show {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
    /// Validate the effective configuration
    Validate,
}
