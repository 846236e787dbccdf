//! Integration tests for Configuration System

use super::test_utils::with_isolated_env;
use coverforge::config::{ConfigLoader, CoverforgeConfig};
use coverforge::error::ApiError;
use coverforge::generation::VariantOrchestrator;
use coverforge::provider::Providers;
use tempfile::TempDir;

#[test]
fn test_workspace_config_drives_generation_settings() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    std::fs::create_dir_all(workspace.join("config")).unwrap();
    std::fs::write(
        workspace.join("config").join("config.toml"),
        r#"
[providers]
api_key = "sk-workspace"

[generation]
max_concurrency = 2
timeout_ms = 60000
upload_folder = "covers"

[storage]
endpoint = "https://blob.example.com"
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir.path().join("xdg"), || {
        std::env::set_var("COVERFORGE__GENERATION__MAX_RETRIES", "5");
        std::env::set_var("BLOB_READ_WRITE_TOKEN", "blob-token");
        ConfigLoader::load(&workspace).unwrap()
    });

    assert!(config.validate().is_ok());
    assert_eq!(config.generation.max_concurrency, 2);
    assert_eq!(config.generation.timeout_ms, 60_000);
    assert_eq!(config.generation.max_retries, 5);
    assert_eq!(config.generation.upload_folder, "covers");
    assert_eq!(config.storage.token.as_deref(), Some("blob-token"));

    let providers = Providers::from_settings(&config.providers, &config.storage).unwrap();
    assert!(providers.storage.is_some());

    let orchestrator = VariantOrchestrator::new(providers, config.generation.clone());
    assert_eq!(orchestrator.settings().max_concurrency, 2);
    assert_eq!(orchestrator.styles().len(), 3);
}

#[test]
fn test_missing_credential_is_request_level_failure() {
    let temp_dir = TempDir::new().unwrap();
    let config = with_isolated_env(&temp_dir.path().join("xdg"), || {
        ConfigLoader::load(temp_dir.path()).unwrap()
    });

    let err = match Providers::from_settings(&config.providers, &config.storage) {
        Err(err) => err,
        Ok(_) => panic!("expected a missing credential error"),
    };
    assert!(matches!(err, ApiError::MissingCredential(_)));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_invalid_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("coverforge.toml");
    std::fs::write(
        &config_file,
        r#"
[generation]
max_concurrency = 0
image_size = "huge"
"#,
    )
    .unwrap();

    let config: CoverforgeConfig = with_isolated_env(&temp_dir.path().join("xdg"), || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });

    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 1, "generation reports its first problem");
    assert!(errors[0].to_string().contains("max_concurrency"));
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("coverforge.toml");
    std::fs::write(&config_file, "[generation\nmax_concurrency = ").unwrap();

    let result = with_isolated_env(&temp_dir.path().join("xdg"), || {
        ConfigLoader::load_from_file(&config_file)
    });

    let err: ApiError = result.unwrap_err().into();
    assert!(matches!(err, ApiError::ConfigError(_)));
}
