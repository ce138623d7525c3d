//! # CLI Configuration
//!
//! Loads the pipeline and provider settings from a YAML file and the environment.
//!
//! Layers, lowest precedence first:
//! 1. The YAML file (`--config <path>`, or `anycite.yml` in the working directory when it
//!    exists). `${VAR}` placeholders are replaced with environment values before parsing.
//! 2. `ANYCITE_`-prefixed environment variables, with `__` separating nested keys
//!    (e.g. `ANYCITE_PIPELINE__REQUEST_TIMEOUT_SECS=30`).

use anycite::{PipelineConfig, ProviderSettings};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "anycite.yml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An error from the underlying `config` crate, or a value that failed validation.
    #[error("Configuration error: {0}")]
    General(String),
    /// An explicitly requested configuration file does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `anycite.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub providers: ProviderSettings,
}

// Reads a file and expands `${VAR}` placeholders. Unset variables become empty strings.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.into_owned()))
}

/// Loads and validates the configuration.
///
/// An explicit `config_path_override` must exist. Without one, `anycite.yml` is used if
/// present and otherwise the configuration comes from the environment alone.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let file_content = match config_path_override {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            ConfigError::NotFound(format!("Config file not found at '{path}'."))
        })?),
        None => read_and_substitute(DEFAULT_CONFIG_FILE)?,
    };
    match file_content {
        Some(content) => {
            info!(
                "Loading configuration from '{}'.",
                config_path_override.unwrap_or(DEFAULT_CONFIG_FILE)
            );
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => info!("No '{DEFAULT_CONFIG_FILE}' found; using environment variables only."),
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("ANYCITE")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.pipeline.max_chars_per_document == 0 {
        return Err(ConfigError::General(
            "pipeline.max_chars_per_document must be greater than zero".to_string(),
        ));
    }
    if config.providers.proxy_base_url.trim().is_empty() {
        return Err(ConfigError::General(
            "providers.proxy_base_url must be set".to_string(),
        ));
    }
    Ok(())
}
