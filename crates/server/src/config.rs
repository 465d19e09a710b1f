//! # Application Configuration
//!
//! This module defines the configuration structure for the `familycare-server`
//! and the logic for loading it from a `config.yml` file and environment
//! variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use familycare::{
    constants::{DEFAULT_DB_FILE, DEFAULT_UPLOADS_DIR},
    providers::factory::AnalyzerSettings,
};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The JSON data file. Loaded from `DB_FILE` env var.
    #[serde(default = "default_db_file")]
    pub db_file: String,
    /// Root of the uploads tree; the holding area lives inside it.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub analysis: AnalyzerSettings,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub nightly_sync: NightlySyncConfig,
}

fn default_port() -> u16 {
    3001
}

fn default_db_file() -> String {
    DEFAULT_DB_FILE.to_string()
}

fn default_uploads_dir() -> String {
    DEFAULT_UPLOADS_DIR.to_string()
}

/// Credentials for the talking-avatar service.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AvatarConfig {
    /// Public key handed to the browser SDK.
    #[serde(default)]
    pub client_key: String,
    #[serde(default)]
    pub agent_id: String,
}

/// How artifacts are normalized before analysis.
#[derive(Debug, Deserialize, Clone)]
pub struct TranscoderConfig {
    #[serde(default = "default_transcoder_program")]
    pub program: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u32,
    #[serde(default = "default_transcoder_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_transcoder_program() -> String {
    "ffmpeg".to_string()
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_channels() -> u32 {
    1
}

fn default_transcoder_timeout_secs() -> u64 {
    120
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: default_transcoder_program(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            timeout_secs: default_transcoder_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    /// Largest accepted request body on the upload routes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// The optional in-process trigger for the nightly aggregation.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NightlySyncConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Local hour of day (0-23) at which the run starts.
    #[serde(default)]
    pub hour: u32,
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - An explicit path must exist. Without one, `config.yml` next to the crate
///   manifest is used if present; otherwise only defaults and the environment apply.
/// - Top-level keys like `port` and `db_file` are overridden by `PORT` and `DB_FILE`.
/// - Nested keys are overridden by `FAMILYCARE_...` variables (e.g., `FAMILYCARE_ANALYSIS__PROVIDER`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            let user_config_path = format!("{base_path}/config.yml");
            if let Some(content) = read_and_substitute(&user_config_path)? {
                info!("Loading configuration from '{user_config_path}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            } else {
                info!("'{user_config_path}' not found. Using defaults and the environment.");
            }
        }
    }

    let settings = builder
        // Environment variables for top-level keys like PORT.
        .add_source(Environment::default().try_parsing(true))
        // Prefixed environment variables for nested overrides.
        .add_source(
            Environment::with_prefix("FAMILYCARE")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
