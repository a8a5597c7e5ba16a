//! Configuration module for the marketsync CLI.
//!
//! Handles loading configuration from the TOML file, CLI arguments and
//! environment variables.

pub mod file;

use crate::config::file::{FileConfig, SessionConfig};
use marketsync_sdk::config::{ClientConfig, EndpointConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration, ready to build clients from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub client: ClientConfig,
    pub session: SessionConfig,
}

/// Configuration loader: file, then CLI/environment overrides, then
/// validation.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: PathBuf,
    primary_override: Option<String>,
    timeout_override: Option<u64>,
    token_override: Option<String>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_primary(mut self, primary: Option<String>) -> Self {
        self.primary_override = primary;
        self
    }

    pub fn with_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.timeout_override = secs;
        self
    }

    /// Token from `--token` / `MARKETSYNC_TOKEN`; wins over the file.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token_override = token;
        self
    }

    /// Load and process the configuration.
    ///
    /// A missing file is not an error: every setting has a default.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {:?}, using defaults", self.config_path);
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        self.process(file_config)
    }

    fn process(&self, mut file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        // Apply CLI overrides
        if let Some(primary) = &self.primary_override {
            file_config.backend.primary = Some(primary.clone());
        }
        if let Some(secs) = self.timeout_override {
            file_config.backend.attempt_timeout_secs = secs;
        }
        if let Some(token) = &self.token_override {
            file_config.session.token = Some(token.clone());
        }

        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let backend = &config.backend;
    if backend.attempt_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "backend.attempt_timeout_secs must be greater than zero".into(),
        ));
    }
    if backend.primary.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(ConfigError::ValidationError("backend.primary is empty".into()));
    }
    if let Some(index) = backend.fallbacks.iter().position(|f| f.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "backend.fallbacks[{index}] is empty"
        )));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    let backend = file_config.backend;
    let mut endpoints = EndpointConfig::new(backend.primary).with_fallbacks(backend.fallbacks);
    if !backend.relative_fallback {
        endpoints = endpoints.without_relative_fallback();
    }

    let mut client = ClientConfig::new(endpoints)
        .with_attempt_timeout(Duration::from_secs(backend.attempt_timeout_secs));
    if let Some(origin) = backend.relative_origin {
        client = client.with_relative_origin(origin);
    }

    LoadedConfig {
        client,
        session: file_config.session,
    }
}
