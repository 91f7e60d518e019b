//! Configuration loading, validation, and management for Mythos.
//!
//! Loads configuration from `~/.mythos/config.toml` with environment
//! variable overrides. Validates basic shape at startup.
//!
//! Nothing in the engine reads the environment: the loaded [`AppConfig`] is
//! handed to provider constructors explicitly.

use mythos_core::provider::{GenerationConfig, ThinkingLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.mythos/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key for direct calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling and budget settings
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Reverse proxy settings
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Prompt assembly settings
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_model() -> String {
    "gemini-3-pro-preview".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("generation", &self.generation)
            .field("proxy", &self.proxy)
            .field("session", &self.session)
            .finish()
    }
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("password", &redact(&self.password))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Context window the model client may fill, in tokens
    #[serde(default = "default_context_size")]
    pub context_size: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default)]
    pub thinking_level: ThinkingLevel,
}

fn default_context_size() -> u32 {
    2_000_000
}
fn default_temperature() -> f32 {
    1.15
}
fn default_top_k() -> u32 {
    500
}
fn default_top_p() -> f32 {
    0.95
}
fn default_max_output_tokens() -> u32 {
    65_000
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            context_size: default_context_size(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            thinking_level: ThinkingLevel::default(),
        }
    }
}

impl GenerationSettings {
    /// The request-level view of these settings.
    pub fn to_generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_k: Some(self.top_k),
            top_p: Some(self.top_p),
            max_output_tokens: Some(self.max_output_tokens),
            thinking: self.thinking_level,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// "None" disables the proxy
    #[serde(default = "default_proxy_name")]
    pub name: String,

    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_proxy_name() -> String {
    "None".into()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            name: default_proxy_name(),
            url: String::new(),
            password: None,
        }
    }
}

impl ProxyConfig {
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty() && !self.name.eq_ignore_ascii_case("none")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How many recent messages are rendered into the prompt
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    20
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.mythos/config.toml).
    ///
    /// Also checks environment variables:
    /// - `MYTHOS_API_KEY`, then `GEMINI_API_KEY`, then `API_KEY`
    /// - `MYTHOS_MODEL`
    /// - `MYTHOS_PROXY_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("MYTHOS_API_KEY")
                .or_else(|| lookup("GEMINI_API_KEY"))
                .or_else(|| lookup("API_KEY"));
        }

        if let Some(model) = lookup("MYTHOS_MODEL") {
            self.model = model;
        }

        if let Some(url) = lookup("MYTHOS_PROXY_URL") {
            if self.proxy.name.eq_ignore_ascii_case("none") {
                self.proxy.name = "Custom".into();
            }
            self.proxy.url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".mythos")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&generation.top_p) {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be between 0.0 and 1.0".into(),
            ));
        }

        if self.session.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "session.history_limit must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if any route to a model is configured.
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
            || self.proxy.is_enabled()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            generation: GenerationSettings::default(),
            proxy: ProxyConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
