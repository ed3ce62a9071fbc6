//! TOML Configuration File Support
//!
//! Centralized configuration loading, backed by a TOML file at
//! `~/.config/tiller/config.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (see [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values (profile defaults for model and token limit)
//!
//! # Example Configuration
//!
//! ```toml
//! [model]
//! name = "claude-sonnet-4-0"
//! max_tokens = 2048
//! base_url = "https://api.anthropic.com"
//! timeout_secs = 120
//!
//! [agent]
//! profile = "minimal"
//!
//! [ui]
//! surface = "console"
//! tool_result_preview_chars = 200
//! ```
//!
//! The API key is deliberately not read from the file; use `ANTHROPIC_API_KEY`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::DEFAULT_BASE_URL;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Which display surface to attach in interactive mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Full-screen terminal UI
    #[default]
    Tui,
    /// Plain line-oriented console
    Console,
}

impl FromStr for SurfaceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tui" => Ok(Self::Tui),
            "console" | "plain" => Ok(Self::Console),
            other => Err(ConfigError::ValidationError(format!(
                "unknown surface '{other}' (expected 'tui' or 'console')"
            ))),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Model section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelToml {
    /// Model identifier (overrides the profile's)
    pub name: Option<String>,

    /// Maximum output tokens (overrides the profile's)
    pub max_tokens: Option<u32>,

    /// API base URL
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Agent section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentToml {
    /// Profile name
    pub profile: Option<String>,
}

/// UI section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// Interactive surface
    pub surface: Option<SurfaceKind>,

    /// Characters of a tool result shown before truncation
    pub tool_result_preview_chars: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TillerToml {
    /// Model configuration section
    pub model: ModelToml,

    /// Agent configuration section
    pub agent: AgentToml,

    /// UI configuration section
    pub ui: UiToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration
///
/// Use [`load_config_from_path`] to load configuration with proper priority handling.
#[derive(Clone)]
pub struct TillerConfig {
    /// Profile to run
    pub profile: String,

    /// Model override (`None` = profile default)
    pub model: Option<String>,

    /// Output token override (`None` = profile default)
    pub max_tokens: Option<u32>,

    /// API key (environment only)
    pub api_key: Option<String>,

    /// API base URL
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Interactive surface
    pub surface: SurfaceKind,

    /// Tool result display truncation
    pub tool_result_preview_chars: usize,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl std::fmt::Debug for TillerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TillerConfig")
            .field("profile", &self.profile)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("surface", &self.surface)
            .field("tool_result_preview_chars", &self.tool_result_preview_chars)
            .field("config_file_path", &self.config_file_path)
            .field("source", &self.source)
            .finish()
    }
}

impl Default for TillerConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            model: None,
            max_tokens: None,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
            surface: SurfaceKind::Tui,
            tool_result_preview_chars: 200,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl TillerConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/tiller/config.toml` or
/// `~/.config/tiller/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tiller").join("config.toml"))
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<TillerConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// an environment value is malformed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<TillerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = TillerConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: TillerToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut TillerConfig, toml: &TillerToml) {
    if toml.model.name.is_some() {
        config.model = toml.model.name.clone();
    }
    if toml.model.max_tokens.is_some() {
        config.max_tokens = toml.model.max_tokens;
    }
    if let Some(ref url) = toml.model.base_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = toml.model.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }

    if let Some(ref profile) = toml.agent.profile {
        config.profile = profile.clone();
    }

    if let Some(surface) = toml.ui.surface {
        config.surface = surface;
    }
    if let Some(chars) = toml.ui.tool_result_preview_chars {
        config.tool_result_preview_chars = chars;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut TillerConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // The key never changes the reported source
    if let Some(key) = env("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
        config.api_key = Some(key);
    }

    if let Some(url) = env("ANTHROPIC_BASE_URL").filter(|u| !u.is_empty()) {
        config.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = env("TILLER_MODEL").filter(|m| !m.is_empty()) {
        config.model = Some(model);
        config.source = ConfigSource::Env;
    }
    if let Some(tokens) = env("TILLER_MAX_TOKENS") {
        let tokens = tokens.parse::<u32>().map_err(|_| {
            ConfigError::ValidationError(format!("TILLER_MAX_TOKENS must be a number, got '{tokens}'"))
        })?;
        config.max_tokens = Some(tokens);
        config.source = ConfigSource::Env;
    }
    if let Some(profile) = env("TILLER_PROFILE").filter(|p| !p.is_empty()) {
        config.profile = profile;
        config.source = ConfigSource::Env;
    }
    if let Some(surface) = env("TILLER_UI") {
        config.surface = surface.parse()?;
        config.source = ConfigSource::Env;
    }

    Ok(())
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config_from_path`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Profile override
    pub profile: Option<String>,

    /// Model override
    pub model: Option<String>,

    /// Surface override
    pub surface: Option<SurfaceKind>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set profile override
    #[must_use]
    pub fn with_profile(mut self, profile: String) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Set model override
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Set surface override
    #[must_use]
    pub fn with_surface(mut self, surface: SurfaceKind) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut TillerConfig) {
        if self.profile.is_some() || self.model.is_some() || self.surface.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref profile) = self.profile {
            config.profile = profile.clone();
        }
        if let Some(ref model) = self.model {
            config.model = Some(model.clone());
        }
        if let Some(surface) = self.surface {
            config.surface = surface;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
