//! TOML Configuration File Support
//!
//! Centralized configuration loading, from a TOML file at
//! `~/.config/humanlike/humanlike.toml` plus environment overrides.
//!
//! # Configuration Priority
//!
//! Highest first:
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [reveal]
//! tick_interval_ms = 300
//! settle_delay_ms = 400
//! commit_delay_ms = 50
//!
//! [layout]
//! compact_max_width = 768
//! seed = 42
//!
//! [response]
//! thinking_delay_ms = 1000
//! text = "First sentence. Second sentence."
//!
//! [surface]
//! cell_width = 8
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::DEFAULT_COMPACT_MAX_WIDTH;
use crate::responder::DEFAULT_RESPONSE;
use crate::reveal::RevealTiming;

/// Delay between a submit and the start of the reply's reveal
pub const DEFAULT_THINKING_DELAY: Duration = Duration::from_millis(1000);

/// Horizontal units per terminal column when reporting viewport width
pub const DEFAULT_CELL_WIDTH: u32 = 8;

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
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Reveal section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealToml {
    /// Delay between sentence cards in milliseconds
    pub tick_interval_ms: Option<u64>,

    /// Delay after the last card before settling, in milliseconds
    pub settle_delay_ms: Option<u64>,

    /// Delay between settling and committing, in milliseconds
    pub commit_delay_ms: Option<u64>,
}

/// Layout section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutToml {
    /// Widest viewport still treated as compact
    pub compact_max_width: Option<u32>,

    /// Fixed seed for reproducible layouts
    pub seed: Option<u64>,
}

/// Response section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseToml {
    /// Delay before a reply starts revealing, in milliseconds
    pub thinking_delay_ms: Option<u64>,

    /// Reply text
    pub text: Option<String>,
}

/// Surface section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceToml {
    /// Viewport units per terminal column
    pub cell_width: Option<u32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanlikeToml {
    /// Reveal timing section
    pub reveal: RevealToml,

    /// Layout section
    pub layout: LayoutToml,

    /// Response section
    pub response: ResponseToml,

    /// Surface section
    pub surface: SurfaceToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the Conductor and its surfaces
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Reveal cadence
    pub timing: RevealTiming,

    /// Widest viewport still treated as compact
    pub compact_max_width: u32,

    /// Fixed layout seed (`None` seeds from entropy)
    pub layout_seed: Option<u64>,

    /// Delay between a submit and the start of the reply
    pub thinking_delay: Duration,

    /// Reply text used by the canned responder
    pub response_text: String,

    /// Viewport units per terminal column
    pub cell_width: u32,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    pub source: ConfigSource,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            timing: RevealTiming::default(),
            compact_max_width: DEFAULT_COMPACT_MAX_WIDTH,
            layout_seed: None,
            thinking_delay: DEFAULT_THINKING_DELAY,
            response_text: DEFAULT_RESPONSE.to_string(),
            cell_width: DEFAULT_CELL_WIDTH,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ConductorConfig {
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

    /// Check values that would stall or break the reveal
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a zero tick interval or
    /// a zero cell width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.tick_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "reveal.tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.cell_width == 0 {
            return Err(ConfigError::ValidationError(
                "surface.cell_width must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/humanlike/humanlike.toml` or
/// `~/.config/humanlike/humanlike.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("humanlike").join("humanlike.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the resulting values are invalid. A missing config file is not an error.
pub fn load_config() -> Result<ConductorConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the resulting values are invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ConductorConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, reading environment overrides through `env`
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ConductorConfig, ConfigError> {
    let mut config = ConductorConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: HumanlikeToml = toml::from_str(&toml_content)?;
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

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ConductorConfig, toml: &HumanlikeToml) {
    // Reveal settings
    if let Some(ms) = toml.reveal.tick_interval_ms {
        config.timing.tick_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.reveal.settle_delay_ms {
        config.timing.settle_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.reveal.commit_delay_ms {
        config.timing.commit_delay = Duration::from_millis(ms);
    }

    // Layout settings
    if let Some(width) = toml.layout.compact_max_width {
        config.compact_max_width = width;
    }
    if toml.layout.seed.is_some() {
        config.layout_seed = toml.layout.seed;
    }

    // Response settings
    if let Some(ms) = toml.response.thinking_delay_ms {
        config.thinking_delay = Duration::from_millis(ms);
    }
    if let Some(ref text) = toml.response.text {
        config.response_text = text.clone();
    }

    // Surface settings
    if let Some(width) = toml.surface.cell_width {
        config.cell_width = width;
    }
}

/// Parse a numeric override, warning about values that don't parse
fn parse_env<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut ConductorConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(ms) = parse_env::<u64>(&env, "HUMANLIKE_TICK_MS") {
        config.timing.tick_interval = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = parse_env::<u64>(&env, "HUMANLIKE_SETTLE_MS") {
        config.timing.settle_delay = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = parse_env::<u64>(&env, "HUMANLIKE_COMMIT_MS") {
        config.timing.commit_delay = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = parse_env::<u64>(&env, "HUMANLIKE_THINKING_MS") {
        config.thinking_delay = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(width) = parse_env::<u32>(&env, "HUMANLIKE_COMPACT_WIDTH") {
        config.compact_max_width = width;
        config.source = ConfigSource::Env;
    }
    if let Some(seed) = parse_env::<u64>(&env, "HUMANLIKE_LAYOUT_SEED") {
        config.layout_seed = Some(seed);
        config.source = ConfigSource::Env;
    }
    if let Some(text) = env("HUMANLIKE_RESPONSE") {
        config.response_text = text;
        config.source = ConfigSource::Env;
    }
}
