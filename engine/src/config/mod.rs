//! Configuration management
//!
//! This module handles loading, validation, and management of the Bakebot
//! configuration. Configuration is stored in TOML format at
//! ~/.bakebot/config.toml. API keys never live here; see `crate::secrets`.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, HTTP request timeout
//! - **llm**: Gemini endpoint, model and intent-classification options
//! - **recipes**: Spoonacular endpoint and search result count
//! - **server**: Bind address for `bakebot serve`
//!
//! # Examples
//!
//! ```no_run
//! use bakebot_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Model: {}", config.llm.model);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
///
/// Every section may be omitted from the file; missing sections and keys
/// take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Language model settings
    #[serde(default)]
    pub llm: LLMConfig,

    /// Recipe service settings
    #[serde(default)]
    pub recipes: RecipesConfig,

    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Base URL for the Gemini API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Output cap for intent classification calls
    #[serde(default = "default_intent_max_output_tokens")]
    pub intent_max_output_tokens: u32,

    /// Sampling temperature for intent classification calls
    #[serde(default = "default_intent_temperature")]
    pub intent_temperature: f32,
    // Note: API key comes from GOOGLE_API_KEY, not from config
}

/// Spoonacular configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipesConfig {
    /// Base URL for the Spoonacular API
    #[serde(default = "default_recipes_base_url")]
    pub base_url: String,

    /// Number of search results requested per lookup (the first one is used)
    #[serde(default = "default_result_count")]
    pub result_count: u32,
    // Note: API key comes from SPOONACULAR_KEY, not from config
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the transcript page listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.0-flash-001".to_string()
}

fn default_intent_max_output_tokens() -> u32 {
    48
}

fn default_intent_temperature() -> f32 {
    0.2
}

fn default_recipes_base_url() -> String {
    "https://api.spoonacular.com".to_string()
}

fn default_result_count() -> u32 {
    1
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            intent_max_output_tokens: default_intent_max_output_tokens(),
            intent_temperature: default_intent_temperature(),
        }
    }
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            base_url: default_recipes_base_url(),
            result_count: default_result_count(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl CoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ServerConfig {
    /// Parsed bind address
    pub fn socket_addr(&self) -> Result<SocketAddr, EngineError> {
        self.bind_address.parse().map_err(|e| {
            EngineError::Config(format!(
                "Invalid server bind_address '{}': {}",
                self.bind_address, e
            ))
        })
    }
}

impl Config {
    /// Load configuration from the default location (~/.bakebot/config.toml)
    ///
    /// If the configuration file doesn't exist, writes a default configuration
    /// there first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Write the default configuration to `path` and return it
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();
        config.validate()?;

        fs::write(path, config.to_toml_string()?)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Wrote default configuration to {:?}", path);
        Ok(config)
    }

    /// Get the default configuration file path (~/.bakebot/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".bakebot").join("config.toml"))
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` naming the offending key.
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_log_level(&self.core.log_level)?;

        if self.core.request_timeout_secs == 0 {
            return Err(EngineError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        validate_base_url("llm.base_url", &self.llm.base_url)?;
        validate_base_url("recipes.base_url", &self.recipes.base_url)?;

        if self.llm.model.trim().is_empty() {
            return Err(EngineError::Config("llm.model must not be empty".to_string()));
        }

        if self.llm.intent_max_output_tokens == 0 {
            return Err(EngineError::Config(
                "intent_max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.intent_temperature) {
            return Err(EngineError::Config(
                "intent_temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if !(1..=100).contains(&self.recipes.result_count) {
            return Err(EngineError::Config(
                "result_count must be between 1 and 100".to_string(),
            ));
        }

        self.server.socket_addr()?;

        Ok(())
    }
}

/// Validate a log level string
pub fn validate_log_level(level: &str) -> Result<(), EngineError> {
    let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
    if valid_log_levels.contains(&level) {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "Invalid log level '{}'. Must be one of: {}",
            level,
            valid_log_levels.join(", ")
        )))
    }
}

fn validate_base_url(key: &str, url: &str) -> Result<(), EngineError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(EngineError::Config(format!(
            "{} must start with http:// or https://, got '{}'",
            key, url
        )))
    }
}
