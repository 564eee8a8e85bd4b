use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::generation::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationConfig, Model};

/// Environment variable consulted when no `api_key` is configured
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "parley.toml";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Completion backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase", deny_unknown_fields)]
pub enum ProviderConfig {
    /// OpenRouter chat completions endpoint
    #[serde(rename = "openrouter")]
    OpenRouter {
        /// API key; falls back to `OPENROUTER_API_KEY`
        #[serde(default)]
        api_key: Option<String>,
        /// Base URL for the API
        #[serde(default = "default_openrouter_base_url")]
        base_url: String,
        /// Sent as `HTTP-Referer`
        #[serde(default = "default_referer")]
        referer: String,
        /// Sent as `X-Title`
        #[serde(default = "default_title")]
        title: String,
        /// Whole-request timeout
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Scripted responses for offline runs and tests
    #[serde(rename = "mock")]
    Mock {
        #[serde(default)]
        responses_file: Option<PathBuf>,
    },
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_referer() -> String {
    "http://localhost:3000".to_string()
}

fn default_title() -> String {
    "Parley Chatbot".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::OpenRouter {
            api_key: None,
            base_url: default_openrouter_base_url(),
            referer: default_referer(),
            title: default_title(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the credential from the config, then the environment
    pub fn resolve_api_key(&self) -> Result<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Same as [`ProviderConfig::resolve_api_key`] with an injectable environment lookup
    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        let configured = match self {
            ProviderConfig::OpenRouter { api_key, .. } => api_key.as_deref(),
            ProviderConfig::Mock { .. } => return Ok(String::new()),
        };

        configured
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| lookup(API_KEY_ENV).map(|key| key.trim().to_string()).filter(|key| !key.is_empty()))
            .ok_or_else(|| Error::Config(ConfigError::MissingApiKey.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::OpenRouter { .. } => "openrouter",
            ProviderConfig::Mock { .. } => "mock",
        }
    }
}

/// `[generation]` section as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationSettings {
    #[serde(default)]
    pub model: Model,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { model: Model::default(), temperature: DEFAULT_TEMPERATURE, max_tokens: DEFAULT_MAX_TOKENS }
    }
}

impl GenerationSettings {
    pub fn to_generation_config(&self) -> Result<GenerationConfig> {
        GenerationConfig::new(self.model, self.temperature, self.max_tokens)
    }
}

/// `[chat]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatSettings {
    /// Empty string disables the system prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { system_prompt: default_system_prompt() }
    }
}

impl ChatSettings {
    pub fn system_prompt(&self) -> Option<&str> {
        Some(self.system_prompt.as_str()).filter(|p| !p.trim().is_empty())
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: FileLoggingConfig,
    #[serde(default)]
    pub privacy: PrivacySettings,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: FileLoggingConfig::default(),
            privacy: PrivacySettings::default(),
        }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_file_log_level")]
    pub level: String,
}

fn default_file_log_level() -> String {
    "debug".to_string()
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_log_level() }
    }
}

/// `[logging.privacy]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivacySettings {
    /// `none`, `truncate` or `full`
    #[serde(default = "default_log_message_content")]
    pub log_message_content: String,
    #[serde(default = "default_truncate_length")]
    pub truncate_length: usize,
}

fn default_log_message_content() -> String {
    "none".to_string()
}

fn default_truncate_length() -> usize {
    200
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self { log_message_content: default_log_message_content(), truncate_length: default_truncate_length() }
    }
}

/// Root configuration structure for parley.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).map_err(|e| Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from an explicit path, else `./parley.toml` if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(ConfigError::NotFound(path.to_path_buf()).to_string()));
                }
                Self::from_file(path)
            }
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    tracing::debug!(path = %local.display(), "loading config from working directory");
                    Self::from_file(local)
                } else {
                    tracing::debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validated generation parameters
    pub fn generation_config(&self) -> Result<GenerationConfig> {
        self.generation.to_generation_config()
    }

    fn validate(&self) -> Result<()> {
        self.generation.to_generation_config()?;

        if let ProviderConfig::OpenRouter { base_url, timeout_secs, .. } = &self.provider {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(Error::Config(ConfigError::InvalidBaseUrl(base_url.clone()).to_string()));
            }
            if *timeout_secs == 0 {
                return Err(Error::Config(ConfigError::InvalidTimeout.to_string()));
            }
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# Parley Configuration Example
# Copy this file to parley.toml and customize as needed

[provider]
# Provider type: "openrouter" or "mock"
provider = "openrouter"
# API key (optional here; OPENROUTER_API_KEY is used when unset)
# api_key = "your-api-key-here"
base_url = "https://openrouter.ai/api/v1"
# Identification headers sent with every request
referer = "http://localhost:3000"
title = "Parley Chatbot"
timeout_secs = 60

[generation]
# "openai/gpt-3.5-turbo" or "openai/gpt-4o-mini"
model = "openai/gpt-3.5-turbo"
# 0.0 to 1.0
temperature = 0.7
# 100 to 2000
max_tokens = 1000

[chat]
# Leave empty to send no system prompt
system_prompt = "You are a helpful assistant."

[logging]
level = "warn"
# "pretty", "json" or "compact"
format = "pretty"

[logging.file]
enabled = false
level = "debug"

[logging.privacy]
# How message text appears in logs: "none", "truncate" or "full"
log_message_content = "none"
truncate_length = 200
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No credential in config or environment
    #[error("missing API key: set OPENROUTER_API_KEY in the environment or api_key under [provider] in parley.toml")]
    MissingApiKey,

    /// Explicit config path does not exist
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Base URL is not http(s)
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Zero timeout
    #[error("timeout_secs must be greater than zero")]
    InvalidTimeout,

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
