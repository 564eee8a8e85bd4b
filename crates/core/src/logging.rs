//! Logging setup built on the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `PARLEY_LOG`: Filter directive (like `RUST_LOG`), e.g., `parley=debug`
//! - `PARLEY_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `PARLEY_LOG_DIR`: Directory for the rolling log file (default `~/.parley/logs`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = false
//! level = "debug"
//!
//! [logging.privacy]
//! log_message_content = "truncate"
//! truncate_length = 200
//! ```
//!
//! # Example
//!
//! ```no_run
//! use parley_core::logging::{self, LoggingConfig};
//!
//! let _guard = logging::init_logging(LoggingConfig::default())?;
//! # Ok::<(), parley_core::Error>(())
//! ```

use crate::Error;
use crate::config::{FileLoggingConfig, LoggingConfig as ConfigLoggingConfig, PrivacySettings};
use std::env;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    pub const VALUES: &'static [LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// How message text appears in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentLogging {
    /// Replace content with its length.
    #[default]
    None,
    /// Keep the first `truncate_length` chars.
    Truncate,
    /// Log content verbatim.
    Full,
}

impl ContentLogging {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(ContentLogging::None),
            "truncate" => Some(ContentLogging::Truncate),
            "full" => Some(ContentLogging::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentLogging::None => "none",
            ContentLogging::Truncate => "truncate",
            ContentLogging::Full => "full",
        }
    }
}

impl FromStr for ContentLogging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentLogging::parse_str(s).ok_or_else(|| format!("invalid content logging mode: {}", s))
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive for stderr output.
    pub level: String,
    /// Output format for stderr.
    pub format: Option<LogFormat>,
    /// File logging, when enabled.
    pub file: Option<FileLoggingConfig>,
    pub privacy: PrivacyConfig,
}

/// Privacy controls for message text in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyConfig {
    pub log_message_content: ContentLogging,
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { log_message_content: ContentLogging::None, truncate_length: 200 }
    }
}

impl From<&PrivacySettings> for PrivacyConfig {
    fn from(settings: &PrivacySettings) -> Self {
        Self {
            log_message_content: ContentLogging::parse_str(&settings.log_message_content).unwrap_or_default(),
            truncate_length: settings.truncate_length,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: None, file: None, privacy: PrivacyConfig::default() }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        Self {
            level: config.level,
            format: LogFormat::parse_str(&config.format),
            privacy: PrivacyConfig::from(&config.privacy),
            file: if config.file.enabled { Some(config.file) } else { None },
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file = Some(config);
        self
    }

    pub fn with_privacy(mut self, config: PrivacyConfig) -> Self {
        self.privacy = config;
        self
    }

    /// `PARLEY_LOG`, then `RUST_LOG`, then the configured level.
    fn build_env_filter(&self) -> EnvFilter {
        let filter = env::var("PARLEY_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone());

        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"))
    }

    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Environment override, then config, then TTY detection.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("PARLEY_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if let Some(format) = self.format {
            return format;
        }

        if Self::is_tty() { LogFormat::Pretty } else { LogFormat::Compact }
    }

    fn get_log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("PARLEY_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".parley").join("logs"))
    }
}

/// Install the global tracing subscriber.
///
/// Stderr output is filtered by `PARLEY_LOG`/`RUST_LOG`/the configured level.
/// When file logging is enabled a daily-rolling JSON file is written with its
/// own level; the returned guard must be held until exit or buffered lines
/// are lost.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>, Error> {
    let format = config.detect_format();
    let stderr_filter = config.build_env_filter();

    let stderr_layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(io::stderr)
            .with_ansi(true)
            .with_filter(stderr_filter)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).with_filter(stderr_filter).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(io::stderr).with_filter(stderr_filter).boxed(),
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![stderr_layer];
    let mut guard = None;

    if let Some(file_config) = &config.file {
        let log_dir = LoggingConfig::get_log_dir()?;
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "parley.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        let file_filter = EnvFilter::try_new(&file_config.level).unwrap_or_else(|_| EnvFilter::new("debug"));

        layers.push(fmt::layer().json().with_writer(non_blocking).with_filter(file_filter).boxed());
        guard = Some(worker_guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install logger: {}", e)))?;

    Ok(guard)
}

/// Apply the privacy policy to message text before it is logged.
pub fn redact_content(content: &str, privacy: &PrivacyConfig) -> String {
    match privacy.log_message_content {
        ContentLogging::None => format!("[REDACTED {} chars]", content.chars().count()),
        ContentLogging::Truncate => {
            let total = content.chars().count();
            if total <= privacy.truncate_length {
                return content.to_string();
            }
            let mut truncated = content.chars().take(privacy.truncate_length).collect::<String>();
            truncated.push_str("...");
            truncated.push_str(&format!(" ({} total chars)", total));
            truncated
        }
        ContentLogging::Full => content.to_string(),
    }
}

/// Sanitize file paths for logging (home directory becomes `~`).
pub fn sanitize_path(path: &std::path::Path) -> String {
    if let Ok(home) = env::var("HOME")
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}
