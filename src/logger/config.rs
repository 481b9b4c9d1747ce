//! Configuration types for the logger

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::error::LoggerError;

/// Plain levels accepted without a target directive
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Console logger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// A level (`info`) or a full `EnvFilter` directive (`stash=debug,redis=warn`)
    pub level: String,
    pub format: LogFormat,
    /// ANSI colors; only applied when stdout is a terminal
    pub colored: bool,
}

impl LoggerConfig {
    pub fn validate(&self) -> Result<(), LoggerError> {
        self.filter().map(|_| ())
    }

    /// Build the `EnvFilter` for `level`.
    pub fn filter(&self) -> Result<EnvFilter, LoggerError> {
        let level = self.level.trim();
        if level.is_empty() {
            return Err(LoggerError::config("Log level cannot be empty"));
        }

        let is_directive = level.contains('=') || level.contains(',');
        if !is_directive && !VALID_LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(LoggerError::config(format!(
                "Invalid log level '{}'. Valid levels are: {}",
                self.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        EnvFilter::try_new(level).map_err(|e| {
            LoggerError::config(format!("Invalid log filter '{}': {}", self.level, e))
        })
    }

    /// Replace the level, e.g. from a `--log-level` flag.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            colored: true,
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}
