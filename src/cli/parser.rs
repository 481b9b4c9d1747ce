//! CLI argument parsing with clap

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

/// Inspect and modify a stash cache
#[derive(Parser, Debug)]
#[command(name = "stash")]
#[command(version, about = "Inspect and modify a stash cache")]
#[command(long_about = "
stash talks to the cache backend configured for an application, using the
same layered configuration (config/default.toml, config/{env}.toml,
config/local.toml, STASH_* environment variables).

Keys are logical keys: the backend's key prefix is added and stripped
automatically. Values are JSON documents.

EXAMPLES:
    # Check that the configured Redis answers
    STASH_CACHE__BACKEND=redis stash ping

    # Use the conventional REDIS_* environment instead of the config file
    REDIS_ADDR=cache.internal:6379 stash --redis-env keys 'user:*'

    # Store a value for ten minutes
    stash --redis-env set user:1 '{\"name\":\"alice\"}' --ttl 600

    # Inspect a session
    stash --redis-env get session:3f0c...
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load a single TOML file instead of the layered configuration directory.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Connect to Redis using the REDIS_* environment variables
    ///
    /// Reads REDIS_HOST, REDIS_PORT, REDIS_ADDR, REDIS_USER, REDIS_PASSWORD
    /// (or REDIS_PASS), REDIS_DB and REDIS_KEY_PREFIX, and selects the Redis
    /// backend regardless of the configuration file.
    #[arg(long)]
    pub redis_env: bool,

    /// Log level override
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Check that the backend is reachable
    Ping,

    /// Print the JSON value stored at a key
    Get {
        #[arg(value_parser = super::validation::validate_key)]
        key: String,
    },

    /// Store a JSON value at a key
    ///
    /// Examples:
    ///   stash set counter 1
    ///   stash set user:1 '{"name":"alice"}' --ttl 3600
    ///   stash set flash '"saved"' --ttl 0.5
    Set {
        #[arg(value_parser = super::validation::validate_key)]
        key: String,

        /// JSON document to store
        #[arg(value_name = "JSON", value_parser = super::validation::validate_json_value)]
        value: serde_json::Value,

        /// Time to live in seconds (fractions allowed); 0 or absent never expires
        #[arg(long, value_name = "SECONDS", value_parser = super::validation::validate_ttl)]
        ttl: Option<Duration>,
    },

    /// Report whether a live entry exists at a key
    Has {
        #[arg(value_parser = super::validation::validate_key)]
        key: String,
    },

    /// List keys matching a glob pattern
    ///
    /// Supports `*`, `?`, `[...]` classes and `\` escapes.
    Keys {
        #[arg(default_value = "*")]
        pattern: String,
    },

    /// Delete the entry at a key
    Del {
        #[arg(value_parser = super::validation::validate_key)]
        key: String,
    },
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Commands {
    /// Name used in log fields and error context.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Ping => "ping",
            Commands::Get { .. } => "get",
            Commands::Set { .. } => "set",
            Commands::Has { .. } => "has",
            Commands::Keys { .. } => "keys",
            Commands::Del { .. } => "del",
        }
    }
}
