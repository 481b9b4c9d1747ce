//! Configuration settings structures for stash-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logger::{LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_redis_key_prefix() -> String {
    "stash:".to_string()
}

fn default_redis_pool_size() -> u32 {
    4
}

fn default_redis_connection_timeout() -> u64 {
    30
}

fn default_session_name() -> String {
    "session".to_string()
}

fn default_true() -> bool {
    true
}

fn default_session_ttl() -> u64 {
    168 * 60 * 60 // 7 days
}

fn default_session_path() -> String {
    "/".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// Cache Configuration
// ============================================================================

/// Cache backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

/// Memory cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MemoryCacheConfig {
    /// Key prefix for all cache entries
    #[serde(default)]
    pub key_prefix: String,
}

/// Redis cache configuration
///
/// Connection fields are kept as strings so that malformed values can be
/// handled leniently during resolution (see
/// [`RedisCacheConfig::resolve`](crate::cache::RedisCacheConfig::resolve)).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Redis port (default 6379)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// Combined `host:port`; takes precedence over `host` and `port`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,

    /// ACL username; setting it enables TLS
    #[serde(default, alias = "user", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password; setting it enables TLS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Legacy password field, used when `password` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,

    /// Database index (default 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,

    /// Key prefix for all cache entries
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: u32,

    /// Connection and initial PING timeout in seconds
    #[serde(default = "default_redis_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            addr: None,
            username: None,
            password: None,
            pass: None,
            db: None,
            key_prefix: default_redis_key_prefix(),
            pool_size: default_redis_pool_size(),
            connection_timeout: default_redis_connection_timeout(),
        }
    }
}

impl std::fmt::Debug for RedisCacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("RedisCacheConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("addr", &self.addr)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("pass", &redact(&self.pass))
            .field("db", &self.db)
            .field("key_prefix", &self.key_prefix)
            .field("pool_size", &self.pool_size)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// Cache backend type
    #[serde(default)]
    pub backend: CacheBackend,

    /// Memory cache settings
    #[serde(default)]
    pub memory: MemoryCacheConfig,

    /// Redis cache settings
    #[serde(default)]
    pub redis: RedisCacheConfig,
}

// ============================================================================
// Session Configuration
// ============================================================================

/// Session cookie configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie name
    #[serde(default = "default_session_name")]
    pub name: String,

    /// Restrict the cookie to secure transport
    #[serde(default = "default_true")]
    pub secure: bool,

    /// Session lifetime in seconds, applied on create and update
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,

    /// Cookie path
    #[serde(default = "default_session_path")]
    pub path: String,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: default_session_name(),
            secure: true,
            ttl_seconds: default_session_ttl(),
            path: default_session_path(),
        }
    }
}

// ============================================================================
// Logger Configuration
// ============================================================================

/// Logger settings as they appear in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Enable ANSI colors when writing to a terminal
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            colored: true,
        }
    }
}

impl LoggerSettings {
    pub fn into_logger_config(self) -> LoggerConfig {
        LoggerConfig {
            level: self.level,
            format: self.format,
            colored: self.colored,
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}
