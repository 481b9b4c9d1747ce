//! Configuration validation logic
//!
//! Range and format checks run after loading, before any backend is built.

use crate::config::error::ConfigError;
use crate::config::settings::{
    CacheConfig, LoggerSettings, RedisCacheConfig, SessionConfig, Settings,
};

/// Characters that may not appear in a cookie name (RFC 6265 separators).
const COOKIE_NAME_SEPARATORS: &[char] = &[
    '(', ')', '<', '>', '@', ',', ';', ':', '\\', '"', '/', '[', ']', '?', '=', '{', '}',
];

impl RedisCacheConfig {
    /// # Validation Rules
    /// - Pool size must be greater than 0
    /// - Connection timeout must be greater than 0
    ///
    /// Host, port and database index are checked when the connection is
    /// resolved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::validation(
                "cache.redis.pool_size",
                "Pool size must be greater than 0.",
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "cache.redis.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.redis.validate()
    }
}

impl SessionConfig {
    /// # Validation Rules
    /// - Name must be a non-empty cookie token
    /// - Path must start with `/`
    /// - TTL must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::validation(
                "session.name",
                "Session cookie name cannot be empty.",
            ));
        }

        if let Some(c) = self
            .name
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || COOKIE_NAME_SEPARATORS.contains(c))
        {
            return Err(ConfigError::validation(
                "session.name",
                format!("Session cookie name cannot contain {:?}.", c),
            ));
        }

        if !self.path.starts_with('/') {
            return Err(ConfigError::validation(
                "session.path",
                format!("Cookie path '{}' must start with '/'.", self.path),
            ));
        }

        if self.path.contains(';') {
            return Err(ConfigError::validation(
                "session.path",
                "Cookie path cannot contain ';'.",
            ));
        }

        if self.ttl_seconds == 0 {
            return Err(ConfigError::validation(
                "session.ttl_seconds",
                "Session TTL must be greater than 0 seconds.",
            ));
        }

        if i64::try_from(self.ttl_seconds).is_err() {
            return Err(ConfigError::validation(
                "session.ttl_seconds",
                format!("Session TTL cannot exceed {} seconds.", i64::MAX),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clone()
            .into_logger_config()
            .validate()
            .map_err(|e| ConfigError::validation("logger.level", e.to_string()))
    }
}

impl Settings {
    /// Validate every section, reporting the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.session.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
