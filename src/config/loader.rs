//! Configuration loader for stash-rs
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "STASH_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "STASH_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "STASH";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. `default.toml`
/// 2. `{environment}.toml`
/// 3. `local.toml`
/// 4. `STASH_*` environment variables
///
/// Every file is optional in layered mode; absent settings fall back to the
/// built-in defaults.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// Single configuration file; skips layered loading when set
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `STASH_CONFIG_DIR`, `STASH_CONFIG_FILE` and
    /// `STASH_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `STASH_CONFIG_DIR` and `STASH_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir_var = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir_var.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "STASH_CONFIG_DIR and STASH_CONFIG_FILE cannot both be set. \
                 Use STASH_CONFIG_DIR for layered configuration or \
                 STASH_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir_var
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load from a single file instead of the layered directory.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load, deserialize and validate settings from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the single configuration file does not exist
    /// - configuration parsing fails
    /// - configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        tracing::debug!(
            environment = %self.environment,
            backend = ?settings.cache.backend,
            "Configuration loaded"
        );

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // STASH_CACHE__REDIS__HOST -> cache.redis.host
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let layers = [
            self.config_dir.join("default.toml"),
            self.config_dir
                .join(format!("{}.toml", self.environment.as_str())),
            self.config_dir.join("local.toml"),
        ];

        layers
            .iter()
            .try_fold(builder, |builder, path| Self::add_file_source(builder, path, false))
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(required)))
    }

    /// `STASH_`-prefixed variables with `__` between nested keys.
    ///
    /// Values stay strings; numeric and boolean fields are converted during
    /// deserialization, so credentials like `007` are kept verbatim.
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true),
        )
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: None,
            environment: AppEnvironment::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::CacheBackend;
    use crate::logger::LogFormat;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests mutate process-wide environment variables
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        /// Start from a clean slate for every variable the loader reads.
        fn clean() -> Self {
            let mut guard = Self {
                vars_to_restore: Vec::new(),
            };
            for (key, _) in std::env::vars() {
                if key.starts_with("STASH_") {
                    guard.remove(&key);
                }
            }
            guard
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    const DEFAULT_CONFIG: &str = r#"
[cache]
backend = "memory"

[cache.memory]
key_prefix = "app:"

[cache.redis]
host = "localhost"
port = "6379"
key_prefix = "stash:"

[session]
name = "session"
ttl_seconds = 3600

[logger]
level = "info"
format = "full"
"#;

    #[test]
    fn test_config_loader_new_default() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        env.set("STASH_CONFIG_DIR", "/custom/config");
        env.set("STASH_CONFIG_FILE", "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("STASH_CONFIG_DIR"));
                assert!(msg.contains("STASH_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_config_loader_environment_from_env() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        env.set("STASH_APP_ENV", "production");

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.environment(), AppEnvironment::Production);
    }

    #[test]
    fn test_load_empty_dir_uses_defaults() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[]);
        env.set("STASH_CONFIG_DIR", temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_default_toml_only() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_CONFIG)]);
        env.set("STASH_CONFIG_DIR", temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");

        assert_eq!(settings.cache.backend, CacheBackend::Memory);
        assert_eq!(settings.cache.memory.key_prefix, "app:");
        assert_eq!(settings.cache.redis.host.as_deref(), Some("localhost"));
        assert_eq!(settings.session.ttl_seconds, 3600);
        // Unset fields keep their defaults
        assert!(settings.session.secure);
        assert_eq!(settings.session.path, "/");
    }

    #[test]
    fn test_load_full_precedence_chain() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let development_config = r#"
[cache]
backend = "redis"

[session]
name = "dev_session"
ttl_seconds = 60
"#;

        let local_config = r#"
[session]
ttl_seconds = 120

[logger]
format = "json"
"#;

        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_CONFIG),
            ("development.toml", development_config),
            ("local.toml", local_config),
        ]);
        env.set("STASH_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("STASH_CACHE__REDIS__HOST", "redis.internal");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");

        // Environment variables win
        assert_eq!(settings.cache.redis.host.as_deref(), Some("redis.internal"));
        // local.toml overrides development.toml
        assert_eq!(settings.session.ttl_seconds, 120);
        assert_eq!(settings.logger.format, LogFormat::Json);
        // development.toml overrides default.toml
        assert_eq!(settings.cache.backend, CacheBackend::Redis);
        assert_eq!(settings.session.name, "dev_session");
        // default.toml provides the rest
        assert_eq!(settings.cache.memory.key_prefix, "app:");
    }

    #[test]
    fn test_load_env_port_stays_string() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[]);
        env.set("STASH_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("STASH_CACHE__REDIS__PORT", "6380");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");
        assert_eq!(settings.cache.redis.port.as_deref(), Some("6380"));
    }

    #[test]
    fn test_load_env_string_fields_are_verbatim() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[]);
        env.set("STASH_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("STASH_CACHE__REDIS__PASSWORD", "007");
        env.set("STASH_CACHE__REDIS__PASS", "True");
        env.set("STASH_CACHE__REDIS__USERNAME", "1.50");
        env.set("STASH_CACHE__REDIS__KEY_PREFIX", "0123");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");
        let redis = &settings.cache.redis;
        assert_eq!(redis.password.as_deref(), Some("007"));
        assert_eq!(redis.pass.as_deref(), Some("True"));
        assert_eq!(redis.username.as_deref(), Some("1.50"));
        assert_eq!(redis.key_prefix, "0123");
    }

    #[test]
    fn test_load_env_typed_fields_still_convert() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[]);
        env.set("STASH_CONFIG_DIR", temp_dir.path().to_str().unwrap());
        env.set("STASH_CACHE__REDIS__POOL_SIZE", "16");
        env.set("STASH_SESSION__SECURE", "false");
        env.set("STASH_SESSION__TTL_SECONDS", "90");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");
        assert_eq!(settings.cache.redis.pool_size, 16);
        assert!(!settings.session.secure);
        assert_eq!(settings.session.ttl_seconds, 90);
    }

    #[test]
    fn test_load_single_file_mode() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let single_config = r#"
[cache]
backend = "redis"

[cache.redis]
addr = "cache.internal:6380"
"#;

        let temp_dir = setup_config_dir(&[("single.toml", single_config)]);
        env.set(
            "STASH_CONFIG_FILE",
            temp_dir.path().join("single.toml").to_str().unwrap(),
        );

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");
        assert_eq!(settings.cache.backend, CacheBackend::Redis);
        assert_eq!(
            settings.cache.redis.addr.as_deref(),
            Some("cache.internal:6380")
        );
    }

    #[test]
    fn test_with_file_missing() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let _env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[]);
        let loader = ConfigLoader::new()
            .unwrap()
            .with_file(temp_dir.path().join("missing.toml"));

        match loader.load() {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("missing.toml")),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_invalid_settings() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::clean();

        let temp_dir = setup_config_dir(&[("default.toml", "[session]\nname = \"\"\n")]);
        env.set("STASH_CONFIG_DIR", temp_dir.path().to_str().unwrap());

        match ConfigLoader::new().unwrap().load() {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, "session.name"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }
}
