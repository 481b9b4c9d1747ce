//! Command-line interface for inspecting a stash cache
//!
//! - Argument parsing with clap
//! - Settings loading with CLI overrides
//! - Command execution against the configured backend

pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use executor::execute_command;
pub use parser::{Cli, Commands, LogLevel};

use anyhow::Context as _;

use crate::config::settings::{CacheBackend, RedisCacheConfig, Settings};
use crate::config::ConfigLoader;
use crate::logger::init_logger;

/// Load settings and apply CLI overrides
///
/// 1. Layered configuration, or the single `--config` file
/// 2. `--redis-env` replaces the cache section with the `REDIS_*` environment
/// 3. `--log-level` replaces the logger level
pub fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut loader = ConfigLoader::new()?;
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut settings = loader.load().context("Failed to load configuration")?;

    if cli.redis_env {
        let redis = RedisCacheConfig::from_env().context("Failed to read REDIS_* environment")?;
        redis.validate()?;
        settings.cache.backend = CacheBackend::Redis;
        settings.cache.redis = redis;
    }

    if let Some(level) = cli.log_level {
        settings.logger.level = level.as_str().to_string();
    }

    Ok(settings)
}

/// Initialize logger from settings
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    init_logger(settings.logger.clone().into_logger_config())
        .context("Failed to initialize logger")
}
