//! Layered configuration for stash-rs
//!
//! Sources, lowest priority first:
//! 1. `default.toml`
//! 2. `{environment}.toml`, where the environment comes from `STASH_APP_ENV`
//! 3. `local.toml`, for uncommitted local overrides
//! 4. `STASH_*` environment variables, e.g. `STASH_CACHE__BACKEND=redis`
//!
//! `STASH_CONFIG_FILE` replaces the first three layers with a single file.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    CacheBackend, CacheConfig, LoggerSettings, MemoryCacheConfig, RedisCacheConfig, SessionConfig,
    Settings,
};
