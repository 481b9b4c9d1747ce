//! Cache module providing a backend-agnostic key-value store with TTLs.
//!
//! This module provides a unified caching interface that supports:
//! - Memory cache (in-process, per-entry TTL)
//! - Redis cache (distributed, network-based)
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! backend = "redis"  # or "memory"
//!
//! [cache.redis]
//! host = "localhost"
//! port = "6379"
//! username = "app"      # any credential switches the connection to TLS
//! password = "secret"
//! db = "0"
//! key_prefix = "stash:"
//! pool_size = 4
//! connection_timeout = 30
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let cache = CacheManager::new(settings.cache).await?;
//! let ctx = Context::background().with_timeout(Duration::from_secs(2));
//!
//! cache.set(&ctx, "user:1", &profile, Duration::from_secs(300)).await?;
//! let profile: Profile = cache.get(&ctx, "user:1").await?;
//! ```

pub mod connection;
mod error;
pub(crate) mod glob;
mod manager;
mod memory;
mod redis;
mod traits;

pub use connection::{RedisConnectionSettings, requires_tls};
pub use error::CacheError;
pub use manager::CacheManager;
pub use memory::{MemoryCache, MemoryStore};
pub use self::redis::RedisCache;
pub use traits::{Cache, CacheExt};

// Re-export config types
pub use crate::config::settings::{CacheBackend, CacheConfig, MemoryCacheConfig, RedisCacheConfig};
