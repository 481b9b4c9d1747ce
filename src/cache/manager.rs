//! Cache manager that dispatches to the configured backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::memory::MemoryCache;
use crate::cache::redis::RedisCache;
use crate::cache::{Cache, CacheError};
use crate::config::settings::{CacheBackend, CacheConfig};
use crate::context::Context;

/// Cache manager that provides access to the configured cache backend.
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn Cache>,
    config: CacheConfig,
}

impl CacheManager {
    /// Create a new cache manager with the given configuration.
    ///
    /// For the Redis backend this connects and pings before returning.
    pub async fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn Cache> = match config.backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new(&config.memory)),
            CacheBackend::Redis => Arc::new(RedisCache::new(&config.redis).await?),
        };

        tracing::debug!(backend = ?config.backend, "Cache backend ready");

        Ok(Self { backend, config })
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(backend: Arc<dyn Cache>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    /// Get a reference to the cache backend.
    pub fn backend(&self) -> &Arc<dyn Cache> {
        &self.backend
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

#[async_trait]
impl Cache for CacheManager {
    async fn get_bytes(&self, ctx: &Context, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get_bytes(ctx, key).await
    }

    async fn set_bytes(
        &self,
        ctx: &Context,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.backend.set_bytes(ctx, key, value, ttl).await
    }

    async fn has(&self, ctx: &Context, key: &str) -> Result<bool, CacheError> {
        self.backend.has(ctx, key).await
    }

    async fn keys(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>, CacheError> {
        self.backend.keys(ctx, pattern).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<bool, CacheError> {
        self.backend.delete(ctx, key).await
    }

    async fn ping(&self, ctx: &Context) -> Result<(), CacheError> {
        self.backend.ping(ctx).await
    }
}
