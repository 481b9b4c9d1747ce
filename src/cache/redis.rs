//! Redis cache implementation using bb8 connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};

use crate::cache::connection::RedisConnectionSettings;
use crate::cache::glob;
use crate::cache::{Cache, CacheError};
use crate::config::settings::RedisCacheConfig;
use crate::context::Context;

type RedisPool = Pool<Client>;

/// How long construction waits for the initial PING.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(30);

/// Redis-based cache with bb8 connection pool.
///
/// Every key is stored as `key_prefix + key`. Values are opaque bytes; the
/// typed layer in [`CacheExt`](crate::cache::CacheExt) encodes them as JSON.
pub struct RedisCache {
    pool: RedisPool,
    key_prefix: String,
    address: String,
}

impl RedisCache {
    /// Connect to Redis and verify the connection with a PING.
    ///
    /// The connection is upgraded to TLS when a username or password is
    /// configured. Construction fails with [`CacheError::Configuration`] if the
    /// server cannot be reached or does not answer within the connection
    /// timeout.
    pub async fn new(config: &RedisCacheConfig) -> Result<Self, CacheError> {
        let settings = config.resolve()?;
        Self::connect(&settings, config).await
    }

    async fn connect(
        settings: &RedisConnectionSettings,
        config: &RedisCacheConfig,
    ) -> Result<Self, CacheError> {
        let address = settings.address();
        let secure = settings.is_secure();

        let client = Client::open(settings.url()).map_err(|e| {
            CacheError::Configuration(format!("invalid Redis connection for {}: {}", address, e))
        })?;

        let ping_timeout = if config.connection_timeout == 0 {
            DEFAULT_PING_TIMEOUT
        } else {
            Duration::from_secs(config.connection_timeout)
        };

        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_timeout(ping_timeout)
            .build(client)
            .await
            .map_err(|e| {
                CacheError::Configuration(format!("failed to create Redis pool {}: {}", address, e))
            })?;

        let cache = Self {
            pool,
            key_prefix: config.key_prefix.clone(),
            address,
        };

        match tokio::time::timeout(ping_timeout, cache.send_ping()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(CacheError::Configuration(format!(
                    "failed to create {} Redis client {:?}: {}",
                    if secure { "secure" } else { "insecure" },
                    cache.address,
                    e
                )));
            }
            Err(_) => {
                return Err(CacheError::Configuration(format!(
                    "Redis {:?} did not answer PING within {}s",
                    cache.address,
                    ping_timeout.as_secs()
                )));
            }
        }

        tracing::info!(
            address = %cache.address,
            db = settings.db,
            secure,
            key_prefix = %cache.key_prefix,
            "Connected to Redis"
        );

        Ok(cache)
    }

    async fn send_ping(&self) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn("ping", "").await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let _: String = redis::cmd("PING")
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::backend("ping", "", e))?;
        Ok(())
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn get_conn(
        &self,
        operation: &'static str,
        key: &str,
    ) -> Result<PooledConnection<'_, Client>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::backend(operation, key, e))
    }
}

/// Expiry arguments for `SET`.
///
/// Zero means no expiry; whole seconds use `EX`, anything finer uses `PX` so
/// sub-second precision is kept.
fn expiry_args(ttl: Duration) -> Option<(&'static str, u64)> {
    if ttl.is_zero() {
        None
    } else if ttl.subsec_nanos() == 0 {
        Some(("EX", ttl.as_secs()))
    } else {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        Some(("PX", millis.max(1)))
    }
}

/// `KEYS` pattern for a logical `pattern` under `prefix`. The prefix is
/// escaped so its glob metacharacters match only themselves.
fn physical_keys_pattern(prefix: &str, pattern: &str) -> String {
    format!("{}{}", glob::escape(prefix), pattern)
}

/// Strip `prefix` from physical keys, dropping any that lack it.
fn logical_keys(prefix: &str, keys: Vec<String>) -> Vec<String> {
    keys.into_iter()
        .filter_map(|key| key.strip_prefix(prefix).map(str::to_string))
        .collect()
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_bytes(&self, ctx: &Context, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        ctx.run("get", async {
            let mut conn: PooledConnection<'_, Client> = self.get_conn("get", key).await?;
            let prefixed = self.prefixed_key(key);

            let conn_ref: &mut MultiplexedConnection = &mut conn;
            conn_ref
                .get(&prefixed)
                .await
                .map_err(|e: RedisError| CacheError::backend("get", key, e))
        })
        .await
    }

    async fn set_bytes(
        &self,
        ctx: &Context,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        ctx.run("set", async {
            let mut conn: PooledConnection<'_, Client> = self.get_conn("set", key).await?;
            let prefixed = self.prefixed_key(key);

            let mut cmd = redis::cmd("SET");
            cmd.arg(&prefixed).arg(value);
            if let Some((unit, amount)) = expiry_args(ttl) {
                cmd.arg(unit).arg(amount);
            }

            let conn_ref: &mut MultiplexedConnection = &mut conn;
            let _: () = cmd
                .query_async(conn_ref)
                .await
                .map_err(|e: RedisError| CacheError::backend("set", key, e))?;

            tracing::trace!(key = %prefixed, ttl_ms = ttl.as_millis() as u64, "Redis SET");
            Ok(())
        })
        .await
    }

    async fn has(&self, ctx: &Context, key: &str) -> Result<bool, CacheError> {
        ctx.run("has", async {
            let mut conn: PooledConnection<'_, Client> = self.get_conn("has", key).await?;
            let prefixed = self.prefixed_key(key);

            let conn_ref: &mut MultiplexedConnection = &mut conn;
            let count: i64 = conn_ref
                .exists(&prefixed)
                .await
                .map_err(|e: RedisError| CacheError::backend("has", key, e))?;
            Ok(count > 0)
        })
        .await
    }

    async fn keys(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>, CacheError> {
        ctx.run("keys", async {
            let mut conn: PooledConnection<'_, Client> = self.get_conn("keys", pattern).await?;
            let physical_pattern = physical_keys_pattern(&self.key_prefix, pattern);

            let conn_ref: &mut MultiplexedConnection = &mut conn;
            let keys: Vec<String> = redis::cmd("KEYS")
                .arg(&physical_pattern)
                .query_async(conn_ref)
                .await
                .map_err(|e: RedisError| CacheError::backend("keys", pattern, e))?;

            Ok(logical_keys(&self.key_prefix, keys))
        })
        .await
    }

    async fn ping(&self, ctx: &Context) -> Result<(), CacheError> {
        ctx.run("ping", self.send_ping()).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<bool, CacheError> {
        ctx.run("delete", async {
            let mut conn: PooledConnection<'_, Client> = self.get_conn("delete", key).await?;
            let prefixed = self.prefixed_key(key);

            let conn_ref: &mut MultiplexedConnection = &mut conn;
            let removed: i64 = conn_ref
                .del(&prefixed)
                .await
                .map_err(|e: RedisError| CacheError::backend("delete", key, e))?;
            Ok(removed > 0)
        })
        .await
    }
}
