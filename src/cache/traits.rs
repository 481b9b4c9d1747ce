//! Cache trait definitions.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::CacheError;
use crate::context::Context;

/// Trait for cache operations.
///
/// All cache backends implement this byte-level trait. Keys passed here are
/// logical keys; each backend applies its own namespace prefix. A `ttl` of
/// [`Duration::ZERO`] means the entry never expires.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get the raw bytes stored at `key`, or `None` if absent or expired.
    async fn get_bytes(&self, ctx: &Context, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` at `key`, replacing any existing entry.
    async fn set_bytes(
        &self,
        ctx: &Context,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Whether a live entry exists at `key`.
    async fn has(&self, ctx: &Context, key: &str) -> Result<bool, CacheError>;

    /// All live logical keys matching the glob `pattern`.
    async fn keys(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>, CacheError>;

    /// Remove the entry at `key`. Returns whether an entry was removed.
    async fn delete(&self, ctx: &Context, key: &str) -> Result<bool, CacheError>;

    /// Check that the backend is reachable.
    ///
    /// In-process backends are always reachable.
    async fn ping(&self, ctx: &Context) -> Result<(), CacheError> {
        ctx.run("ping", async { Ok(()) }).await
    }
}

/// Typed access on top of [`Cache`].
///
/// Values are stored as JSON so nested maps, sequences and primitives
/// round-trip losslessly.
#[async_trait]
pub trait CacheExt: Cache {
    /// Decode the value at `key` into `T`.
    ///
    /// Fails with [`CacheError::NotFound`] when there is no live entry.
    async fn get<T>(&self, ctx: &Context, key: &str) -> Result<T, CacheError>
    where
        T: DeserializeOwned,
    {
        let bytes = self
            .get_bytes(ctx, key)
            .await?
            .ok_or_else(|| CacheError::not_found(key))?;

        serde_json::from_slice(&bytes).map_err(|source| CacheError::Serialization {
            key: key.to_string(),
            source,
        })
    }

    /// Encode `value` and store it at `key` with expiration `ttl`.
    async fn set<T>(&self, ctx: &Context, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let bytes = serde_json::to_vec(value).map_err(|source| CacheError::Serialization {
            key: key.to_string(),
            source,
        })?;

        self.set_bytes(ctx, key, bytes, ttl).await
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}
