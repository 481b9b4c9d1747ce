//! In-process cache with per-entry TTL.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::cache::glob::GlobPattern;
use crate::cache::{Cache, CacheError};
use crate::config::settings::MemoryCacheConfig;
use crate::context::Context;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// Physical storage shared between [`MemoryCache`] handles.
///
/// Several caches with different prefixes can point at one store, the same
/// way several Redis clients can share one server.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.entries.len())
    }
}

/// In-memory cache namespaced by a key prefix.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: MemoryStore,
    key_prefix: String,
}

impl MemoryCache {
    pub fn new(config: &MemoryCacheConfig) -> Self {
        Self::with_store(MemoryStore::new(), &config.key_prefix)
    }

    /// Create a cache over an existing store.
    pub fn with_store(store: MemoryStore, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn live_value(&self, physical: &str) -> Option<Vec<u8>> {
        let entry = self.store.entries.get(physical)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.value.clone())
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get_bytes(&self, ctx: &Context, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        ctx.run("get", async {
            let prefixed = self.prefixed_key(key);
            let value = self.live_value(&prefixed);
            if value.is_none() {
                self.store
                    .entries
                    .remove_if(&prefixed, |_, entry| entry.is_expired());
            }
            Ok(value)
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
            self.store
                .entries
                .insert(self.prefixed_key(key), CacheEntry::new(value, ttl));
            Ok(())
        })
        .await
    }

    async fn has(&self, ctx: &Context, key: &str) -> Result<bool, CacheError> {
        ctx.run("has", async { Ok(self.live_value(&self.prefixed_key(key)).is_some()) })
            .await
    }

    async fn keys(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>, CacheError> {
        ctx.run("keys", async {
            let glob = GlobPattern::new(pattern)?;
            let mut keys: Vec<String> = self
                .store
                .entries
                .iter()
                .filter(|entry| !entry.value().is_expired())
                .filter_map(|entry| {
                    entry
                        .key()
                        .strip_prefix(self.key_prefix.as_str())
                        .map(str::to_string)
                })
                .filter(|logical| glob.matches(logical))
                .collect();
            keys.sort();
            Ok(keys)
        })
        .await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<bool, CacheError> {
        ctx.run("delete", async {
            let removed = self.store.entries.remove(&self.prefixed_key(key));
            Ok(removed.is_some_and(|(_, entry)| !entry.is_expired()))
        })
        .await
    }
}
