//! Cache command handler
//!
//! Runs one cache operation and renders its result as text.

use std::sync::Arc;

use crate::cache::{Cache, CacheError, CacheExt};
use crate::cli::parser::Commands;
use crate::context::Context;

/// Handler for the cache subcommands
pub struct CacheCommandHandler {
    cache: Arc<dyn Cache>,
}

impl CacheCommandHandler {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Execute `command` and return the text to print.
    ///
    /// # Errors
    /// Returns the backend's [`CacheError`]; `get` on a missing key yields
    /// [`CacheError::NotFound`].
    pub async fn execute(&self, ctx: &Context, command: &Commands) -> Result<String, CacheError> {
        match command {
            Commands::Ping => {
                self.cache.ping(ctx).await?;
                Ok("PONG".to_string())
            }
            Commands::Get { key } => {
                let value: serde_json::Value = self.cache.get(ctx, key).await?;
                serde_json::to_string_pretty(&value).map_err(|source| CacheError::Serialization {
                    key: key.clone(),
                    source,
                })
            }
            Commands::Set { key, value, ttl } => {
                let ttl = ttl.unwrap_or_default();
                self.cache.set(ctx, key, value, ttl).await?;
                tracing::debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Stored value");
                Ok("OK".to_string())
            }
            Commands::Has { key } => Ok(self.cache.has(ctx, key).await?.to_string()),
            Commands::Keys { pattern } => Ok(self.cache.keys(ctx, pattern).await?.join("\n")),
            Commands::Del { key } => {
                let removed = self.cache.delete(ctx, key).await?;
                Ok(if removed { "1" } else { "0" }.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::settings::MemoryCacheConfig;
    use std::time::Duration;

    fn handler() -> CacheCommandHandler {
        CacheCommandHandler::new(Arc::new(MemoryCache::new(&MemoryCacheConfig::default())))
    }

    fn set(key: &str, value: serde_json::Value, ttl: Option<Duration>) -> Commands {
        Commands::Set {
            key: key.to_string(),
            value,
            ttl,
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let ctx = Context::background();
        assert_eq!(handler().execute(&ctx, &Commands::Ping).await.unwrap(), "PONG");
    }

    #[tokio::test]
    async fn test_set_get_has_del() {
        let ctx = Context::background();
        let handler = handler();
        let key = "user:1".to_string();

        let stored = handler
            .execute(&ctx, &set(&key, serde_json::json!({"name": "alice"}), None))
            .await
            .unwrap();
        assert_eq!(stored, "OK");

        let printed = handler.execute(&ctx, &Commands::Get { key: key.clone() }).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(parsed, serde_json::json!({"name": "alice"}));

        let has = handler.execute(&ctx, &Commands::Has { key: key.clone() }).await.unwrap();
        assert_eq!(has, "true");

        let del = Commands::Del { key: key.clone() };
        assert_eq!(handler.execute(&ctx, &del).await.unwrap(), "1");
        assert_eq!(handler.execute(&ctx, &del).await.unwrap(), "0");

        let missing = handler.execute(&ctx, &Commands::Get { key }).await;
        assert!(matches!(missing, Err(CacheError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_set_with_ttl_expires() {
        let ctx = Context::background();
        let handler = handler();

        handler
            .execute(&ctx, &set("flash", serde_json::json!("saved"), Some(Duration::from_millis(50))))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        let has = handler
            .execute(&ctx, &Commands::Has { key: "flash".to_string() })
            .await
            .unwrap();
        assert_eq!(has, "false");
    }

    #[tokio::test]
    async fn test_keys_lists_matches() {
        let ctx = Context::background();
        let handler = handler();

        for key in ["user:2", "user:1", "order:1"] {
            handler.execute(&ctx, &set(key, serde_json::json!(1), None)).await.unwrap();
        }

        let listed = handler
            .execute(&ctx, &Commands::Keys { pattern: "user:*".to_string() })
            .await
            .unwrap();
        assert_eq!(listed, "user:1\nuser:2");
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let ctx = Context::background();
        ctx.cancel();
        let result = handler().execute(&ctx, &Commands::Ping).await;
        assert!(matches!(result, Err(CacheError::Cancelled { .. })));
    }
}
