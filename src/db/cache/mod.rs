//! Best-effort memoization layer.
//!
//! `Cache` is a typed JSON facade over a pluggable `CacheStore`. Reads that
//! fail are treated as misses by the `cached!` macro and writes are fire and
//! forget, so an unreachable cache only costs us the memoization.

use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::ItemId;

mod macros;
pub mod memory;
pub mod redis_store;

pub use memory::MemoryCache;
pub use redis_store::{create_redis_client, CacheWriterHandle, RedisCache};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    CatalogDetails(ItemId),
    CatalogSearch(String),
    CatalogSimilar(ItemId),
    CatalogPopular(u32),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::CatalogDetails(id) => write!(f, "tmdb:movie:{}", id),
            CacheKey::CatalogSearch(query) => {
                write!(f, "tmdb:search:{}", query.trim().to_lowercase())
            }
            CacheKey::CatalogSimilar(id) => write!(f, "tmdb:similar:{}", id),
            CacheKey::CatalogPopular(page) => write!(f, "tmdb:popular:{}", page),
        }
    }
}

/// Raw string storage behind the cache
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Queues a write without waiting for it; failures are only logged
    fn set_in_background(&self, key: String, value: String, ttl_secs: u64);
}

/// Cache handler for storing and retrieving JSON values
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Retrieves and deserializes a value, `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        match self.store.get(&key.to_string()).await? {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Serializes the value and hands it to the store without blocking
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        self.store.set_in_background(key.to_string(), json, ttl);
    }
}
