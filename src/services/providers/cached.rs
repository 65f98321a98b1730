use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{CatalogItem, ItemId},
    services::providers::CatalogGateway,
};

/// Read-through cache in front of any catalog gateway
///
/// Metadata changes rarely, so every lookup is memoized for the configured
/// TTL. The cache is best-effort: see `cached!`.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn CatalogGateway>,
    cache: Cache,
    ttl_secs: u64,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogGateway>, cache: Cache, ttl_secs: u64) -> Self {
        Self {
            inner,
            cache,
            ttl_secs,
        }
    }
}

#[async_trait::async_trait]
impl CatalogGateway for CachedCatalog {
    async fn similar(&self, id: ItemId) -> AppResult<Vec<CatalogItem>> {
        cached!(self.cache, CacheKey::CatalogSimilar(id), self.ttl_secs, async {
            self.inner.similar(id).await
        })
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        cached!(
            self.cache,
            CacheKey::CatalogSearch(query.to_string()),
            self.ttl_secs,
            async { self.inner.search(query).await }
        )
    }

    async fn details(&self, id: ItemId) -> AppResult<Option<CatalogItem>> {
        cached!(self.cache, CacheKey::CatalogDetails(id), self.ttl_secs, async {
            self.inner.details(id).await
        })
    }

    async fn popular(&self, page: u32) -> AppResult<Vec<CatalogItem>> {
        cached!(self.cache, CacheKey::CatalogPopular(page), self.ttl_secs, async {
            self.inner.popular(page).await
        })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
