//! External collaborators of the recommendation engine.
//!
//! The film catalog and the generative text service sit behind traits so the
//! engine can be exercised against stubs, and so caching and retry can be
//! layered on without the engine noticing.

use crate::{
    error::AppResult,
    models::{CatalogItem, ItemId},
};

pub mod cached;
pub mod gemini;
pub mod retry;
pub mod tmdb;

pub use cached::CachedCatalog;
pub use gemini::{DisabledGenerator, GeminiClient};
pub use tmdb::TmdbCatalog;

/// Film catalog lookups
///
/// Any call may fail or come back empty; callers treat both as "nothing here".
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Films the catalog considers similar to `id`
    async fn similar(&self, id: ItemId) -> AppResult<Vec<CatalogItem>>;

    /// Title search, best match first
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>>;

    /// Canonical metadata for one film, `None` if the catalog does not know it
    async fn details(&self, id: ItemId) -> AppResult<Option<CatalogItem>>;

    /// Currently popular films
    async fn popular(&self, page: u32) -> AppResult<Vec<CatalogItem>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Free-text generation backing the generative suggestion path
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Completes `prompt` and returns the raw model text
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}
