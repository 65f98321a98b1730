//! TMDB catalog provider
//!
//! Raw lookups against the TMDB v3 REST API. Every request goes through
//! `with_retry`; memoization is layered on top by `CachedCatalog`.
//!
//! Endpoints:
//! 1. Similar: /movie/{id}/similar
//! 2. Search:  /search/movie?query=
//! 3. Details: /movie/{id}
//! 4. Popular: /movie/popular?page=
use crate::{
    error::{AppError, AppResult},
    models::{
        tmdb::{TmdbMovie, TmdbPage},
        CatalogItem, ItemId,
    },
    services::providers::{
        retry::{with_retry, RetryPolicy},
        CatalogGateway,
    },
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

/// List endpoints are capped to one page of this many items
const MAX_LIST_RESULTS: usize = 20;

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    retry: RetryPolicy,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String, retry: RetryPolicy) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_url, endpoint)
    }

    /// GETs a TMDB endpoint, `None` on 404
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> AppResult<Option<T>> {
        with_retry(&self.retry, endpoint, || self.fetch_once(endpoint, params)).await
    }

    async fn fetch_once<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> AppResult<Option<T>> {
        let response = self
            .http_client
            .get(self.endpoint_url(endpoint))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                endpoint,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(endpoint, error = %e, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })?;

        Ok(Some(parsed))
    }

    async fn fetch_list(&self, endpoint: &str, params: &[(&str, &str)]) -> AppResult<Vec<CatalogItem>> {
        let page: Option<TmdbPage> = self.fetch(endpoint, params).await?;
        let items = page.map(page_items).unwrap_or_default();

        tracing::debug!(
            endpoint,
            results = items.len(),
            provider = "tmdb",
            "Catalog list fetched"
        );

        Ok(items)
    }
}

fn page_items(page: TmdbPage) -> Vec<CatalogItem> {
    page.results
        .into_iter()
        .take(MAX_LIST_RESULTS)
        .map(CatalogItem::from)
        .collect()
}

#[async_trait::async_trait]
impl CatalogGateway for TmdbCatalog {
    async fn similar(&self, id: ItemId) -> AppResult<Vec<CatalogItem>> {
        self.fetch_list(&format!("movie/{}/similar", id), &[]).await
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }
        self.fetch_list("search/movie", &[("query", query), ("page", "1")])
            .await
    }

    async fn details(&self, id: ItemId) -> AppResult<Option<CatalogItem>> {
        let movie: Option<TmdbMovie> = self.fetch(&format!("movie/{}", id), &[]).await?;
        Ok(movie.map(CatalogItem::from))
    }

    async fn popular(&self, page: u32) -> AppResult<Vec<CatalogItem>> {
        let page = page.max(1).to_string();
        self.fetch_list("movie/popular", &[("page", page.as_str())])
            .await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
