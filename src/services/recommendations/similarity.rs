use std::sync::Arc;

use super::seeds::SeedPicker;
use crate::{
    models::{CatalogItem, ItemId},
    services::providers::CatalogGateway,
};

/// Seeds tried before giving up on similarity expansion
const MAX_ATTEMPTS: usize = 2;

/// Expands a seed set into candidates via the catalog's "similar" lookup
#[derive(Clone)]
pub struct SimilarityRecommender {
    catalog: Arc<dyn CatalogGateway>,
    picker: Arc<dyn SeedPicker>,
    /// Only the first `window` seeds are eligible
    window: usize,
}

impl SimilarityRecommender {
    pub fn new(catalog: Arc<dyn CatalogGateway>, picker: Arc<dyn SeedPicker>, window: usize) -> Self {
        Self {
            catalog,
            picker,
            window,
        }
    }

    /// Similar items for a randomly chosen seed, retrying once with another seed.
    ///
    /// Empty when there are no seeds or every attempt failed or came back
    /// empty; the caller falls back to generative suggestions.
    pub async fn recommend(&self, seeds: &[ItemId]) -> Vec<CatalogItem> {
        let mut remaining: Vec<ItemId> = seeds.iter().take(self.window).copied().collect();

        for attempt in 1..=MAX_ATTEMPTS {
            if remaining.is_empty() {
                break;
            }
            let seed = remaining.remove(self.picker.pick(remaining.len()));

            match self.catalog.similar(seed).await {
                Ok(items) if !items.is_empty() => {
                    tracing::debug!(
                        seed = %seed,
                        attempt,
                        results = items.len(),
                        "Similarity expansion succeeded"
                    );
                    return items;
                }
                Ok(_) => {
                    tracing::debug!(seed = %seed, attempt, "No similar items for seed");
                }
                Err(e) => {
                    tracing::warn!(
                        seed = %seed,
                        attempt,
                        provider = self.catalog.name(),
                        error = %e,
                        "Similarity lookup failed"
                    );
                }
            }
        }

        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockCatalogGateway;
    use crate::services::recommendations::seeds::tests::ScriptedPicker;

    fn film(id: i64) -> CatalogItem {
        CatalogItem {
            id: ItemId(id),
            title: format!("Film {}", id),
            release_year: None,
            poster_path: None,
        }
    }

    fn recommender(catalog: MockCatalogGateway, picks: Vec<usize>) -> SimilarityRecommender {
        SimilarityRecommender::new(Arc::new(catalog), Arc::new(ScriptedPicker::new(picks)), 5)
    }

    #[tokio::test]
    async fn test_empty_seed_set_skips_catalog() {
        let mut catalog = MockCatalogGateway::new();
        catalog.expect_similar().never();

        let items = recommender(catalog, vec![]).recommend(&[]).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_uses_picked_seed() {
        let mut catalog = MockCatalogGateway::new();
        catalog
            .expect_similar()
            .withf(|id| *id == ItemId(20))
            .times(1)
            .returning(|_| Ok(vec![film(100)]));

        let items = recommender(catalog, vec![1])
            .recommend(&[ItemId(10), ItemId(20), ItemId(30)])
            .await;
        assert_eq!(items, vec![film(100)]);
    }

    #[tokio::test]
    async fn test_retries_with_a_different_seed() {
        let mut catalog = MockCatalogGateway::new();
        catalog
            .expect_similar()
            .withf(|id| *id == ItemId(10))
            .times(1)
            .returning(|_| Ok(vec![]));
        catalog
            .expect_similar()
            .withf(|id| *id == ItemId(20))
            .times(1)
            .returning(|_| Ok(vec![film(200)]));

        let items = recommender(catalog, vec![0, 0])
            .recommend(&[ItemId(10), ItemId(20)])
            .await;
        assert_eq!(items, vec![film(200)]);
    }

    #[tokio::test]
    async fn test_gives_up_after_two_attempts() {
        let mut catalog = MockCatalogGateway::new();
        catalog
            .expect_similar()
            .times(2)
            .returning(|_| Err(AppError::Timeout(20_000)));

        let items = recommender(catalog, vec![0, 0])
            .recommend(&[ItemId(1), ItemId(2), ItemId(3)])
            .await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_single_seed_gets_one_attempt() {
        let mut catalog = MockCatalogGateway::new();
        catalog.expect_similar().times(1).returning(|_| Ok(vec![]));

        let items = recommender(catalog, vec![]).recommend(&[ItemId(1)]).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_seeds_beyond_window_are_ignored() {
        let mut catalog = MockCatalogGateway::new();
        catalog
            .expect_similar()
            .withf(|id| *id == ItemId(2))
            .times(1)
            .returning(|_| Ok(vec![film(5)]));

        let recommender = SimilarityRecommender::new(
            Arc::new(catalog),
            Arc::new(ScriptedPicker::new(vec![9])),
            2,
        );
        let items = recommender
            .recommend(&[ItemId(1), ItemId(2), ItemId(3)])
            .await;
        assert_eq!(items.len(), 1);
    }
}
