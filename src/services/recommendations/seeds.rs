use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::InteractionStore,
    error::AppResult,
    models::{ActivityQuery, ItemId, Rating, SeedSource, UserId},
};

/// Chooses which seed to expand next
///
/// Production picks uniformly at random; tests plug in a fixed sequence.
pub trait SeedPicker: Send + Sync {
    /// Index in `0..len`; only called with `len > 0`
    fn pick(&self, len: usize) -> usize;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPicker;

impl SeedPicker for UniformPicker {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

const OVERFETCH_FACTOR: usize = 3;

/// Pulls the most recent seed items out of a user's history
#[derive(Clone)]
pub struct SeedSelector {
    store: Arc<dyn InteractionStore>,
    count: usize,
}

impl SeedSelector {
    pub fn new(store: Arc<dyn InteractionStore>, count: usize) -> Self {
        Self { store, count }
    }

    /// Up to `count` item ids, newest first. Rated seeds need at least 4 stars.
    pub async fn select(&self, user_id: UserId, source: SeedSource) -> AppResult<Vec<ItemId>> {
        // Rows repeat a film when it was both rated and reviewed
        let fetch = self.count.saturating_mul(OVERFETCH_FACTOR);
        let mut query = ActivityQuery::new(source.kinds(), fetch);
        if source == SeedSource::Rated {
            query = query.min_rating(Rating::HIGH);
        }

        let entries = self.store.recent_activity(&[user_id], &query).await?;

        // A film can be both logged and reviewed; seed it once
        let mut seen = HashSet::new();
        let seeds: Vec<ItemId> = entries
            .into_iter()
            .map(|entry| entry.record.item_id)
            .filter(|id| seen.insert(*id))
            .take(self.count)
            .collect();

        tracing::debug!(
            user_id = %user_id,
            source = source.as_str(),
            seeds = seeds.len(),
            "Seeds selected"
        );

        Ok(seeds)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::InteractionKind;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    /// Replays a fixed list of picks, then falls back to index 0
    pub(crate) struct ScriptedPicker(pub Mutex<Vec<usize>>);

    impl ScriptedPicker {
        pub(crate) fn new(picks: Vec<usize>) -> Self {
            let mut picks = picks;
            picks.reverse();
            Self(Mutex::new(picks))
        }
    }

    impl SeedPicker for ScriptedPicker {
        fn pick(&self, len: usize) -> usize {
            let next = self.0.lock().unwrap().pop().unwrap_or(0);
            next.min(len - 1)
        }
    }

    #[test]
    fn test_uniform_picker_stays_in_range() {
        for len in 1..20 {
            assert!(UniformPicker.pick(len) < len);
        }
    }

    #[tokio::test]
    async fn test_rated_seeds_skip_low_ratings() {
        let store = MemoryStore::new();
        let user = store.add_user("a").await;
        let now = Utc::now();
        store
            .log(user, ItemId(1), InteractionKind::Rated, Some(5.0), None, now - Duration::days(2))
            .await
            .unwrap();
        store
            .log(user, ItemId(2), InteractionKind::Rated, Some(4.5), None, now - Duration::days(1))
            .await
            .unwrap();
        store
            .log(user, ItemId(3), InteractionKind::Rated, Some(2.0), None, now)
            .await
            .unwrap();

        let selector = SeedSelector::new(Arc::new(store), 5);
        let seeds = selector.select(user, SeedSource::Rated).await.unwrap();
        assert_eq!(seeds, vec![ItemId(2), ItemId(1)]);
    }

    #[tokio::test]
    async fn test_reviews_count_as_rated_seeds_once() {
        let store = MemoryStore::new();
        let user = store.add_user("a").await;
        let now = Utc::now();
        store
            .log(user, ItemId(9), InteractionKind::Rated, Some(4.0), None, now - Duration::hours(1))
            .await
            .unwrap();
        store
            .log(user, ItemId(9), InteractionKind::Reviewed, Some(4.0), Some("Loved it"), now)
            .await
            .unwrap();

        let selector = SeedSelector::new(Arc::new(store), 5);
        let seeds = selector.select(user, SeedSource::Rated).await.unwrap();
        assert_eq!(seeds, vec![ItemId(9)]);
    }

    #[tokio::test]
    async fn test_duplicate_rows_do_not_crowd_out_seeds() {
        let store = MemoryStore::new();
        let user = store.add_user("a").await;
        let now = Utc::now();
        for i in 0..3 {
            let at = now - Duration::hours(i);
            store
                .log(user, ItemId(i), InteractionKind::Reviewed, Some(5.0), Some("Great"), at)
                .await
                .unwrap();
            store
                .log(user, ItemId(i), InteractionKind::Rated, Some(5.0), None, at - Duration::minutes(1))
                .await
                .unwrap();
        }

        let selector = SeedSelector::new(Arc::new(store), 3);
        let seeds = selector.select(user, SeedSource::Rated).await.unwrap();
        assert_eq!(seeds, vec![ItemId(0), ItemId(1), ItemId(2)]);
    }

    #[tokio::test]
    async fn test_seed_count_caps_selection() {
        let store = MemoryStore::new();
        let user = store.add_user("a").await;
        let now = Utc::now();
        for i in 0..8 {
            store
                .log(user, ItemId(i), InteractionKind::Liked, None, None, now - Duration::minutes(i))
                .await
                .unwrap();
        }

        let selector = SeedSelector::new(Arc::new(store), 5);
        let seeds = selector.select(user, SeedSource::Liked).await.unwrap();
        assert_eq!(seeds, (0..5).map(ItemId).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_empty_history_yields_no_seeds() {
        let store = MemoryStore::new();
        let user = store.add_user("new").await;
        let selector = SeedSelector::new(Arc::new(store), 5);

        for source in [SeedSource::Rated, SeedSource::Liked, SeedSource::Watchlist] {
            assert!(selector.select(user, source).await.unwrap().is_empty());
        }
    }
}
