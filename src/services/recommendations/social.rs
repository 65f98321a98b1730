use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    db::InteractionStore,
    error::AppResult,
    models::{ActivityQuery, CatalogItem, InteractionKind, ItemId, Rating, UserId},
};

/// Records pulled from each source list
const SOURCE_LIMIT: usize = 20;
/// Candidates returned
const MAX_CANDIDATES: usize = 10;

/// Candidates built from what followed accounts liked or rated highly
#[derive(Clone)]
pub struct SocialAggregator {
    store: Arc<dyn InteractionStore>,
}

impl SocialAggregator {
    pub fn new(store: Arc<dyn InteractionStore>) -> Self {
        Self { store }
    }

    /// Up to 10 items ranked by how many source records mention them.
    ///
    /// The score is an appearance count across the "liked" and "rated 4+"
    /// lists, not a like total. Ties keep first-seen order. Anything the
    /// user has already logged is excluded.
    pub async fn candidates(&self, user_id: UserId) -> AppResult<Vec<CatalogItem>> {
        let followees = self.store.followee_ids(user_id).await?;
        if followees.is_empty() {
            return Ok(vec![]);
        }

        let liked = ActivityQuery::new([InteractionKind::Liked], SOURCE_LIMIT);
        let rated = ActivityQuery::new([InteractionKind::Rated, InteractionKind::Reviewed], SOURCE_LIMIT)
            .min_rating(Rating::HIGH);

        let (liked, rated, consumed) = tokio::try_join!(
            self.store.recent_activity(&followees, &liked),
            self.store.recent_activity(&followees, &rated),
            self.store.interacted_item_ids(user_id, &InteractionKind::ALL),
        )?;

        // Union in list order, counting appearances
        let mut order: Vec<CatalogItem> = Vec::new();
        let mut counts: HashMap<ItemId, usize> = HashMap::new();
        for entry in liked.into_iter().chain(rated) {
            let count = counts.entry(entry.item.id).or_insert(0);
            if *count == 0 {
                order.push(entry.item);
            }
            *count += 1;
        }

        let mut ranked: Vec<(CatalogItem, usize)> = order
            .into_iter()
            .filter(|item| !consumed.contains(&item.id))
            .map(|item| {
                let count = counts.get(&item.id).copied().unwrap_or(0);
                (item, count)
            })
            .collect();

        // Stable: equal counts keep union order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(MAX_CANDIDATES);

        tracing::debug!(
            user_id = %user_id,
            followees = followees.len(),
            candidates = ranked.len(),
            "Social candidates aggregated"
        );

        Ok(ranked.into_iter().map(|(item, _)| item).collect())
    }
}
