use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::{db::InteractionStore, error::AppResult, models::ReviewEntry};

/// Reviews returned by the trending list
pub const TRENDING_LIMIT: usize = 10;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// How engagement and recency combine into a trending score
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TrendingFormula {
    /// `likes * 2 + days since the Unix epoch`. One day of recency is worth
    /// half a like and the day term grows without bound, so recency dominates.
    #[default]
    Literal,
    /// `(likes * 2 + 1) * 0.5^(age / days)`: engagement halves in weight
    /// every `days` days.
    HalfLife { days: f64 },
}

impl TrendingFormula {
    pub fn score(&self, like_count: u32, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let engagement = f64::from(like_count) * 2.0;
        match *self {
            TrendingFormula::Literal => engagement + epoch_days(created_at),
            TrendingFormula::HalfLife { days } => {
                let age_days = (epoch_days(now) - epoch_days(created_at)).max(0.0);
                (engagement + 1.0) * 0.5f64.powf(age_days / days)
            }
        }
    }
}

fn epoch_days(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 / SECONDS_PER_DAY
}

/// Global ranking of public reviews
#[derive(Clone)]
pub struct TrendingRanker {
    store: Arc<dyn InteractionStore>,
    formula: TrendingFormula,
}

impl TrendingRanker {
    pub fn new(store: Arc<dyn InteractionStore>, formula: TrendingFormula) -> Self {
        Self { store, formula }
    }

    /// Top reviews with non-empty text, highest score first. Every review is
    /// scored; the cap applies only after sorting.
    pub async fn trending(&self) -> AppResult<Vec<ReviewEntry>> {
        let pool = self.store.review_entries().await?;
        Ok(rank(pool, self.formula, Utc::now()))
    }
}

/// Scores, sorts (stable, descending) and caps a review pool
pub fn rank(pool: Vec<ReviewEntry>, formula: TrendingFormula, now: DateTime<Utc>) -> Vec<ReviewEntry> {
    let mut scored: Vec<(f64, ReviewEntry)> = pool
        .into_iter()
        .filter(|entry| entry.activity.record.has_review_text())
        .map(|entry| {
            let score = formula.score(entry.like_count, entry.activity.record.created_at, now);
            (score, entry)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(TRENDING_LIMIT);
    scored.into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{
        ActivityEntry, AuthorSummary, CatalogItem, InteractionKind, InteractionRecord, ItemId,
    };
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn review(text: &str, likes: u32, created_at: DateTime<Utc>) -> ReviewEntry {
        let user_id = Uuid::new_v4();
        ReviewEntry {
            activity: ActivityEntry {
                record: InteractionRecord {
                    id: Uuid::new_v4(),
                    user_id,
                    item_id: ItemId(1),
                    kind: InteractionKind::Reviewed,
                    rating: None,
                    review_text: Some(text.to_string()),
                    created_at,
                },
                item: CatalogItem::placeholder(ItemId(1)),
                author: AuthorSummary {
                    id: user_id,
                    username: "critic".to_string(),
                    display_name: None,
                    avatar_url: None,
                },
            },
            like_count: likes,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_literal_score_adds_likes_to_epoch_days() {
        let at = Utc.with_ymd_and_hms(1970, 1, 11, 0, 0, 0).unwrap();
        assert_eq!(TrendingFormula::Literal.score(3, at, now()), 16.0);
    }

    #[test]
    fn test_scores_are_monotone_in_likes_and_recency() {
        let older = now() - Duration::days(30);
        let newer = now() - Duration::days(1);
        for formula in [TrendingFormula::Literal, TrendingFormula::HalfLife { days: 7.0 }] {
            assert!(formula.score(5, older, now()) >= formula.score(4, older, now()));
            assert!(formula.score(0, older, now()) <= formula.score(0, newer, now()));
        }
    }

    #[test]
    fn test_literal_favors_recency_over_likes() {
        let pool = vec![
            review("Old favourite", 10, now() - Duration::days(30)),
            review("Fresh take", 0, now() - Duration::hours(1)),
        ];
        let ranked = rank(pool, TrendingFormula::Literal, now());
        assert_eq!(
            ranked[0].activity.record.review_text.as_deref(),
            Some("Fresh take")
        );
    }

    #[test]
    fn test_half_life_lets_engagement_win() {
        let pool = vec![
            review("Fresh take", 0, now() - Duration::hours(1)),
            review("Old favourite", 50, now() - Duration::days(3)),
        ];
        let ranked = rank(pool, TrendingFormula::HalfLife { days: 7.0 }, now());
        assert_eq!(
            ranked[0].activity.record.review_text.as_deref(),
            Some("Old favourite")
        );
    }

    #[test]
    fn test_blank_reviews_are_filtered_and_list_capped() {
        let mut pool: Vec<ReviewEntry> = (0..12)
            .map(|i| review("Solid", i, now() - Duration::days(1)))
            .collect();
        pool.push(review("   ", 100, now()));

        let ranked = rank(pool, TrendingFormula::Literal, now());
        assert_eq!(ranked.len(), TRENDING_LIMIT);
        assert!(ranked.iter().all(|r| r.activity.record.has_review_text()));
        assert_eq!(ranked[0].like_count, 11);
    }

    #[tokio::test]
    async fn test_older_well_liked_review_outranks_many_newer_ones() {
        let store = MemoryStore::new();
        let author = store.add_user("critic").await;
        let now = Utc::now();
        let classic = store
            .log(author, ItemId(1), InteractionKind::Reviewed, Some(5.0), Some("Classic"), now - Duration::days(2))
            .await
            .unwrap();
        for i in 0..250 {
            store
                .log(author, ItemId(100 + i), InteractionKind::Reviewed, Some(3.0), Some("Fresh"), now)
                .await
                .unwrap();
        }
        for _ in 0..50 {
            let fan = store.add_user("fan").await;
            store.insert_review_like(fan, classic).await.unwrap();
        }

        let ranker = TrendingRanker::new(Arc::new(store), TrendingFormula::Literal);
        let ranked = ranker.trending().await.unwrap();
        assert_eq!(ranked.len(), TRENDING_LIMIT);
        assert_eq!(ranked[0].activity.record.id, classic);
        assert_eq!(ranked[0].like_count, 50);
    }

    #[test]
    fn test_ties_keep_pool_order() {
        let at = now() - Duration::days(2);
        let pool = vec![review("first", 1, at), review("second", 1, at)];
        let ranked = rank(pool, TrendingFormula::Literal, now());
        assert_eq!(ranked[0].activity.record.review_text.as_deref(), Some("first"));
    }
}
