use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{
    ai_fallback::{AiFallbackResolver, HistoryEntry},
    seeds::{SeedPicker, SeedSelector},
    similarity::SimilarityRecommender,
    social::SocialAggregator,
};
use crate::{
    db::InteractionStore,
    error::{AppError, AppResult},
    models::{
        ActivityQuery, CandidateSource, CatalogItem, Category, InteractionKind, ItemId,
        RecommendationCandidate, RecommendationItem, SectionKey, Sections, SeedSource, UserId,
    },
    services::providers::{CatalogGateway, TextGenerator},
};

/// History entries handed to the generator
const HISTORY_LIMIT: usize = 50;
/// History entries returned to the caller
pub const VIEWING_HISTORY_LIMIT: usize = 20;

/// A user's own journal entries are never suggested back in seeded sections
const CONSUMED_KINDS: [InteractionKind; 2] = [InteractionKind::Rated, InteractionKind::Reviewed];

/// Titles already shown in earlier sections of the same pass
#[derive(Debug, Default)]
struct SurfacedTitles {
    titles: Vec<String>,
    keys: HashSet<String>,
}

impl SurfacedTitles {
    fn key(title: &str) -> String {
        title.trim().to_lowercase()
    }

    fn contains(&self, item: &CatalogItem) -> bool {
        !item.is_placeholder() && self.keys.contains(&Self::key(&item.title))
    }

    fn extend(&mut self, items: &[CatalogItem]) {
        for item in items.iter().filter(|item| !item.is_placeholder()) {
            if self.keys.insert(Self::key(&item.title)) {
                self.titles.push(item.title.clone());
            }
        }
    }

    fn titles(&self) -> &[String] {
        &self.titles
    }
}

/// Drives one orchestration pass per request
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn InteractionStore>,
    catalog: Arc<dyn CatalogGateway>,
    seeds: SeedSelector,
    similarity: SimilarityRecommender,
    fallback: AiFallbackResolver,
    social: SocialAggregator,
}

impl RecommendationEngine {
    pub fn new(
        store: Arc<dyn InteractionStore>,
        catalog: Arc<dyn CatalogGateway>,
        generator: Arc<dyn TextGenerator>,
        picker: Arc<dyn SeedPicker>,
        seed_count: usize,
    ) -> Self {
        Self {
            seeds: SeedSelector::new(store.clone(), seed_count),
            similarity: SimilarityRecommender::new(catalog.clone(), picker, seed_count),
            fallback: AiFallbackResolver::new(generator, catalog.clone()),
            social: SocialAggregator::new(store.clone()),
            store,
            catalog,
        }
    }

    /// Every section for the caller; logged-out callers get the static table.
    ///
    /// Never fails. A section whose pipeline errored is left out and the
    /// rest are still returned.
    pub async fn sections(&self, user: Option<UserId>) -> Sections {
        match user {
            Some(user_id) => self.personalized(user_id).await,
            None => static_sections(),
        }
    }

    /// A single section evaluated on its own
    pub async fn section(
        &self,
        user: Option<UserId>,
        key: SectionKey,
    ) -> AppResult<Vec<RecommendationItem>> {
        let items: Vec<CatalogItem> = match (user, key) {
            (_, SectionKey::Category(Category::Trending)) => {
                match self.pull(None, Category::Trending).await {
                    Ok(candidates) => candidates.into_iter().map(|c| c.item).collect(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Popular films unavailable, trending section empty");
                        vec![]
                    }
                }
            }
            (None, _) => return Err(AppError::Unauthorized),
            (Some(user_id), key) => {
                let (category, pulled) = match key {
                    SectionKey::Category(category) => {
                        (category, self.pull(Some(user_id), category).await)
                    }
                    SectionKey::Seed(source) => (
                        fallback_category(source),
                        self.similarity_candidates(user_id, source)
                            .await
                            .map(|items| RecommendationCandidate::ranked(items, CandidateSource::Similarity)),
                    ),
                };
                let (consumed, history) = tokio::join!(
                    self.store.interacted_item_ids(user_id, &CONSUMED_KINDS),
                    self.history(user_id),
                );
                let consumed = consumed?;

                self.assemble(
                    category,
                    pulled,
                    Some(&consumed),
                    &history,
                    &SurfacedTitles::default(),
                )
                .await?
            }
        };

        Ok(items.into_iter().map(RecommendationItem::from).collect())
    }

    async fn personalized(&self, user_id: UserId) -> Sections {
        // Independent reads and external pulls run together; only the
        // surfaced-titles accumulator below is sequential.
        let pulls = join_all(
            Category::ALL
                .into_iter()
                .map(|category| async move { (category, self.pull(Some(user_id), category).await) }),
        );
        let (pulls, consumed, history) = tokio::join!(
            pulls,
            self.store.interacted_item_ids(user_id, &CONSUMED_KINDS),
            self.history(user_id),
        );

        let consumed = consumed
            .map_err(|e| {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Could not load consumed items, seeded sections skipped"
                );
            })
            .ok();

        let mut pulled: HashMap<Category, AppResult<Vec<RecommendationCandidate>>> =
            pulls.into_iter().collect();
        let mut surfaced = SurfacedTitles::default();
        let mut sections = Sections::new();

        for category in Category::ALL {
            let Some(pulled) = pulled.remove(&category) else {
                continue;
            };

            match self
                .assemble(category, pulled, consumed.as_ref(), &history, &surfaced)
                .await
            {
                Ok(items) => {
                    surfaced.extend(&items);
                    sections.insert(
                        category,
                        items.iter().map(RecommendationItem::from).collect(),
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        category = %category,
                        error = %e,
                        "Recommendation section failed"
                    );
                }
            }
        }

        tracing::info!(
            user_id = %user_id,
            sections = sections.len(),
            surfaced = surfaced.titles().len(),
            "Recommendations assembled"
        );

        sections
    }

    /// First-stage candidates for a category, ranked in the order their
    /// strategy produced them
    async fn pull(
        &self,
        user: Option<UserId>,
        category: Category,
    ) -> AppResult<Vec<RecommendationCandidate>> {
        let (items, source) = match (category.seed_source(), category, user) {
            (_, Category::Trending, _) => (self.catalog.popular(1).await?, CandidateSource::Popular),
            (Some(source), _, Some(user_id)) => (
                self.similarity_candidates(user_id, source).await?,
                CandidateSource::Similarity,
            ),
            (None, Category::Following, Some(user_id)) => {
                (self.social.candidates(user_id).await?, CandidateSource::Social)
            }
            (_, _, None) => return Err(AppError::Unauthorized),
            (None, _, Some(_)) => (vec![], CandidateSource::Popular),
        };
        Ok(RecommendationCandidate::ranked(items, source))
    }

    async fn similarity_candidates(
        &self,
        user_id: UserId,
        source: SeedSource,
    ) -> AppResult<Vec<CatalogItem>> {
        let seeds = self.seeds.select(user_id, source).await?;
        Ok(self.similarity.recommend(&seeds).await)
    }

    /// Turns first-stage candidates into a section, falling back to
    /// generative suggestions when a seeded section ends up empty
    async fn assemble(
        &self,
        category: Category,
        pulled: AppResult<Vec<RecommendationCandidate>>,
        consumed: Option<&HashSet<ItemId>>,
        history: &[HistoryEntry],
        surfaced: &SurfacedTitles,
    ) -> AppResult<Vec<CatalogItem>> {
        let candidates = pulled?;

        let seeded = category.seed_source().is_some();
        // Without the consumed set a seeded section cannot be filtered, so
        // the caller drops it from the map instead of serving read items.
        let exclude = if seeded {
            Some(consumed.ok_or_else(|| {
                AppError::Internal("Consumed items unavailable".to_string())
            })?)
        } else {
            None
        };

        let items = self.refine(candidates, exclude, surfaced).await;
        if !items.is_empty() || !seeded {
            return Ok(items);
        }

        tracing::debug!(category = %category, "Similarity empty, using generative fallback");
        let suggested = self
            .fallback
            .suggest(category, history, surfaced.titles())
            .await;
        let suggested = RecommendationCandidate::ranked(suggested, CandidateSource::Generative);
        Ok(self.refine(suggested, exclude, surfaced).await)
    }

    /// Enriches placeholders, orders by rank, then drops duplicates, consumed
    /// items and titles already surfaced
    async fn refine(
        &self,
        candidates: Vec<RecommendationCandidate>,
        exclude: Option<&HashSet<ItemId>>,
        surfaced: &SurfacedTitles,
    ) -> Vec<CatalogItem> {
        let mut candidates = self.enrich(candidates).await;
        candidates.sort_by_key(|candidate| candidate.rank);

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let item = candidate.item;
            if !seen.insert(item.id) {
                continue;
            }
            if exclude.is_some_and(|ids| ids.contains(&item.id)) || surfaced.contains(&item) {
                tracing::debug!(
                    item_id = %item.id,
                    source = ?candidate.source,
                    rank = candidate.rank,
                    "Candidate filtered"
                );
                continue;
            }
            items.push(item);
        }
        items
    }

    /// Replaces "Unknown Title" placeholders with catalog details where possible
    async fn enrich(&self, candidates: Vec<RecommendationCandidate>) -> Vec<RecommendationCandidate> {
        join_all(candidates.into_iter().map(|mut candidate| async move {
            if !candidate.item.is_placeholder() {
                return candidate;
            }
            match self.catalog.details(candidate.item.id).await {
                Ok(Some(details)) => candidate.item = details,
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(item_id = %candidate.item.id, error = %e, "Could not enrich placeholder");
                }
            }
            candidate
        }))
        .await
    }

    /// The caller's recent rated films, newest first
    pub async fn viewing_history(&self, user_id: UserId) -> AppResult<Vec<HistoryEntry>> {
        self.load_history(user_id, VIEWING_HISTORY_LIMIT).await
    }

    /// History for the generator; a failed read only thins the prompt
    async fn history(&self, user_id: UserId) -> Vec<HistoryEntry> {
        self.load_history(user_id, HISTORY_LIMIT)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = %user_id, error = %e, "Could not load viewing history");
                vec![]
            })
    }

    async fn load_history(&self, user_id: UserId, limit: usize) -> AppResult<Vec<HistoryEntry>> {
        let query = ActivityQuery::new(SeedSource::Rated.kinds(), limit);
        let entries = self.store.recent_activity(&[user_id], &query).await?;

        let mut seen = HashSet::new();
        Ok(entries
            .into_iter()
            .filter(|entry| !entry.item.is_placeholder() && seen.insert(entry.item.id))
            .filter_map(|entry| {
                entry.record.rating.map(|rating| HistoryEntry {
                    title: entry.item.title,
                    rating,
                })
            })
            .collect())
    }
}

/// Section whose prompt a seed key borrows when it falls back
fn fallback_category(source: SeedSource) -> Category {
    match source {
        SeedSource::Liked => Category::TopPicks,
        SeedSource::Watchlist => Category::HiddenGems,
        SeedSource::Rated => Category::MoreLikeThis,
    }
}

const STATIC_TOP_PICKS: [(i64, &str, Option<&str>); 5] = [
    (278, "The Shawshank Redemption", Some("/9cqNxx0GxF0bflZmeSMuL5tnGyn.jpg")),
    (238, "The Godfather", Some("/3bhkrj58Vtu7enYsRolD1fZdja1.jpg")),
    (240, "The Godfather Part II", Some("/hek3koDUyRQk7FIhPXsa6mT2Zc3.jpg")),
    (424, "Schindler's List", Some("/sF1U4EUQS8YHGqg6BgzA0mFAbqi.jpg")),
    (129, "Spirited Away", Some("/39wmItIWsg5sZMyRUHLkWBcuVCM.jpg")),
];

const STATIC_HIDDEN_GEMS: [(i64, &str, Option<&str>); 5] = [
    (389, "12 Angry Men", None),
    (637, "Life Is Beautiful", Some("/74hLDKjD5aK1cdzG9OCteBbasti.jpg")),
    (539, "Psycho", Some("/86lekcTf6nKkX8O0vM429aN2oPl.jpg")),
    (
        122,
        "The Lord of the Rings: The Return of the King",
        Some("/rCzpDGLbOoPwLjy3OAm5NUPOTrC.jpg"),
    ),
    (155, "The Dark Knight", Some("/qJ2tW6WMUDux911r6m7haRef0WH.jpg")),
];

/// Fixed table served to logged-out visitors
pub fn static_sections() -> Sections {
    let to_items = |table: &[(i64, &str, Option<&str>)]| -> Vec<RecommendationItem> {
        table
            .iter()
            .map(|(id, title, poster)| RecommendationItem {
                id: ItemId(*id),
                title: title.to_string(),
                poster_path: poster.map(str::to_string),
            })
            .collect()
    };

    let mut sections = Sections::new();
    sections.insert(Category::TopPicks, to_items(&STATIC_TOP_PICKS));
    sections.insert(Category::HiddenGems, to_items(&STATIC_HIDDEN_GEMS));
    sections
}
