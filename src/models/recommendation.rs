use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use super::{CatalogItem, InteractionKind, ItemId};
use crate::error::AppError;

/// Sections computed by a full orchestration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    TopPicks,
    HiddenGems,
    MoreLikeThis,
    Following,
    Trending,
}

impl Category {
    /// Evaluation order of a pass; earlier sections win title de-duplication
    pub const ALL: [Category; 5] = [
        Category::TopPicks,
        Category::HiddenGems,
        Category::MoreLikeThis,
        Category::Following,
        Category::Trending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TopPicks => "top-picks",
            Category::HiddenGems => "hidden-gems",
            Category::MoreLikeThis => "more-like-this",
            Category::Following => "following",
            Category::Trending => "trending",
        }
    }

    /// History used to seed the similarity path, `None` for non-seeded sections
    pub fn seed_source(&self) -> Option<SeedSource> {
        match self {
            Category::TopPicks => Some(SeedSource::Liked),
            Category::HiddenGems => Some(SeedSource::Watchlist),
            Category::MoreLikeThis => Some(SeedSource::Rated),
            Category::Following | Category::Trending => None,
        }
    }

    /// Instruction handed to the generative service for this section
    pub fn prompt_hint(&self) -> &'static str {
        match self {
            Category::TopPicks => "suggest highly-rated and popular films.",
            Category::HiddenGems => "suggest lesser-known but critically acclaimed films.",
            Category::MoreLikeThis => {
                "suggest films similar to the first film in the viewing history, which is the most recent one."
            }
            Category::Following => "suggest films popular with people the user follows.",
            Category::Trending => "suggest films that are popular right now.",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which slice of a user's history seeds similarity expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedSource {
    Rated,
    Liked,
    Watchlist,
}

impl SeedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedSource::Rated => "rated",
            SeedSource::Liked => "liked",
            SeedSource::Watchlist => "watchlist",
        }
    }

    /// Journal entries carry their rating on both plain logs and reviews
    pub fn kinds(&self) -> &'static [InteractionKind] {
        match self {
            SeedSource::Rated => &[InteractionKind::Rated, InteractionKind::Reviewed],
            SeedSource::Liked => &[InteractionKind::Liked],
            SeedSource::Watchlist => &[InteractionKind::Watchlisted],
        }
    }
}

/// A key accepted by the single-section endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKey {
    Category(Category),
    Seed(SeedSource),
}

impl FromStr for SectionKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "top-picks" => SectionKey::Category(Category::TopPicks),
            "hidden-gems" => SectionKey::Category(Category::HiddenGems),
            "more-like-this" => SectionKey::Category(Category::MoreLikeThis),
            "following" => SectionKey::Category(Category::Following),
            "trending" => SectionKey::Category(Category::Trending),
            "rated" => SectionKey::Seed(SeedSource::Rated),
            "liked" => SectionKey::Seed(SeedSource::Liked),
            "watchlist" => SectionKey::Seed(SeedSource::Watchlist),
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Unknown recommendation section: {}",
                    other
                )))
            }
        };
        Ok(key)
    }
}

/// Strategy that produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Similarity,
    Generative,
    Social,
    Popular,
}

/// Ephemeral, provisionally ranked recommendation inside one pass
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCandidate {
    pub item: CatalogItem,
    pub source: CandidateSource,
    /// 0-based position assigned by the producing strategy
    pub rank: usize,
}

impl RecommendationCandidate {
    /// Ranks a strategy's output in the order it was produced
    pub fn ranked(items: Vec<CatalogItem>, source: CandidateSource) -> Vec<Self> {
        items
            .into_iter()
            .enumerate()
            .map(|(rank, item)| Self { item, source, rank })
            .collect()
    }
}

/// Final response shape of one recommended film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationItem {
    pub id: ItemId,
    pub title: String,
    pub poster_path: Option<String>,
}

impl From<&CatalogItem> for RecommendationItem {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            poster_path: item.poster_path.clone(),
        }
    }
}

impl From<CatalogItem> for RecommendationItem {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            poster_path: item.poster_path,
        }
    }
}

/// Category → ordered recommendations; absent keys mean "nothing to show"
pub type Sections = BTreeMap<Category, Vec<RecommendationItem>>;
