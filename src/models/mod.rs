use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

pub mod interaction;
pub mod recommendation;
pub mod tmdb;

pub use interaction::{
    ActivityEntry, ActivityQuery, AuthorSummary, FollowEdge, InteractionKind, InteractionRecord,
    Rating, ReviewEntry,
};
pub use recommendation::{
    CandidateSource, Category, RecommendationCandidate, RecommendationItem, SectionKey, Sections,
    SeedSource,
};

/// Users are owned by the external auth layer; we only ever see their id
pub type UserId = Uuid;

/// Canonical catalog identifier (a TMDB movie id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local, possibly stale copy of catalog metadata for one film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub release_year: Option<i32>,
    pub poster_path: Option<String>,
}

impl CatalogItem {
    pub const UNKNOWN_TITLE: &'static str = "Unknown Title";

    /// Stand-in for a film whose metadata never made it into the local copy
    pub fn placeholder(id: ItemId) -> Self {
        Self {
            id,
            title: Self::UNKNOWN_TITLE.to_string(),
            release_year: None,
            poster_path: None,
        }
    }

    /// Builds an item from possibly-missing columns, falling back to the placeholder title
    pub fn from_parts(
        id: ItemId,
        title: Option<String>,
        release_year: Option<i32>,
        poster_path: Option<String>,
    ) -> Self {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| Self::UNKNOWN_TITLE.to_string());
        Self {
            id,
            title,
            release_year,
            poster_path,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.title == Self::UNKNOWN_TITLE
    }
}
