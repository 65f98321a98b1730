// ============================================================================
// TMDB API Types
// ============================================================================

use serde::Deserialize;

use super::{CatalogItem, ItemId};

/// Paginated list envelope used by search, similar and popular endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Movie summary as returned in list endpoints and `movie/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbMovie {
    /// "2010-07-15" → 2010; TMDB sends "" for unknown dates
    fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

impl From<TmdbMovie> for CatalogItem {
    fn from(movie: TmdbMovie) -> Self {
        let release_year = movie.release_year();
        CatalogItem::from_parts(
            ItemId(movie.id),
            movie.title,
            release_year,
            movie.poster_path,
        )
    }
}
