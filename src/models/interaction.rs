use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use super::{CatalogItem, ItemId, UserId};
use crate::error::{AppError, AppResult};

/// What a user did with a film
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Rated,
    Liked,
    Watchlisted,
    Reviewed,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 4] = [
        InteractionKind::Rated,
        InteractionKind::Liked,
        InteractionKind::Watchlisted,
        InteractionKind::Reviewed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Rated => "rated",
            InteractionKind::Liked => "liked",
            InteractionKind::Watchlisted => "watchlisted",
            InteractionKind::Reviewed => "reviewed",
        }
    }
}

impl Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rated" => Ok(InteractionKind::Rated),
            "liked" => Ok(InteractionKind::Liked),
            "watchlisted" => Ok(InteractionKind::Watchlisted),
            "reviewed" => Ok(InteractionKind::Reviewed),
            other => Err(AppError::InvalidInput(format!(
                "Unknown interaction kind: {}",
                other
            ))),
        }
    }
}

/// Star rating in half steps, 0.5 through 5.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Rating(f32);

impl Rating {
    /// Threshold for "highly rated" seeds and social picks
    pub const HIGH: Rating = Rating(4.0);

    pub fn new(value: f32) -> AppResult<Self> {
        let doubled = value * 2.0;
        if !(0.5..=5.0).contains(&value) || doubled.fract() != 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Rating must be a half step between 0.5 and 5.0, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for Rating {
    type Error = AppError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for f32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// One logged action of a user against a film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub kind: InteractionKind,
    pub rating: Option<Rating>,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn has_review_text(&self) -> bool {
        self.review_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }
}

/// Minimal author projection joined onto feed and review rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// An interaction joined with its film and author projections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub record: InteractionRecord,
    pub item: CatalogItem,
    pub author: AuthorSummary,
}

/// A review-bearing entry together with its like count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewEntry {
    #[serde(flatten)]
    pub activity: ActivityEntry,
    pub like_count: u32,
}

/// Filter for "most recent N interactions of kind K" reads, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityQuery {
    pub kinds: Vec<InteractionKind>,
    pub min_rating: Option<Rating>,
    pub limit: usize,
    pub offset: usize,
}

impl ActivityQuery {
    pub fn new(kinds: impl Into<Vec<InteractionKind>>, limit: usize) -> Self {
        Self {
            kinds: kinds.into(),
            min_rating: None,
            limit,
            offset: 0,
        }
    }

    pub fn min_rating(mut self, rating: Rating) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether a record passes the kind and rating filters
    pub fn matches(&self, record: &InteractionRecord) -> bool {
        if !self.kinds.contains(&record.kind) {
            return false;
        }
        match self.min_rating {
            Some(min) => record.rating.is_some_and(|r| r >= min),
            None => true,
        }
    }
}

/// Directed follow relationship. Self-edges cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FollowEdge {
    follower_id: UserId,
    followee_id: UserId,
}

impl FollowEdge {
    pub fn new(follower_id: UserId, followee_id: UserId) -> AppResult<Self> {
        if follower_id == followee_id {
            return Err(AppError::SelfInteraction(
                "You cannot follow yourself.".to_string(),
            ));
        }
        Ok(Self {
            follower_id,
            followee_id,
        })
    }

    pub fn follower_id(&self) -> UserId {
        self.follower_id
    }

    pub fn followee_id(&self) -> UserId {
        self.followee_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: InteractionKind, rating: Option<f32>) -> InteractionRecord {
        InteractionRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            item_id: ItemId(1),
            kind,
            rating: rating.map(|r| Rating::new(r).unwrap()),
            review_text: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rating_accepts_half_steps() {
        assert!(Rating::new(0.5).is_ok());
        assert!(Rating::new(4.5).is_ok());
        assert!(Rating::new(5.0).is_ok());
    }

    #[test]
    fn test_rating_rejects_out_of_range_and_fractions() {
        assert!(Rating::new(0.0).is_err());
        assert!(Rating::new(5.5).is_err());
        assert!(Rating::new(3.3).is_err());
    }

    #[test]
    fn test_rating_deserialization_validates() {
        assert!(serde_json::from_str::<Rating>("4.5").is_ok());
        assert!(serde_json::from_str::<Rating>("7").is_err());
    }

    #[test]
    fn test_interaction_kind_round_trips_through_str() {
        for kind in InteractionKind::ALL {
            assert_eq!(kind.as_str().parse::<InteractionKind>().unwrap(), kind);
        }
        assert!("commented".parse::<InteractionKind>().is_err());
    }

    #[test]
    fn test_query_matches_kind_and_min_rating() {
        let query = ActivityQuery::new([InteractionKind::Rated], 5).min_rating(Rating::HIGH);
        assert!(query.matches(&record(InteractionKind::Rated, Some(4.0))));
        assert!(!query.matches(&record(InteractionKind::Rated, Some(3.5))));
        assert!(!query.matches(&record(InteractionKind::Rated, None)));
        assert!(!query.matches(&record(InteractionKind::Liked, Some(5.0))));
    }

    #[test]
    fn test_follow_edge_rejects_self() {
        let user = Uuid::new_v4();
        let err = FollowEdge::new(user, user).unwrap_err();
        assert!(matches!(err, AppError::SelfInteraction(_)));
        assert!(FollowEdge::new(user, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_has_review_text_ignores_whitespace() {
        let mut r = record(InteractionKind::Reviewed, Some(4.0));
        r.review_text = Some("   ".into());
        assert!(!r.has_review_text());
        r.review_text = Some("Loved it".into());
        assert!(r.has_review_text());
    }
}
