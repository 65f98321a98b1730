use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ActivityEntry, ActivityQuery, FollowEdge, InteractionKind, ItemId, ReviewEntry, UserId,
};

/// Access to interaction and follow records owned by the CRUD layer.
///
/// Reads feed the recommendation engine; the two writes exist so the
/// self-interaction rules have a single place to be enforced.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Most recent interactions of the given users matching `query`, newest first
    async fn recent_activity(
        &self,
        user_ids: &[UserId],
        query: &ActivityQuery,
    ) -> AppResult<Vec<ActivityEntry>>;

    /// Ids of the accounts `user_id` follows
    async fn followee_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>>;

    /// Every item the user has an interaction of one of `kinds` with
    async fn interacted_item_ids(
        &self,
        user_id: UserId,
        kinds: &[InteractionKind],
    ) -> AppResult<HashSet<ItemId>>;

    /// Every entry carrying non-empty review text, newest first, with like counts
    async fn review_entries(&self) -> AppResult<Vec<ReviewEntry>>;

    /// Author of a review, `None` if the review does not exist
    async fn review_author(&self, review_id: Uuid) -> AppResult<Option<UserId>>;

    /// Returns false when the edge already existed
    async fn insert_follow(&self, edge: FollowEdge) -> AppResult<bool>;

    /// Returns false when the like already existed
    async fn insert_review_like(&self, user_id: UserId, review_id: Uuid) -> AppResult<bool>;
}
