use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::InteractionStore;
use crate::error::AppResult;
use crate::models::{
    ActivityEntry, ActivityQuery, AuthorSummary, CatalogItem, FollowEdge, InteractionKind,
    InteractionRecord, ItemId, Rating, ReviewEntry, UserId,
};

/// In-process interaction store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    users: HashMap<UserId, AuthorSummary>,
    films: HashMap<ItemId, CatalogItem>,
    interactions: Vec<InteractionRecord>,
    follows: HashSet<FollowEdge>,
    review_likes: HashSet<(UserId, Uuid)>,
}

impl MemoryStoreInner {
    fn activity(&self, record: &InteractionRecord) -> ActivityEntry {
        let item = self
            .films
            .get(&record.item_id)
            .cloned()
            .unwrap_or_else(|| CatalogItem::placeholder(record.item_id));
        let author = self
            .users
            .get(&record.user_id)
            .cloned()
            .unwrap_or_else(|| AuthorSummary {
                id: record.user_id,
                username: "unknown".to_string(),
                display_name: None,
                avatar_url: None,
            });

        ActivityEntry {
            record: record.clone(),
            item,
            author,
        }
    }

    /// Records sorted newest first; ties keep insertion order
    fn newest_first<'a>(
        &'a self,
        filter: impl Fn(&InteractionRecord) -> bool,
    ) -> Vec<&'a InteractionRecord> {
        let mut records: Vec<&InteractionRecord> =
            self.interactions.iter().filter(|r| filter(r)).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, username: &str) -> UserId {
        let id = Uuid::new_v4();
        let mut inner = self.inner.write().await;
        inner.users.insert(
            id,
            AuthorSummary {
                id,
                username: username.to_string(),
                display_name: None,
                avatar_url: None,
            },
        );
        id
    }

    pub async fn upsert_film(&self, item: CatalogItem) {
        let mut inner = self.inner.write().await;
        inner.films.insert(item.id, item);
    }

    /// Logs an interaction and returns its id
    pub async fn log(
        &self,
        user_id: UserId,
        item_id: ItemId,
        kind: InteractionKind,
        rating: Option<f32>,
        review_text: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Uuid> {
        let rating = rating.map(Rating::new).transpose()?;
        let record = InteractionRecord {
            id: Uuid::new_v4(),
            user_id,
            item_id,
            kind,
            rating,
            review_text: review_text.map(str::to_string),
            created_at,
        };
        let id = record.id;

        let mut inner = self.inner.write().await;
        inner.interactions.push(record);
        Ok(id)
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn recent_activity(
        &self,
        user_ids: &[UserId],
        query: &ActivityQuery,
    ) -> AppResult<Vec<ActivityEntry>> {
        let inner = self.inner.read().await;
        let entries = inner
            .newest_first(|r| user_ids.contains(&r.user_id) && query.matches(r))
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|r| inner.activity(r))
            .collect();
        Ok(entries)
    }

    async fn followee_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .follows
            .iter()
            .filter(|edge| edge.follower_id() == user_id)
            .map(|edge| edge.followee_id())
            .collect())
    }

    async fn interacted_item_ids(
        &self,
        user_id: UserId,
        kinds: &[InteractionKind],
    ) -> AppResult<HashSet<ItemId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .interactions
            .iter()
            .filter(|r| r.user_id == user_id && kinds.contains(&r.kind))
            .map(|r| r.item_id)
            .collect())
    }

    async fn review_entries(&self) -> AppResult<Vec<ReviewEntry>> {
        let inner = self.inner.read().await;
        let entries = inner
            .newest_first(InteractionRecord::has_review_text)
            .into_iter()
            .map(|r| ReviewEntry {
                activity: inner.activity(r),
                like_count: inner
                    .review_likes
                    .iter()
                    .filter(|(_, review_id)| *review_id == r.id)
                    .count() as u32,
            })
            .collect();
        Ok(entries)
    }

    async fn review_author(&self, review_id: Uuid) -> AppResult<Option<UserId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .interactions
            .iter()
            .find(|r| r.id == review_id && r.has_review_text())
            .map(|r| r.user_id))
    }

    async fn insert_follow(&self, edge: FollowEdge) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.follows.insert(edge))
    }

    async fn insert_review_like(&self, user_id: UserId, review_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.review_likes.insert((user_id, review_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_recent_activity_is_newest_first_and_paginated() {
        let store = MemoryStore::new();
        let user = store.add_user("ana").await;
        let now = Utc::now();
        for i in 0..5 {
            store
                .log(
                    user,
                    ItemId(i),
                    InteractionKind::Rated,
                    Some(4.0),
                    None,
                    now - Duration::days(i),
                )
                .await
                .unwrap();
        }

        let query = ActivityQuery::new([InteractionKind::Rated], 2).offset(1);
        let page = store.recent_activity(&[user], &query).await.unwrap();
        let ids: Vec<ItemId> = page.iter().map(|e| e.record.item_id).collect();
        assert_eq!(ids, vec![ItemId(1), ItemId(2)]);
    }

    #[tokio::test]
    async fn test_unknown_film_uses_placeholder() {
        let store = MemoryStore::new();
        let user = store.add_user("ana").await;
        store
            .log(user, ItemId(7), InteractionKind::Liked, None, None, Utc::now())
            .await
            .unwrap();

        let query = ActivityQuery::new([InteractionKind::Liked], 10);
        let entries = store.recent_activity(&[user], &query).await.unwrap();
        assert!(entries[0].item.is_placeholder());
        assert_eq!(entries[0].author.username, "ana");
    }

    #[tokio::test]
    async fn test_review_entries_count_likes_and_skip_blank_text() {
        let store = MemoryStore::new();
        let author = store.add_user("critic").await;
        let fan = store.add_user("fan").await;
        let review = store
            .log(author, ItemId(1), InteractionKind::Reviewed, Some(5.0), Some("Great"), Utc::now())
            .await
            .unwrap();
        store
            .log(author, ItemId(2), InteractionKind::Reviewed, Some(3.0), Some("  "), Utc::now())
            .await
            .unwrap();
        assert!(store.insert_review_like(fan, review).await.unwrap());
        assert!(!store.insert_review_like(fan, review).await.unwrap());

        let entries = store.review_entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].like_count, 1);
        assert_eq!(store.review_author(review).await.unwrap(), Some(author));
    }

    #[tokio::test]
    async fn test_follow_edges_are_unique() {
        let store = MemoryStore::new();
        let a = store.add_user("a").await;
        let b = store.add_user("b").await;
        let edge = FollowEdge::new(a, b).unwrap();

        assert!(store.insert_follow(edge).await.unwrap());
        assert!(!store.insert_follow(edge).await.unwrap());
        assert_eq!(store.followee_ids(a).await.unwrap(), vec![b]);
        assert!(store.followee_ids(b).await.unwrap().is_empty());
    }
}
