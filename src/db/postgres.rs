use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::HashSet;
use uuid::Uuid;

use super::InteractionStore;
use crate::error::AppResult;
use crate::models::{
    ActivityEntry, ActivityQuery, AuthorSummary, CatalogItem, FollowEdge, InteractionKind,
    InteractionRecord, ItemId, Rating, ReviewEntry, UserId,
};

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the SQL migrations shipped with the binary
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Columns shared by every activity read
const ACTIVITY_COLUMNS: &str = r#"
    i.id, i.user_id, i.item_id, i.kind, i.rating, i.review_text, i.created_at,
    f.title, f.release_year, f.poster_path,
    u.username, u.display_name, u.avatar_url
"#;

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    user_id: Uuid,
    item_id: i64,
    kind: String,
    rating: Option<f32>,
    review_text: Option<String>,
    created_at: DateTime<Utc>,
    title: Option<String>,
    release_year: Option<i32>,
    poster_path: Option<String>,
    username: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
}

impl ActivityRow {
    fn into_entry(self) -> AppResult<ActivityEntry> {
        let item_id = ItemId(self.item_id);
        let record = InteractionRecord {
            id: self.id,
            user_id: self.user_id,
            item_id,
            kind: self.kind.parse()?,
            rating: self.rating.map(Rating::new).transpose()?,
            review_text: self.review_text,
            created_at: self.created_at,
        };

        Ok(ActivityEntry {
            record,
            // Films are inserted lazily; a missing row is still a valid entry
            item: CatalogItem::from_parts(item_id, self.title, self.release_year, self.poster_path),
            author: AuthorSummary {
                id: self.user_id,
                username: self.username,
                display_name: self.display_name,
                avatar_url: self.avatar_url,
            },
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    #[sqlx(flatten)]
    activity: ActivityRow,
    like_count: i64,
}

/// `InteractionStore` over the relational schema in `migrations/`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn kind_names(kinds: &[InteractionKind]) -> Vec<String> {
    kinds.iter().map(|k| k.as_str().to_string()).collect()
}

#[async_trait]
impl InteractionStore for PgStore {
    async fn recent_activity(
        &self,
        user_ids: &[UserId],
        query: &ActivityQuery,
    ) -> AppResult<Vec<ActivityEntry>> {
        if user_ids.is_empty() || query.kinds.is_empty() || query.limit == 0 {
            return Ok(vec![]);
        }

        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM interactions i
            JOIN users u ON u.id = i.user_id
            LEFT JOIN films f ON f.id = i.item_id
            WHERE i.user_id = ANY($1)
              AND i.kind = ANY($2)
              AND ($3::REAL IS NULL OR i.rating >= $3)
            ORDER BY i.created_at DESC
            LIMIT $4 OFFSET $5
            "#
        );

        let rows: Vec<ActivityRow> = sqlx::query_as(&sql)
            .bind(user_ids)
            .bind(kind_names(&query.kinds))
            .bind(query.min_rating.map(|r| r.value()))
            .bind(query.limit as i64)
            .bind(query.offset as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ActivityRow::into_entry).collect()
    }

    async fn followee_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT followee_id FROM follows WHERE follower_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    async fn interacted_item_ids(
        &self,
        user_id: UserId,
        kinds: &[InteractionKind],
    ) -> AppResult<HashSet<ItemId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT DISTINCT item_id FROM interactions WHERE user_id = $1 AND kind = ANY($2)",
        )
        .bind(user_id)
        .bind(kind_names(kinds))
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(ItemId).collect())
    }

    async fn review_entries(&self) -> AppResult<Vec<ReviewEntry>> {
        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS},
                   (SELECT COUNT(*) FROM review_likes l WHERE l.interaction_id = i.id) AS like_count
            FROM interactions i
            JOIN users u ON u.id = i.user_id
            LEFT JOIN films f ON f.id = i.item_id
            WHERE i.review_text IS NOT NULL AND btrim(i.review_text) <> ''
            ORDER BY i.created_at DESC
            "#
        );

        let rows: Vec<ReviewRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ReviewEntry {
                    like_count: row.like_count.max(0) as u32,
                    activity: row.activity.into_entry()?,
                })
            })
            .collect()
    }

    async fn review_author(&self, review_id: Uuid) -> AppResult<Option<UserId>> {
        let author: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM interactions
            WHERE id = $1 AND review_text IS NOT NULL AND btrim(review_text) <> ''
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(author)
    }

    async fn insert_follow(&self, edge: FollowEdge) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(edge.follower_id())
        .bind(edge.followee_id())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_review_like(&self, user_id: UserId, review_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO review_likes (user_id, interaction_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, interaction_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(review_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str, rating: Option<f32>, title: Option<&str>) -> ActivityRow {
        ActivityRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            item_id: 27205,
            kind: kind.to_string(),
            rating,
            review_text: None,
            created_at: Utc::now(),
            title: title.map(str::to_string),
            release_year: Some(2010),
            poster_path: None,
            username: "ana".to_string(),
            display_name: None,
            avatar_url: None,
        }
    }

    #[test]
    fn test_activity_row_conversion() {
        let entry = row("rated", Some(4.5), Some("Inception")).into_entry().unwrap();
        assert_eq!(entry.record.kind, InteractionKind::Rated);
        assert_eq!(entry.record.rating.map(|r| r.value()), Some(4.5));
        assert_eq!(entry.item.title, "Inception");
        assert_eq!(entry.author.username, "ana");
    }

    #[test]
    fn test_activity_row_without_film_row_gets_placeholder() {
        let entry = row("liked", None, None).into_entry().unwrap();
        assert!(entry.item.is_placeholder());
    }

    #[test]
    fn test_activity_row_rejects_unknown_kind() {
        assert!(row("commented", None, None).into_entry().is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(
            kind_names(&[InteractionKind::Rated, InteractionKind::Reviewed]),
            vec!["rated".to_string(), "reviewed".to_string()]
        );
    }
}
