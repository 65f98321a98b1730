use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::InteractionStore,
    error::{AppError, AppResult},
    models::{FollowEdge, UserId},
};

/// Social writes that must uphold the no-self-interaction rule
#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn InteractionStore>,
}

impl SocialService {
    pub fn new(store: Arc<dyn InteractionStore>) -> Self {
        Self { store }
    }

    pub async fn follow(&self, follower_id: UserId, followee_id: UserId) -> AppResult<()> {
        let edge = FollowEdge::new(follower_id, followee_id)?;

        if !self.store.insert_follow(edge).await? {
            return Err(AppError::Conflict(
                "You already follow this user.".to_string(),
            ));
        }

        tracing::info!(
            follower_id = %follower_id,
            followee_id = %followee_id,
            "User followed"
        );
        Ok(())
    }

    pub async fn like_review(&self, user_id: UserId, review_id: Uuid) -> AppResult<()> {
        let author = self
            .store
            .review_author(review_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", review_id)))?;

        if author == user_id {
            return Err(AppError::SelfInteraction(
                "You cannot like your own review.".to_string(),
            ));
        }

        if !self.store.insert_review_like(user_id, review_id).await? {
            return Err(AppError::Conflict(
                "You already liked this review.".to_string(),
            ));
        }

        tracing::info!(user_id = %user_id, review_id = %review_id, "Review liked");
        Ok(())
    }
}
