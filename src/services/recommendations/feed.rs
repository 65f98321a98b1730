use std::sync::Arc;

use crate::{
    db::InteractionStore,
    error::AppResult,
    models::{ActivityEntry, ActivityQuery, InteractionKind, UserId},
};

pub const FEED_PAGE_SIZE: usize = 20;

/// Followed accounts' journal activity, newest first
#[derive(Clone)]
pub struct FeedAssembler {
    store: Arc<dyn InteractionStore>,
}

impl FeedAssembler {
    pub fn new(store: Arc<dyn InteractionStore>) -> Self {
        Self { store }
    }

    /// One page (0-based) of reviews and ratings by followed accounts.
    /// Following nobody gives an empty feed.
    pub async fn feed(&self, user_id: UserId, page: usize) -> AppResult<Vec<ActivityEntry>> {
        let followees = self.store.followee_ids(user_id).await?;
        if followees.is_empty() {
            return Ok(vec![]);
        }

        let query = ActivityQuery::new(
            [InteractionKind::Reviewed, InteractionKind::Rated],
            FEED_PAGE_SIZE,
        )
        .offset(page.saturating_mul(FEED_PAGE_SIZE));

        self.store.recent_activity(&followees, &query).await
    }
}
