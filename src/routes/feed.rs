use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::{AppState, CurrentUser},
    error::AppResult,
    models::ActivityEntry,
};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    page: usize,
}

/// Journal activity of followed accounts, 20 per page
pub async fn feed(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<FeedQuery>,
) -> AppResult<Json<Vec<ActivityEntry>>> {
    let entries = state.feed.feed(user_id, params.page).await?;
    Ok(Json(entries))
}
