use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{AppState, CurrentUser},
    error::AppResult,
    models::ReviewEntry,
};

/// Globally trending reviews
pub async fn trending(State(state): State<AppState>) -> AppResult<Json<Vec<ReviewEntry>>> {
    let reviews = state.trending.trending().await?;
    Ok(Json(reviews))
}

pub async fn like(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(review_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.social.like_review(user_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
