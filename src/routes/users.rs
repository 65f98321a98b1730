use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::{AppState, CurrentUser},
    error::AppResult,
    models::UserId,
};

pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(follower_id): CurrentUser,
    Path(followee_id): Path<UserId>,
) -> AppResult<StatusCode> {
    state.social.follow(follower_id, followee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
