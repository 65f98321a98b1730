use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::{AppState, CurrentUser},
    error::AppResult,
    models::{RecommendationItem, SectionKey, Sections},
    services::recommendations::HistoryEntry,
};

#[derive(Debug, Deserialize)]
pub struct SectionQuery {
    key: String,
}

/// All recommendation sections; logged-out visitors get the static table
pub async fn sections(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Json<Sections> {
    let sections = state.engine.sections(user.map(|u| u.0)).await;
    Json(sections)
}

/// One section by key, e.g. `?key=liked` or `?key=hidden-gems`
pub async fn section(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(params): Query<SectionQuery>,
) -> AppResult<Json<Vec<RecommendationItem>>> {
    let key: SectionKey = params.key.parse()?;
    let items = state.engine.section(user.map(|u| u.0), key).await?;
    Ok(Json(items))
}

/// The caller's recently rated films with their ratings
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let history = state.engine.viewing_history(user_id).await?;
    Ok(Json(history))
}
