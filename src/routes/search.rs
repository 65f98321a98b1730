use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{api::AppState, error::AppResult, models::CatalogItem};

#[derive(Debug, Deserialize)]
pub struct PlotSearchRequest {
    #[serde(default)]
    pub plot: String,
}

#[derive(Debug, Serialize)]
pub struct PlotSearchResponse {
    pub films: Vec<CatalogItem>,
}

/// Films matching a described plot
pub async fn plot(
    State(state): State<AppState>,
    Json(request): Json<PlotSearchRequest>,
) -> AppResult<Json<PlotSearchResponse>> {
    let films = state.plot_search.search(&request.plot).await?;
    Ok(Json(PlotSearchResponse { films }))
}
