use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    api::AppState,
    middleware::{make_request_span, request_id_middleware},
};

pub mod feed;
pub mod recommendations;
pub mod reviews;
pub mod search;
pub mod users;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations/sections", get(recommendations::sections))
        .route("/recommendations/section", get(recommendations::section))
        .route("/recommendations/history", get(recommendations::history))
        .route("/reviews/trending", get(reviews::trending))
        .route("/reviews/:id/like", post(reviews::like))
        .route("/feed", get(feed::feed))
        .route("/search/plot", post(search::plot))
        .route("/users/:id/follow", post(users::follow))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
