use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;

/// Newest commits returned by `/api/commits`.
pub const COMMIT_FEED_LIMIT: usize = 10;

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/commits", get(list_commits))
        .route("/api/rebuild", get(rebuild))
        .fallback(not_found)
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

async fn list_commits(State(state): State<AppState>) -> impl IntoResponse {
    let commits = state.vcs().recent_commits(COMMIT_FEED_LIMIT).await;
    ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(commits))
}

async fn rebuild(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.aggregator.rebuild().await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
