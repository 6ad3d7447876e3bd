use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notes_indexer::IndexerError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("rebuild failed: {0}")]
    Rebuild(#[from] IndexerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::error!("{self}");
        let body = ErrorResponse {
            status: "error".to_string(),
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    status: String,
    error: String,
}
