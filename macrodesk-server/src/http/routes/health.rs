//! Health check endpoint

use axum::{routing::get, Json, Router};

use super::OkResponse;

/// GET /health
async fn health() -> Json<OkResponse> {
    Json(OkResponse::ok())
}

/// Health routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
