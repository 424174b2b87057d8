//! Macro endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::OkResponse;
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::http::server::AppState;
use crate::models::{Macro, MacroPayload};

/// GET /macros - every macro, oldest first
async fn list_macros(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Macro>>, ApiError> {
    let rows = state.store.list().await?;
    Ok(Json(rows))
}

/// POST /macros - create a macro
async fn create_macro(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<MacroPayload>,
) -> Result<(StatusCode, Json<Macro>), ApiError> {
    let input = payload.validate()?;
    let row = state.store.create(input).await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /macros/{id} - overwrite every mutable field
async fn update_macro(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<MacroPayload>,
) -> Result<Json<Macro>, ApiError> {
    let input = payload.validate()?;
    let row = state.store.update(&id, input).await?;

    Ok(Json(row))
}

/// DELETE /macros/{id}
async fn delete_macro(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    state.store.delete(&id).await?;
    Ok(Json(OkResponse::ok()))
}

/// Macro routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/macros", get(list_macros).post(create_macro))
        .route("/macros/{id}", put(update_macro).delete(delete_macro))
}
