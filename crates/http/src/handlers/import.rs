use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;

use leadmatch_service::{ImportRequest, ImportResponse};

use crate::AppState;
use crate::api_error::ApiError;

pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    let Json(req) = payload?;
    let response = state.import_service.import(&req).await?;
    Ok(Json(response))
}
