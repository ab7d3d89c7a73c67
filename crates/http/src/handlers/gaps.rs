use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;

use leadmatch_service::{ProductGapRequest, ProductGapResponse};

use crate::AppState;
use crate::api_error::ApiError;

pub async fn product_gaps(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProductGapRequest>, JsonRejection>,
) -> Result<Json<ProductGapResponse>, ApiError> {
    let Json(req) = payload?;
    let response = state.gap_service.analyze(&req)?;
    Ok(Json(response))
}
