use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;

use leadmatch_service::{CompetitorSearchRequest, CompetitorSearchResponse};

use crate::AppState;
use crate::api_error::ApiError;

pub async fn search_competitors(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompetitorSearchRequest>, JsonRejection>,
) -> Result<Json<CompetitorSearchResponse>, ApiError> {
    let Json(req) = payload?;
    let response = state.competitor_service.search(&req).await?;
    Ok(Json(response))
}
