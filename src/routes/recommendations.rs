use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{MemberId, RecommendedFriend};

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub limit: Option<usize>,
}

/// Handler for the "people you may know" endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
    Query(params): Query<RecommendParams>,
) -> AppResult<Json<Vec<RecommendedFriend>>> {
    let limit = params.limit.unwrap_or(state.limits.default_limit);
    if limit == 0 || limit > state.limits.max_limit {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            state.limits.max_limit
        )));
    }

    let recommendations = state
        .recommendations
        .recommend(MemberId(member_id), limit)
        .await?;
    Ok(Json(recommendations))
}
