use axum::{extract::State, Json};

use super::AppState;
use crate::error::AppResult;
use crate::services::RebuildSummary;

/// Triggers a full adjacency store resync from the system-of-record.
/// Hit by the external scheduler; cadence is a deployment concern.
pub async fn rebuild_friendships(State(state): State<AppState>) -> AppResult<Json<RebuildSummary>> {
    let summary = state.friendship_rebuild.run().await?;
    Ok(Json(summary))
}

/// Triggers a full interaction score resync from the system-of-record
pub async fn rebuild_interactions(
    State(state): State<AppState>,
) -> AppResult<Json<RebuildSummary>> {
    let summary = state.interaction_rebuild.run().await?;
    Ok(Json(summary))
}
