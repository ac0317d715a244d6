use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::RecommendLimits;
use crate::services::{FriendshipRebuildJob, InteractionRebuildJob, RecommendationService};

pub mod jobs;
pub mod recommendations;

/// Shared application state injected into handlers
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
    pub friendship_rebuild: Arc<FriendshipRebuildJob>,
    pub interaction_rebuild: Arc<InteractionRebuildJob>,
    pub limits: RecommendLimits,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/members/:member_id/recommendations",
            get(recommendations::recommend),
        )
        .route("/jobs/friendship-rebuild", post(jobs::rebuild_friendships))
        .route("/jobs/interaction-rebuild", post(jobs::rebuild_interactions))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
