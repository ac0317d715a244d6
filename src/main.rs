use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use kindred_api::config::Config;
use kindred_api::db::{
    create_pool, create_redis_client, AdjacencyStore, BlacklistService, Directory,
    InteractionScoreStore, NameResolver, RedisAdjacencyStore, RedisInteractionScoreStore,
};
use kindred_api::routes::{create_router, AppState};
use kindred_api::services::{
    FriendshipEventRelay, FriendshipRebuildJob, InteractionRebuildJob, RecommendationService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kindred_api=info,tower_http=info")),
        )
        .init();

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let store_timeout = Duration::from_millis(config.store_timeout_ms);

    let adjacency: Arc<dyn AdjacencyStore> = Arc::new(RedisAdjacencyStore::new(
        redis_client.clone(),
        store_timeout,
    ));
    let scores: Arc<dyn InteractionScoreStore> = Arc::new(RedisInteractionScoreStore::new(
        redis_client,
        store_timeout,
    ));
    let directory = Arc::new(Directory::new(pool));
    let blacklist: Arc<dyn BlacklistService> = directory.clone();
    let names: Arc<dyn NameResolver> = directory.clone();

    let state = AppState {
        recommendations: Arc::new(RecommendationService::new(
            adjacency.clone(),
            scores.clone(),
            blacklist,
            names,
        )),
        friendship_rebuild: Arc::new(FriendshipRebuildJob::new(
            directory.clone(),
            adjacency.clone(),
        )),
        interaction_rebuild: Arc::new(InteractionRebuildJob::new(
            directory.clone(),
            scores,
            config.score_half_life_days,
            chrono::Duration::days(config.interaction_window_days),
        )),
        limits: config.limits(),
    };

    // Keep the adjacency store incrementally fresh between full rebuilds
    let relay = FriendshipEventRelay::new(directory, adjacency);
    let poll_interval = Duration::from_secs(config.event_poll_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = relay.run_once().await {
                tracing::warn!(error = %e, "friendship event relay poll failed");
            }
        }
    });

    let app = create_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "kindred-api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
