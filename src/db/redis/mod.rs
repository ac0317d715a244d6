pub mod adjacency;
pub mod scores;

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use redis::Client;

use crate::error::{AppError, AppResult};
use crate::models::MemberId;

pub use adjacency::RedisAdjacencyStore;
pub use scores::RedisInteractionScoreStore;

/// Key scheme of the two Redis-backed stores
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphKey {
    /// Direct-friend set of a member (Redis SET of member ids)
    Friends(MemberId),
    /// Interaction score row of a member (Redis HASH of member id -> score)
    Scores(MemberId),
}

impl Display for GraphKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphKey::Friends(id) => write!(f, "friends:{}", id),
            GraphKey::Scores(id) => write!(f, "scores:{}", id),
        }
    }
}

/// Creates a Redis client for the adjacency and score stores
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Runs one store round trip under the configured deadline.
///
/// A timeout surfaces as `StoreTimeout`, which callers treat as a retryable
/// failure of the whole request rather than degrading to partial data.
pub(crate) async fn with_timeout<T, F>(
    store: &'static str,
    timeout: Duration,
    fut: F,
) -> AppResult<T>
where
    F: Future<Output = Result<T, redis::RedisError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            tracing::warn!(store, timeout_ms = timeout.as_millis() as u64, "store round trip timed out");
            Err(AppError::StoreTimeout {
                store,
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}
