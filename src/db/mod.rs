pub mod postgres;
pub mod redis;
pub mod traits;

pub use postgres::{create_pool, Directory};
pub use redis::{create_redis_client, RedisAdjacencyStore, RedisInteractionScoreStore};
pub use traits::{
    AdjacencyStore, BlacklistService, FriendshipRepository, InteractionScoreStore, NameResolver,
};
