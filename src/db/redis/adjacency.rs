use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::{with_timeout, GraphKey};
use crate::db::traits::AdjacencyStore;
use crate::error::AppResult;
use crate::models::MemberId;

const STORE_NAME: &str = "adjacency";

/// Redis-backed adjacency store
///
/// Friend sets live in one Redis SET per member (`friends:{id}`). Batch reads
/// pipeline one SMEMBERS per key into a single round trip; edge writes and
/// full replaces run as MULTI transactions so readers never observe a
/// half-written set.
pub struct RedisAdjacencyStore {
    client: Client,
    timeout: Duration,
}

impl RedisAdjacencyStore {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl AdjacencyStore for RedisAdjacencyStore {
    async fn get_friends_batch(
        &self,
        member_ids: HashSet<MemberId>,
    ) -> AppResult<HashMap<MemberId, HashSet<MemberId>>> {
        if member_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<MemberId> = member_ids.into_iter().collect();
        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.smembers(GraphKey::Friends(*id).to_string());
        }

        let client = self.client.clone();
        let rows: Vec<Vec<i64>> = with_timeout(STORE_NAME, self.timeout, async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            pipe.query_async(&mut conn).await
        })
        .await?;

        tracing::debug!(batch = ids.len(), "adjacency batch fetched");

        Ok(ids
            .into_iter()
            .zip(rows)
            .map(|(id, friends)| (id, friends.into_iter().map(MemberId).collect()))
            .collect())
    }

    async fn get_friends(&self, member_id: MemberId) -> AppResult<HashSet<MemberId>> {
        let client = self.client.clone();
        let key = GraphKey::Friends(member_id).to_string();
        let friends: Vec<i64> = with_timeout(STORE_NAME, self.timeout, async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            conn.smembers(key).await
        })
        .await?;

        Ok(friends.into_iter().map(MemberId).collect())
    }

    async fn add_edge(&self, a: MemberId, b: MemberId) -> AppResult<()> {
        if a == b {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic()
            .sadd(GraphKey::Friends(a).to_string(), b.as_i64())
            .ignore()
            .sadd(GraphKey::Friends(b).to_string(), a.as_i64())
            .ignore();

        let client = self.client.clone();
        with_timeout(STORE_NAME, self.timeout, async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            pipe.query_async::<()>(&mut conn).await
        })
        .await
    }

    async fn remove_edge(&self, a: MemberId, b: MemberId) -> AppResult<()> {
        let mut pipe = redis::pipe();
        pipe.atomic()
            .srem(GraphKey::Friends(a).to_string(), b.as_i64())
            .ignore()
            .srem(GraphKey::Friends(b).to_string(), a.as_i64())
            .ignore();

        let client = self.client.clone();
        with_timeout(STORE_NAME, self.timeout, async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            pipe.query_async::<()>(&mut conn).await
        })
        .await
    }

    async fn replace_friends(
        &self,
        member_id: MemberId,
        friends: HashSet<MemberId>,
    ) -> AppResult<()> {
        let key = GraphKey::Friends(member_id).to_string();
        let members: Vec<i64> = friends.into_iter().map(MemberId::as_i64).collect();

        let mut pipe = redis::pipe();
        pipe.atomic().del(&key).ignore();
        if !members.is_empty() {
            pipe.sadd(&key, members).ignore();
        }

        let client = self.client.clone();
        with_timeout(STORE_NAME, self.timeout, async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            pipe.query_async::<()>(&mut conn).await
        })
        .await?;

        tracing::debug!(member = %member_id, "friend set replaced");
        Ok(())
    }
}
