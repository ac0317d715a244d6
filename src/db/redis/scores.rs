use async_trait::async_trait;
use redis::Client;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::{with_timeout, GraphKey};
use crate::db::traits::InteractionScoreStore;
use crate::error::AppResult;
use crate::models::MemberId;

const STORE_NAME: &str = "scores";

/// Redis-backed interaction score store
///
/// Each member owns one HASH (`scores:{id}`) mapping counterparty id to a
/// decayed engagement score. Reads are a single HMGET; the rebuild path
/// replaces the whole hash in one MULTI transaction, so a reader sees either
/// the previous or the new snapshot for a member, never a mix.
pub struct RedisInteractionScoreStore {
    client: Client,
    timeout: Duration,
}

impl RedisInteractionScoreStore {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl InteractionScoreStore for RedisInteractionScoreStore {
    async fn get_scores(
        &self,
        origin: MemberId,
        others: HashSet<MemberId>,
    ) -> AppResult<HashMap<MemberId, f64>> {
        if others.is_empty() {
            return Ok(HashMap::new());
        }

        let fields: Vec<MemberId> = others.into_iter().collect();
        let mut cmd = redis::cmd("HMGET");
        cmd.arg(GraphKey::Scores(origin).to_string());
        for field in &fields {
            cmd.arg(field.as_i64());
        }

        let client = self.client.clone();
        let values: Vec<Option<f64>> = with_timeout(STORE_NAME, self.timeout, async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            cmd.query_async(&mut conn).await
        })
        .await?;

        Ok(fields
            .into_iter()
            .zip(values)
            .filter_map(|(id, score)| score.map(|s| (id, s)))
            .collect())
    }

    async fn rebuild_for_member(
        &self,
        member_id: MemberId,
        scores: HashMap<MemberId, f64>,
    ) -> AppResult<()> {
        let key = GraphKey::Scores(member_id).to_string();
        let items: Vec<(i64, f64)> = scores
            .into_iter()
            .map(|(id, score)| (id.as_i64(), score))
            .collect();

        let mut pipe = redis::pipe();
        pipe.atomic().del(&key).ignore();
        if !items.is_empty() {
            pipe.hset_multiple(&key, &items).ignore();
        }

        let client = self.client.clone();
        with_timeout(STORE_NAME, self.timeout, async move {
            let mut conn = client.get_multiplexed_async_connection().await?;
            pipe.query_async::<()>(&mut conn).await
        })
        .await?;

        tracing::debug!(member = %member_id, "score row replaced");
        Ok(())
    }
}
