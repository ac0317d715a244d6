use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::collections::{HashMap, HashSet};

use crate::db::traits::{BlacklistService, FriendshipRepository, NameResolver};
use crate::error::AppResult;
use crate::models::{FriendshipChange, FriendshipEvent, InteractionEvent, InteractionKind, MemberId};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Read-only views over the relational system-of-record: confirmed
/// friendships, the friendship event log, blacklists, member names, and
/// engagement events.
///
/// One struct backs three narrow traits so the rest of the crate never sees
/// the schema.
pub struct Directory {
    pool: PgPool,
}

impl Directory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendshipRepository for Directory {
    async fn list_member_ids(&self) -> AppResult<Vec<MemberId>> {
        let rows = sqlx::query("SELECT member_id FROM members ORDER BY member_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MemberId(row.get::<i64, _>("member_id")))
            .collect())
    }

    async fn list_friend_ids(&self, member_id: MemberId) -> AppResult<HashSet<MemberId>> {
        let rows = sqlx::query("SELECT friend_id FROM friendships WHERE member_id = $1")
            .bind(member_id.as_i64())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MemberId(row.get::<i64, _>("friend_id")))
            .collect())
    }

    async fn friendship_events_since(&self, cursor: i64) -> AppResult<Vec<FriendshipEvent>> {
        let rows = sqlx::query(
            "SELECT seq, member_id, friend_id, change \
             FROM friendship_events WHERE seq > $1 ORDER BY seq",
        )
        .bind(cursor)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let seq: i64 = row.get("seq");
            let change = match row.get::<&str, _>("change") {
                "created" => FriendshipChange::Created,
                "deleted" => FriendshipChange::Deleted,
                other => {
                    tracing::warn!(seq, change = other, "unknown friendship change kind, skipping");
                    continue;
                }
            };
            events.push(FriendshipEvent {
                seq,
                member_id: MemberId(row.get::<i64, _>("member_id")),
                friend_id: MemberId(row.get::<i64, _>("friend_id")),
                change,
            });
        }

        Ok(events)
    }

    async fn members_with_interactions(&self, window: Duration) -> AppResult<Vec<MemberId>> {
        let since = window_start(window);
        let rows = sqlx::query(
            "SELECT DISTINCT member_id FROM interaction_events \
             WHERE occurred_at >= $1 ORDER BY member_id",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MemberId(row.get::<i64, _>("member_id")))
            .collect())
    }

    async fn interaction_events(
        &self,
        member_id: MemberId,
        window: Duration,
    ) -> AppResult<Vec<InteractionEvent>> {
        let since = window_start(window);
        let rows = sqlx::query(
            "SELECT counterparty_id, kind, occurred_at FROM interaction_events \
             WHERE member_id = $1 AND occurred_at >= $2",
        )
        .bind(member_id.as_i64())
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let kind = match row.get::<&str, _>("kind") {
                "comment" => InteractionKind::Comment,
                "like" => InteractionKind::Like,
                other => {
                    tracing::warn!(member = %member_id, kind = other, "unknown interaction kind, skipping");
                    continue;
                }
            };
            events.push(InteractionEvent {
                counterparty_id: MemberId(row.get::<i64, _>("counterparty_id")),
                kind,
                occurred_at: row.get::<DateTime<Utc>, _>("occurred_at"),
            });
        }

        Ok(events)
    }
}

#[async_trait]
impl BlacklistService for Directory {
    async fn blocked_with(
        &self,
        origin: MemberId,
        others: HashSet<MemberId>,
    ) -> AppResult<HashSet<MemberId>> {
        if others.is_empty() {
            return Ok(HashSet::new());
        }

        let candidates: Vec<i64> = others.into_iter().map(MemberId::as_i64).collect();
        let rows = sqlx::query(
            "SELECT member_id, blocked_member_id FROM blacklists \
             WHERE (member_id = $1 AND blocked_member_id = ANY($2)) \
                OR (blocked_member_id = $1 AND member_id = ANY($2))",
        )
        .bind(origin.as_i64())
        .bind(&candidates)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let a: i64 = row.get("member_id");
                let b: i64 = row.get("blocked_member_id");
                // Whichever side is not the origin is the blocked candidate
                if a == origin.as_i64() {
                    MemberId(b)
                } else {
                    MemberId(a)
                }
            })
            .collect())
    }

    async fn is_blocked(&self, a: MemberId, b: MemberId) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS( \
                SELECT 1 FROM blacklists \
                WHERE (member_id = $1 AND blocked_member_id = $2) \
                   OR (member_id = $2 AND blocked_member_id = $1)) AS blocked",
        )
        .bind(a.as_i64())
        .bind(b.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<bool, _>("blocked"))
    }
}

#[async_trait]
impl NameResolver for Directory {
    async fn resolve_names(
        &self,
        member_ids: HashSet<MemberId>,
    ) -> AppResult<HashMap<MemberId, String>> {
        if member_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i64> = member_ids.into_iter().map(MemberId::as_i64).collect();
        let rows = sqlx::query("SELECT member_id, name FROM members WHERE member_id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    MemberId(row.get::<i64, _>("member_id")),
                    row.get::<String, _>("name"),
                )
            })
            .collect())
    }
}

fn window_start(window: Duration) -> DateTime<Utc> {
    Utc::now() - window
}
