use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::db::traits::{AdjacencyStore, FriendshipRepository, InteractionScoreStore};
use crate::error::AppResult;
use crate::models::{FriendshipChange, InteractionEvent, MemberId};

/// Outcome of one rebuild run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub rebuilt: usize,
    pub failed: usize,
}

/// Resynchronizes the adjacency store from the friendship system-of-record.
///
/// Each member's friend set is replaced atomically, so the job is safe to run
/// while recommendation requests are being served. One member's failure is
/// logged and skipped; the next scheduled run retries it.
pub struct FriendshipRebuildJob {
    repo: Arc<dyn FriendshipRepository>,
    adjacency: Arc<dyn AdjacencyStore>,
}

impl FriendshipRebuildJob {
    pub fn new(repo: Arc<dyn FriendshipRepository>, adjacency: Arc<dyn AdjacencyStore>) -> Self {
        Self { repo, adjacency }
    }

    pub async fn run(&self) -> AppResult<RebuildSummary> {
        let members = self.repo.list_member_ids().await?;
        let mut summary = RebuildSummary {
            rebuilt: 0,
            failed: 0,
        };

        for member in members {
            match self.rebuild_member(member).await {
                Ok(()) => summary.rebuilt += 1,
                Err(e) => {
                    tracing::warn!(member = %member, error = %e, "friendship rebuild failed for member");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            rebuilt = summary.rebuilt,
            failed = summary.failed,
            "friendship rebuild run complete"
        );
        Ok(summary)
    }

    async fn rebuild_member(&self, member: MemberId) -> AppResult<()> {
        let friends = self.repo.list_friend_ids(member).await?;
        self.adjacency.replace_friends(member, friends).await
    }
}

/// Recomputes decayed engagement scores from the system-of-record and
/// replaces each member's score row in full.
///
/// The full replace doubles as the decay mechanism: pairs with no events
/// inside the trailing window simply drop out of the next snapshot.
pub struct InteractionRebuildJob {
    repo: Arc<dyn FriendshipRepository>,
    scores: Arc<dyn InteractionScoreStore>,
    half_life_days: f64,
    window: Duration,
}

impl InteractionRebuildJob {
    pub fn new(
        repo: Arc<dyn FriendshipRepository>,
        scores: Arc<dyn InteractionScoreStore>,
        half_life_days: f64,
        window: Duration,
    ) -> Self {
        Self {
            repo,
            scores,
            half_life_days,
            window,
        }
    }

    pub async fn run(&self) -> AppResult<RebuildSummary> {
        let members = self.repo.members_with_interactions(self.window).await?;
        let now = Utc::now();
        let mut summary = RebuildSummary {
            rebuilt: 0,
            failed: 0,
        };

        for member in members {
            match self.rebuild_member(member, now).await {
                Ok(()) => summary.rebuilt += 1,
                Err(e) => {
                    tracing::warn!(member = %member, error = %e, "interaction rebuild failed for member");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            rebuilt = summary.rebuilt,
            failed = summary.failed,
            "interaction rebuild run complete"
        );
        Ok(summary)
    }

    async fn rebuild_member(&self, member: MemberId, now: DateTime<Utc>) -> AppResult<()> {
        let events = self.repo.interaction_events(member, self.window).await?;
        let scores = decayed_scores(&events, now, self.half_life_days);
        self.scores.rebuild_for_member(member, scores).await
    }
}

/// Sums event weights with exponential time decay: an event contributes
/// `weight * 0.5^(age_days / half_life_days)`, so more recent interaction
/// always ranks higher
pub fn decayed_scores(
    events: &[InteractionEvent],
    now: DateTime<Utc>,
    half_life_days: f64,
) -> HashMap<MemberId, f64> {
    let mut scores: HashMap<MemberId, f64> = HashMap::new();
    for event in events {
        let age_days = (now - event.occurred_at).num_seconds().max(0) as f64 / 86_400.0;
        let decay = 0.5_f64.powf(age_days / half_life_days);
        *scores.entry(event.counterparty_id).or_insert(0.0) += event.kind.weight() * decay;
    }
    scores
}

/// Applies friendship created/deleted events to the adjacency store between
/// full rebuilds, advancing a poll cursor past each applied event.
///
/// Edge writes are idempotent, so replaying an event after a crash before
/// the cursor advanced is harmless.
pub struct FriendshipEventRelay {
    repo: Arc<dyn FriendshipRepository>,
    adjacency: Arc<dyn AdjacencyStore>,
    cursor: AtomicI64,
}

impl FriendshipEventRelay {
    pub fn new(repo: Arc<dyn FriendshipRepository>, adjacency: Arc<dyn AdjacencyStore>) -> Self {
        Self {
            repo,
            adjacency,
            cursor: AtomicI64::new(0),
        }
    }

    /// Drains and applies all events past the cursor; returns how many were
    /// applied
    pub async fn run_once(&self) -> AppResult<usize> {
        let cursor = self.cursor.load(Ordering::Acquire);
        let events = self.repo.friendship_events_since(cursor).await?;
        let count = events.len();

        for event in events {
            match event.change {
                FriendshipChange::Created => {
                    self.adjacency
                        .add_edge(event.member_id, event.friend_id)
                        .await?
                }
                FriendshipChange::Deleted => {
                    self.adjacency
                        .remove_edge(event.member_id, event.friend_id)
                        .await?
                }
            }
            self.cursor.store(event.seq, Ordering::Release);
        }

        if count > 0 {
            tracing::debug!(applied = count, "friendship events relayed");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::{
        MockAdjacencyStore, MockFriendshipRepository, MockInteractionScoreStore,
    };
    use crate::error::AppError;
    use crate::models::{FriendshipEvent, InteractionKind};
    use std::collections::HashSet;

    fn event(counterparty: i64, kind: InteractionKind, age_days: i64) -> InteractionEvent {
        InteractionEvent {
            counterparty_id: MemberId(counterparty),
            kind,
            occurred_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_decay_halves_weight_per_half_life() {
        let now = Utc::now();
        let events = vec![InteractionEvent {
            counterparty_id: MemberId(2),
            kind: InteractionKind::Like,
            occurred_at: now - Duration::days(7),
        }];

        let scores = decayed_scores(&events, now, 7.0);
        let score = scores[&MemberId(2)];
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_recent_interaction_scores_higher_than_old() {
        let now = Utc::now();
        let events = vec![
            InteractionEvent {
                counterparty_id: MemberId(2),
                kind: InteractionKind::Comment,
                occurred_at: now - Duration::days(1),
            },
            InteractionEvent {
                counterparty_id: MemberId(3),
                kind: InteractionKind::Comment,
                occurred_at: now - Duration::days(30),
            },
        ];

        let scores = decayed_scores(&events, now, 7.0);
        assert!(scores[&MemberId(2)] > scores[&MemberId(3)]);
    }

    #[test]
    fn test_events_accumulate_per_counterparty() {
        let now = Utc::now();
        let events = vec![
            InteractionEvent {
                counterparty_id: MemberId(2),
                kind: InteractionKind::Like,
                occurred_at: now,
            },
            InteractionEvent {
                counterparty_id: MemberId(2),
                kind: InteractionKind::Comment,
                occurred_at: now,
            },
        ];

        let scores = decayed_scores(&events, now, 7.0);
        assert!((scores[&MemberId(2)] - 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_friendship_rebuild_isolates_per_member_failures() {
        let mut repo = MockFriendshipRepository::new();
        repo.expect_list_member_ids()
            .returning(|| Ok(vec![MemberId(1), MemberId(2), MemberId(3)]));
        repo.expect_list_friend_ids()
            .returning(|_| Ok(HashSet::from([MemberId(9)])));

        let mut adjacency = MockAdjacencyStore::new();
        adjacency.expect_replace_friends().returning(|member, _| {
            if member == MemberId(2) {
                Err(AppError::StoreTimeout {
                    store: "adjacency",
                    timeout_ms: 500,
                })
            } else {
                Ok(())
            }
        });

        let job = FriendshipRebuildJob::new(Arc::new(repo), Arc::new(adjacency));
        let summary = job.run().await.unwrap();
        assert_eq!(summary, RebuildSummary { rebuilt: 2, failed: 1 });
    }

    #[tokio::test]
    async fn test_interaction_rebuild_replaces_rows_with_decayed_scores() {
        let mut repo = MockFriendshipRepository::new();
        repo.expect_members_with_interactions()
            .returning(|_| Ok(vec![MemberId(1)]));
        repo.expect_interaction_events()
            .returning(|_, _| Ok(vec![event(5, InteractionKind::Comment, 0)]));

        let mut scores = MockInteractionScoreStore::new();
        scores
            .expect_rebuild_for_member()
            .withf(|member, scores| {
                *member == MemberId(1)
                    && scores.len() == 1
                    && (scores[&MemberId(5)] - 2.0).abs() < 1e-6
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let job = InteractionRebuildJob::new(
            Arc::new(repo),
            Arc::new(scores),
            7.0,
            Duration::days(90),
        );
        let summary = job.run().await.unwrap();
        assert_eq!(summary, RebuildSummary { rebuilt: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_relay_applies_events_and_advances_cursor() {
        let mut repo = MockFriendshipRepository::new();
        repo.expect_friendship_events_since()
            .withf(|cursor| *cursor == 0)
            .times(1)
            .returning(|_| {
                Ok(vec![
                    FriendshipEvent {
                        seq: 1,
                        member_id: MemberId(1),
                        friend_id: MemberId(2),
                        change: FriendshipChange::Created,
                    },
                    FriendshipEvent {
                        seq: 2,
                        member_id: MemberId(1),
                        friend_id: MemberId(3),
                        change: FriendshipChange::Deleted,
                    },
                ])
            });
        repo.expect_friendship_events_since()
            .withf(|cursor| *cursor == 2)
            .times(1)
            .returning(|_| Ok(vec![]));

        let mut adjacency = MockAdjacencyStore::new();
        adjacency
            .expect_add_edge()
            .with(
                mockall::predicate::eq(MemberId(1)),
                mockall::predicate::eq(MemberId(2)),
            )
            .times(1)
            .returning(|_, _| Ok(()));
        adjacency
            .expect_remove_edge()
            .with(
                mockall::predicate::eq(MemberId(1)),
                mockall::predicate::eq(MemberId(3)),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let relay = FriendshipEventRelay::new(Arc::new(repo), Arc::new(adjacency));
        assert_eq!(relay.run_once().await.unwrap(), 2);
        assert_eq!(relay.run_once().await.unwrap(), 0);
    }
}
