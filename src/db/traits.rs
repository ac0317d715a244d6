// Narrow async interfaces over the external collaborators of the
// recommendation core: the two fast stores (Redis) and the friendship
// system-of-record (Postgres).
//
// The engine and ranker only see these traits, so unit tests drive them
// with mockall automocks and integration tests with in-memory fakes.

use async_trait::async_trait;
use chrono::Duration;
use std::collections::{HashMap, HashSet};

use crate::error::AppResult;
use crate::models::{FriendshipEvent, InteractionEvent, MemberId};

/// Batched get/put of direct-friend sets against the fast key-value backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdjacencyStore: Send + Sync {
    /// Direct-friend sets for a whole batch of members in a single round trip.
    ///
    /// A member with no friends (or absent from the store) maps to an empty
    /// set rather than an error. The single-round-trip property is what the
    /// discovery engine's fan-out cap exists to protect.
    async fn get_friends_batch(
        &self,
        member_ids: HashSet<MemberId>,
    ) -> AppResult<HashMap<MemberId, HashSet<MemberId>>>;

    /// Direct-friend set of a single member
    async fn get_friends(&self, member_id: MemberId) -> AppResult<HashSet<MemberId>>;

    /// Adds both directions of a friendship edge atomically. Idempotent.
    async fn add_edge(&self, a: MemberId, b: MemberId) -> AppResult<()>;

    /// Removes both directions of a friendship edge atomically. Removing a
    /// non-existent edge is a no-op.
    async fn remove_edge(&self, a: MemberId, b: MemberId) -> AppResult<()>;

    /// Atomically replaces a member's whole friend set. Used by the rebuild
    /// job; concurrent readers see either the old or the new snapshot.
    async fn replace_friends(
        &self,
        member_id: MemberId,
        friends: HashSet<MemberId>,
    ) -> AppResult<()>;
}

/// Decaying pairwise engagement scores
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionScoreStore: Send + Sync {
    /// Scores between the origin and each listed member, one round trip.
    /// Pairs with no recorded interaction are absent from the result; callers
    /// default them to 0.0.
    async fn get_scores(
        &self,
        origin: MemberId,
        others: HashSet<MemberId>,
    ) -> AppResult<HashMap<MemberId, f64>>;

    /// Atomically replaces the entire score row for a member. Never a partial
    /// merge, so stale pairs cannot accumulate across rebuilds.
    async fn rebuild_for_member(
        &self,
        member_id: MemberId,
        scores: HashMap<MemberId, f64>,
    ) -> AppResult<()>;
}

/// Set membership test for mutually blocked member pairs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlacklistService: Send + Sync {
    /// Subset of `others` blocked with the origin in either direction,
    /// resolved in a single query
    async fn blocked_with(
        &self,
        origin: MemberId,
        others: HashSet<MemberId>,
    ) -> AppResult<HashSet<MemberId>>;

    /// Symmetric pairwise check
    async fn is_blocked(&self, a: MemberId, b: MemberId) -> AppResult<bool>;
}

/// Batched member display-name resolution
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Display names for the given members. Unknown members are absent from
    /// the result; callers keep the record with a null name.
    async fn resolve_names(
        &self,
        member_ids: HashSet<MemberId>,
    ) -> AppResult<HashMap<MemberId, String>>;
}

/// Relational system-of-record for confirmed friendships and engagement,
/// consumed by the rebuild jobs and the event relay
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// All known member ids, in ascending order
    async fn list_member_ids(&self) -> AppResult<Vec<MemberId>>;

    /// Current confirmed friend set of a member
    async fn list_friend_ids(&self, member_id: MemberId) -> AppResult<HashSet<MemberId>>;

    /// Friendship created/deleted events after the given cursor, ascending
    /// by sequence number
    async fn friendship_events_since(&self, cursor: i64) -> AppResult<Vec<FriendshipEvent>>;

    /// Members with at least one engagement event inside the trailing window
    async fn members_with_interactions(&self, window: Duration) -> AppResult<Vec<MemberId>>;

    /// Engagement events of one member inside the trailing window
    async fn interaction_events(
        &self,
        member_id: MemberId,
        window: Duration,
    ) -> AppResult<Vec<InteractionEvent>>;
}
