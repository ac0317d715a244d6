use chrono::{DateTime, Utc};

use super::MemberId;

/// Kind of a friendship change in the system-of-record event log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipChange {
    Created,
    Deleted,
}

/// One entry of the friendship event log, polled between full rebuilds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FriendshipEvent {
    /// Monotonic log sequence number, used as the poll cursor
    pub seq: i64,
    pub member_id: MemberId,
    pub friend_id: MemberId,
    pub change: FriendshipChange,
}

/// Engagement kinds that feed the interaction score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Comment,
    Like,
}

impl InteractionKind {
    /// Base weight of one event of this kind, before time decay
    pub fn weight(self) -> f64 {
        match self {
            InteractionKind::Comment => 2.0,
            InteractionKind::Like => 1.0,
        }
    }
}

/// One engagement event between a member and a counterparty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionEvent {
    pub counterparty_id: MemberId,
    pub kind: InteractionKind,
    pub occurred_at: DateTime<Utc>,
}
