use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::MemberId;

/// Traversal depth of every candidate produced by the discovery engine.
/// Only friend-of-friend recommendations are in scope.
pub const SECOND_DEGREE: u8 = 2;

/// A second-degree candidate with attribution to the first-degree friends
/// it was reached through.
///
/// The bridge set is non-empty by construction: a candidate only exists
/// because at least one first-degree friend links to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendCandidate {
    member_id: MemberId,
    depth: u8,
    bridge_friend_ids: Vec<MemberId>,
}

impl RecommendCandidate {
    /// Creates a candidate reached through its first bridge friend
    pub fn new(member_id: MemberId, bridge_friend_id: MemberId) -> Self {
        Self {
            member_id,
            depth: SECOND_DEGREE,
            bridge_friend_ids: vec![bridge_friend_id],
        }
    }

    /// Records an additional first-degree friend linking to this candidate
    pub fn add_bridge(&mut self, bridge_friend_id: MemberId) {
        self.bridge_friend_ids.push(bridge_friend_id);
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn bridge_friend_ids(&self) -> &[MemberId] {
        &self.bridge_friend_ids
    }

    /// True when the candidate is reachable through more than one bridge
    /// friend. Derived, never set independently.
    pub fn many_acquaintance(&self) -> bool {
        self.bridge_friend_ids.len() > 1
    }

    /// Sorts the bridge list so candidate contents are order-independent
    /// of map iteration during traversal
    pub(crate) fn normalize(&mut self) {
        self.bridge_friend_ids.sort_unstable();
        self.bridge_friend_ids.dedup();
    }
}

/// Output of a single two-hop traversal for one origin member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRelation {
    origin: MemberId,
    candidates: Vec<RecommendCandidate>,
}

impl FriendRelation {
    pub fn new(origin: MemberId, candidates: Vec<RecommendCandidate>) -> Self {
        Self { origin, candidates }
    }

    pub fn empty(origin: MemberId) -> Self {
        Self {
            origin,
            candidates: Vec::new(),
        }
    }

    pub fn origin(&self) -> MemberId {
        self.origin
    }

    pub fn second_degree_candidates(&self) -> &[RecommendCandidate] {
        &self.candidates
    }

    /// Flattened candidate id set, for batched store lookups
    pub fn second_degree_ids(&self) -> HashSet<MemberId> {
        self.candidates.iter().map(|c| c.member_id).collect()
    }

    pub fn into_candidates(self) -> Vec<RecommendCandidate> {
        self.candidates
    }
}

/// Display-ready recommendation record returned to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedFriend {
    pub friend_member_id: MemberId,
    pub member_name: Option<String>,
    pub depth: u8,
    pub acquaintance_id: MemberId,
    pub acquaintance_name: Option<String>,
    pub many_acquaintance: bool,
    pub introduce: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_many_acquaintance_is_derived_from_bridge_count() {
        let mut candidate = RecommendCandidate::new(MemberId(10), MemberId(1));
        assert!(!candidate.many_acquaintance());

        candidate.add_bridge(MemberId(2));
        assert!(candidate.many_acquaintance());
    }

    #[test]
    fn test_candidate_always_has_a_bridge() {
        let candidate = RecommendCandidate::new(MemberId(10), MemberId(1));
        assert_eq!(candidate.bridge_friend_ids(), &[MemberId(1)]);
        assert_eq!(candidate.depth(), SECOND_DEGREE);
    }

    #[test]
    fn test_normalize_sorts_and_dedups_bridges() {
        let mut candidate = RecommendCandidate::new(MemberId(10), MemberId(3));
        candidate.add_bridge(MemberId(1));
        candidate.add_bridge(MemberId(3));
        candidate.normalize();
        assert_eq!(candidate.bridge_friend_ids(), &[MemberId(1), MemberId(3)]);
    }

    #[test]
    fn test_second_degree_ids_flattens_candidates() {
        let relation = FriendRelation::new(
            MemberId(1),
            vec![
                RecommendCandidate::new(MemberId(10), MemberId(2)),
                RecommendCandidate::new(MemberId(11), MemberId(3)),
            ],
        );

        let ids = relation.second_degree_ids();
        assert_eq!(
            ids,
            HashSet::from([MemberId(10), MemberId(11)])
        );
    }

    #[test]
    fn test_recommended_friend_serializes_nullable_introduce() {
        let record = RecommendedFriend {
            friend_member_id: MemberId(10),
            member_name: Some("Jiho".to_string()),
            depth: 2,
            acquaintance_id: MemberId(2),
            acquaintance_name: None,
            many_acquaintance: false,
            introduce: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["friend_member_id"], 10);
        assert_eq!(json["introduce"], serde_json::Value::Null);
    }
}
