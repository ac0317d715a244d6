use rand::seq::IteratorRandom;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::db::traits::AdjacencyStore;
use crate::error::AppResult;
use crate::models::{FriendRelation, MemberId, RecommendCandidate};

/// Upper bound on the number of first-degree friends sent to the batch
/// adjacency lookup. Caps the fan-out of one recommendation request no
/// matter how popular the origin member is.
pub const FANOUT_SAMPLE_CAP: usize = 200;

/// Samples and traverses the friendship graph two hops from an origin member,
/// producing second-degree candidates with bridge-friend attribution
pub struct CandidateDiscoveryEngine {
    adjacency: Arc<dyn AdjacencyStore>,
}

impl CandidateDiscoveryEngine {
    pub fn new(adjacency: Arc<dyn AdjacencyStore>) -> Self {
        Self { adjacency }
    }

    /// Two-hop traversal from the origin through its first-degree friends.
    ///
    /// First-degree sets larger than [`FANOUT_SAMPLE_CAP`] are sampled down
    /// uniformly at random without replacement before the batch lookup.
    /// A store failure aborts the whole traversal; no partial candidate set
    /// is ever returned.
    pub async fn find_friend_relation(
        &self,
        origin: MemberId,
        first_degree: &HashSet<MemberId>,
    ) -> AppResult<FriendRelation> {
        if first_degree.is_empty() {
            return Ok(FriendRelation::empty(origin));
        }

        let lookup = sample_fanout(first_degree, FANOUT_SAMPLE_CAP);
        tracing::debug!(
            origin = %origin,
            first_degree = first_degree.len(),
            fanout = lookup.len(),
            "traversing second degree"
        );

        let adjacency = self.adjacency.get_friends_batch(lookup).await?;

        let mut bridges: HashMap<MemberId, RecommendCandidate> = HashMap::new();
        for (friend, friends_of_friend) in &adjacency {
            // The store holds both directions of every edge. A friend whose
            // set is missing the origin is a one-directional edge: warn and
            // traverse as if the edge did not exist.
            if !friends_of_friend.contains(&origin) {
                tracing::warn!(
                    origin = %origin,
                    friend = %friend,
                    "one-directional edge in adjacency store, dropping friend from traversal"
                );
                continue;
            }

            for candidate in friends_of_friend {
                if *candidate == origin || first_degree.contains(candidate) {
                    continue;
                }
                bridges
                    .entry(*candidate)
                    .and_modify(|c| c.add_bridge(*friend))
                    .or_insert_with(|| RecommendCandidate::new(*candidate, *friend));
            }
        }

        let mut candidates: Vec<RecommendCandidate> = bridges.into_values().collect();
        for candidate in &mut candidates {
            candidate.normalize();
        }
        // Map iteration order is arbitrary; fix it so downstream tie-breaks
        // start from a deterministic sequence
        candidates.sort_unstable_by_key(|c| c.member_id());

        tracing::debug!(
            origin = %origin,
            candidates = candidates.len(),
            "second-degree traversal complete"
        );

        Ok(FriendRelation::new(origin, candidates))
    }
}

/// Uniform sample without replacement down to `cap`; sets at or under the
/// cap pass through unchanged
fn sample_fanout(first_degree: &HashSet<MemberId>, cap: usize) -> HashSet<MemberId> {
    if first_degree.len() <= cap {
        return first_degree.clone();
    }

    let mut rng = rand::thread_rng();
    first_degree
        .iter()
        .copied()
        .choose_multiple(&mut rng, cap)
        .into_iter()
        .collect()
}
