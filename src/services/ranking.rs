use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::db::traits::{BlacklistService, InteractionScoreStore, NameResolver};
use crate::error::AppResult;
use crate::models::{FriendRelation, MemberId, RecommendCandidate, RecommendedFriend, SECOND_DEGREE};

/// Merges raw candidates with interaction scores and blacklist exclusions and
/// produces the final ordered, display-ready list
pub struct RecommendationRanker {
    scores: Arc<dyn InteractionScoreStore>,
    blacklist: Arc<dyn BlacklistService>,
    names: Arc<dyn NameResolver>,
}

impl RecommendationRanker {
    pub fn new(
        scores: Arc<dyn InteractionScoreStore>,
        blacklist: Arc<dyn BlacklistService>,
        names: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            scores,
            blacklist,
            names,
        }
    }

    /// Ranks the traversal output for one origin member.
    ///
    /// Rank key: interaction score with the origin descending, then bridge
    /// count descending, then candidate id ascending. The id tie-break keeps
    /// the order byte-for-byte stable across runs.
    ///
    /// Store lookups (blacklist, scores, names) are one batched call each.
    /// A store failure aborts the request; a missing display name only
    /// degrades that record's name and introduction text.
    pub async fn rank(
        &self,
        origin: MemberId,
        relation: FriendRelation,
        limit: usize,
    ) -> AppResult<Vec<RecommendedFriend>> {
        let candidate_ids = relation.second_degree_ids();
        if candidate_ids.is_empty() {
            return Ok(Vec::new());
        }

        let blocked = self.blacklist.blocked_with(origin, candidate_ids).await?;
        let mut candidates: Vec<RecommendCandidate> = relation
            .into_candidates()
            .into_iter()
            .filter(|c| !blocked.contains(&c.member_id()))
            .collect();

        if !blocked.is_empty() {
            tracing::debug!(origin = %origin, excluded = blocked.len(), "blacklist exclusions applied");
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // One score lookup covers the candidates and every bridge friend, so
        // acquaintance selection needs no further round trips
        let mut score_ids: HashSet<MemberId> =
            candidates.iter().map(|c| c.member_id()).collect();
        for candidate in &candidates {
            score_ids.extend(candidate.bridge_friend_ids().iter().copied());
        }
        let scores = self.scores.get_scores(origin, score_ids).await?;

        candidates.sort_by(|a, b| {
            let score_a = score_of(&scores, a.member_id());
            let score_b = score_of(&scores, b.member_id());
            score_b
                .partial_cmp(&score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.bridge_friend_ids().len().cmp(&a.bridge_friend_ids().len()))
                .then_with(|| a.member_id().cmp(&b.member_id()))
        });
        candidates.truncate(limit);

        let picks: Vec<(RecommendCandidate, MemberId)> = candidates
            .into_iter()
            .map(|c| {
                let acquaintance = pick_acquaintance(&c, &scores);
                (c, acquaintance)
            })
            .collect();

        let mut name_ids: HashSet<MemberId> =
            picks.iter().map(|(c, _)| c.member_id()).collect();
        name_ids.extend(picks.iter().map(|(_, acquaintance)| *acquaintance));
        let names = self.names.resolve_names(name_ids).await?;

        Ok(picks
            .into_iter()
            .map(|(candidate, acquaintance)| {
                let acquaintance_name = names.get(&acquaintance).cloned();
                let introduce = introduce_text(
                    candidate.depth(),
                    candidate.many_acquaintance(),
                    acquaintance_name.as_deref(),
                );
                RecommendedFriend {
                    friend_member_id: candidate.member_id(),
                    member_name: names.get(&candidate.member_id()).cloned(),
                    depth: candidate.depth(),
                    acquaintance_id: acquaintance,
                    acquaintance_name,
                    many_acquaintance: candidate.many_acquaintance(),
                    introduce,
                }
            })
            .collect())
    }
}

fn score_of(scores: &HashMap<MemberId, f64>, id: MemberId) -> f64 {
    scores.get(&id).copied().unwrap_or(0.0)
}

/// Representative bridge friend: the one with the highest interaction score
/// with the origin, lowest id on ties
fn pick_acquaintance(
    candidate: &RecommendCandidate,
    scores: &HashMap<MemberId, f64>,
) -> MemberId {
    let bridges = candidate.bridge_friend_ids();
    let mut best = bridges[0];
    let mut best_score = score_of(scores, best);
    for &bridge in &bridges[1..] {
        let score = score_of(scores, bridge);
        if score > best_score || (score == best_score && bridge < best) {
            best = bridge;
            best_score = score;
        }
    }
    best
}

/// Justification text shown next to a recommendation.
///
/// Null when the candidate is not a friend-of-friend or the representative
/// acquaintance has no resolvable name.
fn introduce_text(depth: u8, many_acquaintance: bool, acquaintance_name: Option<&str>) -> Option<String> {
    let name = acquaintance_name?;
    if depth != SECOND_DEGREE {
        return None;
    }
    if many_acquaintance {
        Some(format!("{} 외 다수의 공통 친구", name))
    } else {
        Some(format!("{}의 친구", name))
    }
}
