use std::sync::Arc;

use crate::db::traits::{AdjacencyStore, BlacklistService, InteractionScoreStore, NameResolver};
use crate::error::AppResult;
use crate::models::{MemberId, RecommendedFriend};
use crate::services::discovery::CandidateDiscoveryEngine;
use crate::services::ranking::RecommendationRanker;

/// End-to-end "people you may know" pipeline for one origin member:
/// first-degree lookup, two-hop discovery, then ranking
pub struct RecommendationService {
    adjacency: Arc<dyn AdjacencyStore>,
    discovery: CandidateDiscoveryEngine,
    ranker: RecommendationRanker,
}

impl RecommendationService {
    pub fn new(
        adjacency: Arc<dyn AdjacencyStore>,
        scores: Arc<dyn InteractionScoreStore>,
        blacklist: Arc<dyn BlacklistService>,
        names: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            discovery: CandidateDiscoveryEngine::new(adjacency.clone()),
            ranker: RecommendationRanker::new(scores, blacklist, names),
            adjacency,
        }
    }

    /// Ordered, display-ready recommendations for the origin member.
    ///
    /// Read-only over the stores; concurrent calls for the same origin race
    /// harmlessly. Any store failure aborts the whole request.
    pub async fn recommend(
        &self,
        origin: MemberId,
        limit: usize,
    ) -> AppResult<Vec<RecommendedFriend>> {
        let first_degree = self.adjacency.get_friends(origin).await?;
        let relation = self
            .discovery
            .find_friend_relation(origin, &first_degree)
            .await?;
        self.ranker.rank(origin, relation, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::{
        MockAdjacencyStore, MockBlacklistService, MockInteractionScoreStore, MockNameResolver,
    };
    use std::collections::{HashMap, HashSet};

    #[tokio::test]
    async fn test_member_with_no_friends_gets_no_recommendations() {
        let mut adjacency = MockAdjacencyStore::new();
        adjacency
            .expect_get_friends()
            .returning(|_| Ok(HashSet::new()));

        let service = RecommendationService::new(
            Arc::new(adjacency),
            Arc::new(MockInteractionScoreStore::new()),
            Arc::new(MockBlacklistService::new()),
            Arc::new(MockNameResolver::new()),
        );

        let recommendations = service.recommend(MemberId(1), 20).await.unwrap();
        assert!(recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_full_pipeline_produces_ranked_records() {
        let origin = MemberId(1);

        let mut adjacency = MockAdjacencyStore::new();
        adjacency
            .expect_get_friends()
            .returning(|_| Ok(HashSet::from([MemberId(2)])));
        adjacency.expect_get_friends_batch().returning(move |_| {
            Ok(HashMap::from([(
                MemberId(2),
                HashSet::from([origin, MemberId(10)]),
            )]))
        });

        let mut scores = MockInteractionScoreStore::new();
        scores
            .expect_get_scores()
            .returning(|_, _| Ok(HashMap::new()));

        let mut blacklist = MockBlacklistService::new();
        blacklist
            .expect_blocked_with()
            .returning(|_, _| Ok(HashSet::new()));

        let mut names = MockNameResolver::new();
        names.expect_resolve_names().returning(|_| {
            Ok(HashMap::from([
                (MemberId(2), "Jiho".to_string()),
                (MemberId(10), "Minsu".to_string()),
            ]))
        });

        let service = RecommendationService::new(
            Arc::new(adjacency),
            Arc::new(scores),
            Arc::new(blacklist),
            Arc::new(names),
        );

        let recommendations = service.recommend(origin, 20).await.unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].friend_member_id, MemberId(10));
        assert_eq!(recommendations[0].introduce.as_deref(), Some("Jiho의 친구"));
    }
}
