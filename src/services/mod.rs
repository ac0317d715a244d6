pub mod discovery;
pub mod jobs;
pub mod ranking;
pub mod recommendations;

pub use discovery::{CandidateDiscoveryEngine, FANOUT_SAMPLE_CAP};
pub use jobs::{FriendshipEventRelay, FriendshipRebuildJob, InteractionRebuildJob, RebuildSummary};
pub use ranking::RecommendationRanker;
pub use recommendations::RecommendationService;
