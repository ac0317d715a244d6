pub mod events;
pub mod member;
pub mod recommendation;

pub use events::{FriendshipChange, FriendshipEvent, InteractionEvent, InteractionKind};
pub use member::MemberId;
pub use recommendation::{FriendRelation, RecommendCandidate, RecommendedFriend, SECOND_DEGREE};
