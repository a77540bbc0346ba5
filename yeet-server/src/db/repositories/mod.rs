mod user_repository;
mod post_repository;
mod follow_repository;
mod engagement_repository;
mod feedback_repository;
mod topic_repository;

pub use user_repository::{unique_violation, NewUser, UniqueField, UserRecord, UserRepository};
pub use post_repository::{NewPost, PostRepository};
pub use follow_repository::FollowRepository;
pub use engagement_repository::{EngagementKind, EngagementRepository};
pub use feedback_repository::{FeedbackRepository, OptionLookup};
pub use topic_repository::TopicRepository;

/// Whether a toggled edge exists after the flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    On,
    Off,
}
