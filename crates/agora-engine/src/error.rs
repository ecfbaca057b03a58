//! Error types for the `agora-engine` crate.
//!
//! The taxonomy is deliberately small. Only membership changes fail in
//! normal operation; lookups report absence as `None`. The `Unknown*`
//! variants mean the caller handed the engine an identity it never
//! issued, which is a programmer error rather than a recoverable one.

use agora_types::{PostRef, SubRedditId, UserId};

/// Errors returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Join attempted while the membership already exists.
    #[error("user {user} is already a member of subreddit {subreddit}")]
    AlreadyMember {
        /// The joining user.
        user: UserId,
        /// The target subreddit.
        subreddit: SubRedditId,
    },

    /// Leave attempted while no membership exists.
    #[error("user {user} is not a member of subreddit {subreddit}")]
    NotMember {
        /// The leaving user.
        user: UserId,
        /// The target subreddit.
        subreddit: SubRedditId,
    },

    /// A user identity the engine never issued.
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// A subreddit identity the engine never issued.
    #[error("unknown subreddit: {0}")]
    UnknownSubReddit(SubRedditId),

    /// A post reference that resolves to no post.
    #[error("unknown post: {0}")]
    UnknownPost(PostRef),
}

impl EngineError {
    /// Whether this error is a caller precondition violation (a dangling
    /// identity) rather than one of the recoverable membership errors.
    pub const fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownUser(_) | Self::UnknownSubReddit(_) | Self::UnknownPost(_)
        )
    }
}
