//! In-process client session bound to one registered user.

use std::sync::Arc;

use agora_engine::{Engine, EngineError};
use agora_types::{Comment, Message, Post, PostRef, SubRedditId, User, UserId};

/// A logged-in user driving the engine directly.
///
/// The session keeps the snapshot taken at registration; `user().karma`
/// does not track later votes.
#[derive(Debug, Clone)]
pub struct Client {
    engine: Arc<Engine>,
    user: User,
}

impl Client {
    /// Register `username` and bind a session to the new account.
    pub fn new(engine: Arc<Engine>, username: &str) -> Self {
        let user = engine.register_account(username);
        Self { engine, user }
    }

    /// The account this session acts as.
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Post into `subreddit` as this user.
    pub fn create_post(
        &self,
        subreddit: SubRedditId,
        title: &str,
        content: &str,
    ) -> Result<Post, EngineError> {
        self.engine
            .create_post(self.user.id, subreddit, title, content)
    }

    /// Comment on `post` as this user.
    pub fn create_comment(&self, post: PostRef, content: &str) -> Result<Comment, EngineError> {
        self.engine.create_comment(self.user.id, post, content)
    }

    /// Vote on `post`. The engine does not record who voted.
    pub fn vote(&self, post: PostRef, upvote: bool) -> Result<(), EngineError> {
        self.engine.vote(post, upvote)
    }

    /// Join `subreddit`, or leave it if already a member.
    ///
    /// Returns `true` if the user is a member afterwards.
    pub fn toggle_membership(&self, subreddit: SubRedditId) -> Result<bool, EngineError> {
        match self.engine.join_subreddit(self.user.id, subreddit) {
            Ok(()) => Ok(true),
            Err(EngineError::AlreadyMember { .. }) => {
                self.engine.leave_subreddit(self.user.id, subreddit)?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Send a direct message to `to`.
    pub fn send_message(&self, to: UserId, content: &str) -> Result<Message, EngineError> {
        self.engine.send_message(self.user.id, to, content)
    }
}
