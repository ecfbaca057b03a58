//! Entity records for the Agora forum.
//!
//! These are the value snapshots the engine hands out. They are plain data:
//! mutating a record returned by the engine has no effect on engine state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{CommentId, MessageId, PostId, SubRedditId, UserId};

// ---------------------------------------------------------------------------
// Users and communities
// ---------------------------------------------------------------------------

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// Engine-assigned identity, sequential from 1.
    pub id: UserId,
    /// Display name. Unique among users when callers check before registering.
    pub username: String,
    /// Net votes received on this user's posts. May be negative.
    pub karma: i64,
}

/// A community that users join and post into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubReddit {
    /// Engine-assigned identity, sequential from 1.
    pub id: SubRedditId,
    /// Community name. Unique when callers check before creating.
    pub name: String,
    /// Identities of the current members.
    pub members: BTreeSet<UserId>,
    /// Posts in creation order.
    pub posts: Vec<Post>,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Unambiguous reference to a post: the owning subreddit plus the
/// subreddit-scoped post identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PostRef {
    /// The subreddit that owns the post.
    pub subreddit_id: SubRedditId,
    /// The post identity within that subreddit.
    pub post_id: PostId,
}

impl PostRef {
    /// Build a reference from its two parts.
    pub const fn new(subreddit_id: SubRedditId, post_id: PostId) -> Self {
        Self {
            subreddit_id,
            post_id,
        }
    }
}

impl core::fmt::Display for PostRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.subreddit_id, self.post_id)
    }
}

/// A post inside a subreddit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Post {
    /// Identity scoped to `subreddit_id`. Collides across subreddits.
    pub id: PostId,
    /// The owning subreddit.
    pub subreddit_id: SubRedditId,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
    /// The authoring user.
    pub author: UserId,
    /// Net vote tally. May be negative.
    pub votes: i64,
    /// Comments in creation order.
    pub comments: Vec<Comment>,
}

impl Post {
    /// The unambiguous reference to this post.
    pub const fn post_ref(&self) -> PostRef {
        PostRef::new(self.subreddit_id, self.id)
    }
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Comment {
    /// Identity scoped to the owning post.
    pub id: CommentId,
    /// Comment body.
    pub content: String,
    /// The authoring user.
    pub author: UserId,
    /// Net vote tally. Nothing votes on comments yet, so this stays 0.
    pub votes: i64,
    /// Nested replies. Always empty: no operation creates replies.
    pub replies: Vec<Comment>,
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Message {
    /// Engine-assigned identity, globally sequential from 1.
    pub id: MessageId,
    /// The sender.
    pub from: UserId,
    /// The recipient.
    pub to: UserId,
    /// Message body.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Aggregate counts
// ---------------------------------------------------------------------------

/// Entity counts across the whole engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EngineStats {
    /// Registered users.
    pub users: u64,
    /// Created subreddits.
    pub subreddits: u64,
    /// Posts across all subreddits.
    pub posts: u64,
    /// Comments across all posts.
    pub comments: u64,
    /// Direct messages sent.
    pub messages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_ref_display_names_both_scopes() {
        let post_ref = PostRef::new(SubRedditId::new(3), PostId::new(1));
        assert_eq!(post_ref.to_string(), "3/1");
    }

    #[test]
    fn post_exposes_its_ref() {
        let post = Post {
            id: PostId::new(2),
            subreddit_id: SubRedditId::new(5),
            title: String::from("t"),
            content: String::from("c"),
            author: UserId::new(1),
            votes: 0,
            comments: Vec::new(),
        };
        assert_eq!(
            post.post_ref(),
            PostRef::new(SubRedditId::new(5), PostId::new(2))
        );
    }

    #[test]
    fn comment_serializes_with_empty_replies() {
        let comment = Comment {
            id: CommentId::new(1),
            content: String::from("first"),
            author: UserId::new(4),
            votes: 0,
            replies: Vec::new(),
        };
        let value = serde_json::to_value(&comment).ok();
        let replies = value
            .as_ref()
            .and_then(|v| v.get("replies"))
            .and_then(serde_json::Value::as_array)
            .map(Vec::len);
        assert_eq!(replies, Some(0));
    }
}
