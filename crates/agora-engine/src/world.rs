//! The aggregate world state guarded by the engine lock.
//!
//! Top-level collections are `BTreeMap`s keyed by sequential identity, so
//! iteration order is creation order. Each parent keeps the counter for its
//! children's next identity next to the child sequence; children are never
//! removed, so the counter always equals `children.len() + 1`.

use std::collections::{BTreeMap, BTreeSet};

use agora_types::{
    Comment, CommentId, Message, MessageId, Post, PostId, PostRef, SubReddit, SubRedditId, User,
    UserId,
};

/// A post plus the counter for its next comment identity.
#[derive(Debug)]
pub(crate) struct PostEntry {
    pub(crate) post: Post,
    pub(crate) next_comment_id: CommentId,
}

impl PostEntry {
    pub(crate) const fn new(post: Post) -> Self {
        Self {
            post,
            next_comment_id: CommentId::FIRST,
        }
    }

    /// Append a comment with the next scoped identity.
    pub(crate) fn push_comment(&mut self, author: UserId, content: String) -> Comment {
        let comment = Comment {
            id: self.next_comment_id,
            content,
            author,
            votes: 0,
            replies: Vec::new(),
        };
        self.next_comment_id = self.next_comment_id.next();
        self.post.comments.push(comment.clone());
        comment
    }
}

/// A subreddit plus its post sequence and next post identity.
#[derive(Debug)]
pub(crate) struct SubRedditEntry {
    pub(crate) id: SubRedditId,
    pub(crate) name: String,
    pub(crate) members: BTreeSet<UserId>,
    pub(crate) posts: Vec<PostEntry>,
    pub(crate) next_post_id: PostId,
}

impl SubRedditEntry {
    pub(crate) const fn new(id: SubRedditId, name: String) -> Self {
        Self {
            id,
            name,
            members: BTreeSet::new(),
            posts: Vec::new(),
            next_post_id: PostId::FIRST,
        }
    }

    /// Append a post with the next scoped identity.
    pub(crate) fn push_post(&mut self, author: UserId, title: String, content: String) -> Post {
        let post = Post {
            id: self.next_post_id,
            subreddit_id: self.id,
            title,
            content,
            author,
            votes: 0,
            comments: Vec::new(),
        };
        self.next_post_id = self.next_post_id.next();
        self.posts.push(PostEntry::new(post.clone()));
        post
    }

    /// Posts are stored in identity order, so a binary search finds them.
    pub(crate) fn post(&self, id: PostId) -> Option<&PostEntry> {
        self.posts
            .binary_search_by_key(&id, |entry| entry.post.id)
            .ok()
            .and_then(|index| self.posts.get(index))
    }

    pub(crate) fn post_mut(&mut self, id: PostId) -> Option<&mut PostEntry> {
        self.posts
            .binary_search_by_key(&id, |entry| entry.post.id)
            .ok()
            .and_then(|index| self.posts.get_mut(index))
    }

    pub(crate) fn feed(&self) -> Vec<Post> {
        self.posts.iter().map(|entry| entry.post.clone()).collect()
    }

    pub(crate) fn snapshot(&self) -> SubReddit {
        SubReddit {
            id: self.id,
            name: self.name.clone(),
            members: self.members.clone(),
            posts: self.feed(),
        }
    }
}

/// Every collection the engine owns.
#[derive(Debug)]
pub(crate) struct World {
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) subreddits: BTreeMap<SubRedditId, SubRedditEntry>,
    pub(crate) messages: BTreeMap<MessageId, Message>,
    pub(crate) next_user_id: UserId,
    pub(crate) next_subreddit_id: SubRedditId,
    pub(crate) next_message_id: MessageId,
}

impl Default for World {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            subreddits: BTreeMap::new(),
            messages: BTreeMap::new(),
            next_user_id: UserId::FIRST,
            next_subreddit_id: SubRedditId::FIRST,
            next_message_id: MessageId::FIRST,
        }
    }
}

impl World {
    pub(crate) fn post_mut(&mut self, post_ref: PostRef) -> Option<&mut PostEntry> {
        self.subreddits
            .get_mut(&post_ref.subreddit_id)
            .and_then(|sr| sr.post_mut(post_ref.post_id))
    }

    pub(crate) fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.values().find(|user| user.username == username)
    }
}
