//! The [`Engine`]: every entity operation, serialized behind one lock.
//!
//! Each operation acquires the engine mutex for its full duration, so each
//! call is individually atomic and linearizable. Nothing spans calls: a
//! lookup followed by a mutation is two independent critical sections.
//! Reads take the same exclusive lock as writes.
//!
//! Entities are referred to by identity. Records returned from the engine
//! are snapshots cloned under the lock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use agora_types::{
    Comment, EngineStats, Message, Post, PostId, PostRef, SubReddit, SubRedditId, User, UserId,
};
use tracing::debug;

use crate::error::EngineError;
use crate::world::{SubRedditEntry, World};

/// The in-memory forum store.
///
/// Share it between threads as `Arc<Engine>`.
#[derive(Debug, Default)]
pub struct Engine {
    world: Mutex<World>,
}

impl Engine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the engine lock.
    ///
    /// No operation panics while holding the lock, so a poisoned mutex
    /// still guards consistent state and is recovered.
    fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Identity & registration
    // -----------------------------------------------------------------------

    /// Register a new account.
    ///
    /// Always creates a user, even if the name is taken: callers check
    /// [`user_exists`](Self::user_exists) first when they need uniqueness.
    pub fn register_account(&self, username: &str) -> User {
        let mut world = self.world();
        let user = User {
            id: world.next_user_id,
            username: username.to_owned(),
            karma: 0,
        };
        world.next_user_id = user.id.next();
        world.users.insert(user.id, user.clone());
        debug!(user_id = %user.id, username, "account registered");
        user
    }

    /// Create a new subreddit. No duplicate-name guard.
    pub fn create_subreddit(&self, name: &str) -> SubReddit {
        let mut world = self.world();
        let id = world.next_subreddit_id;
        world.next_subreddit_id = id.next();
        let entry = SubRedditEntry::new(id, name.to_owned());
        let snapshot = entry.snapshot();
        world.subreddits.insert(id, entry);
        debug!(subreddit_id = %id, name, "subreddit created");
        snapshot
    }

    // -----------------------------------------------------------------------
    // Content creation
    // -----------------------------------------------------------------------

    /// Append a post to `subreddit`. Its identity is the subreddit's post
    /// count plus one.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownUser`] or [`EngineError::UnknownSubReddit`]
    /// if either identity was never issued.
    pub fn create_post(
        &self,
        author: UserId,
        subreddit: SubRedditId,
        title: &str,
        content: &str,
    ) -> Result<Post, EngineError> {
        let mut world = self.world();
        if !world.users.contains_key(&author) {
            return Err(EngineError::UnknownUser(author));
        }
        let entry = world
            .subreddits
            .get_mut(&subreddit)
            .ok_or(EngineError::UnknownSubReddit(subreddit))?;
        let post = entry.push_post(author, title.to_owned(), content.to_owned());
        debug!(
            subreddit_id = %subreddit,
            post_id = %post.id,
            author_id = %author,
            "post created"
        );
        Ok(post)
    }

    /// Append a comment to a post. Its identity is the post's comment count
    /// plus one.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownUser`] or [`EngineError::UnknownPost`] if
    /// either reference dangles.
    pub fn create_comment(
        &self,
        author: UserId,
        post: PostRef,
        content: &str,
    ) -> Result<Comment, EngineError> {
        let mut world = self.world();
        if !world.users.contains_key(&author) {
            return Err(EngineError::UnknownUser(author));
        }
        let entry = world.post_mut(post).ok_or(EngineError::UnknownPost(post))?;
        let comment = entry.push_comment(author, content.to_owned());
        debug!(post = %post, comment_id = %comment.id, author_id = %author, "comment created");
        Ok(comment)
    }

    // -----------------------------------------------------------------------
    // Voting
    // -----------------------------------------------------------------------

    /// Apply one vote: the post tally and its author's karma move together
    /// by +1 (`upvote`) or -1 in a single locked step.
    ///
    /// Votes are not de-duplicated and values have no floor.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownPost`] if the reference dangles, or
    /// [`EngineError::UnknownUser`] if the post's author is missing. State
    /// is untouched on error.
    pub fn vote(&self, post: PostRef, upvote: bool) -> Result<(), EngineError> {
        let delta: i64 = if upvote { 1 } else { -1 };
        let mut guard = self.world();
        let World {
            users, subreddits, ..
        } = &mut *guard;

        let entry = subreddits
            .get_mut(&post.subreddit_id)
            .and_then(|sr| sr.post_mut(post.post_id))
            .ok_or(EngineError::UnknownPost(post))?;
        let author = users
            .get_mut(&entry.post.author)
            .ok_or(EngineError::UnknownUser(entry.post.author))?;

        entry.post.votes = entry.post.votes.saturating_add(delta);
        author.karma = author.karma.saturating_add(delta);
        debug!(
            post = %post,
            upvote,
            votes = entry.post.votes,
            author_id = %author.id,
            karma = author.karma,
            "vote applied"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Add `user` to the members of `subreddit`.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyMember`] if the membership exists; the
    /// `Unknown*` variants for dangling identities.
    pub fn join_subreddit(&self, user: UserId, subreddit: SubRedditId) -> Result<(), EngineError> {
        let mut world = self.world();
        if !world.users.contains_key(&user) {
            return Err(EngineError::UnknownUser(user));
        }
        let entry = world
            .subreddits
            .get_mut(&subreddit)
            .ok_or(EngineError::UnknownSubReddit(subreddit))?;
        if !entry.members.insert(user) {
            return Err(EngineError::AlreadyMember { user, subreddit });
        }
        debug!(user_id = %user, subreddit_id = %subreddit, "joined subreddit");
        Ok(())
    }

    /// Remove `user` from the members of `subreddit`.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotMember`] if no membership exists; the `Unknown*`
    /// variants for dangling identities.
    pub fn leave_subreddit(&self, user: UserId, subreddit: SubRedditId) -> Result<(), EngineError> {
        let mut world = self.world();
        if !world.users.contains_key(&user) {
            return Err(EngineError::UnknownUser(user));
        }
        let entry = world
            .subreddits
            .get_mut(&subreddit)
            .ok_or(EngineError::UnknownSubReddit(subreddit))?;
        if !entry.members.remove(&user) {
            return Err(EngineError::NotMember { user, subreddit });
        }
        debug!(user_id = %user, subreddit_id = %subreddit, "left subreddit");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Messaging
    // -----------------------------------------------------------------------

    /// Send a direct message. Identities are global and sequential.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownUser`] if either party was never registered.
    pub fn send_message(
        &self,
        from: UserId,
        to: UserId,
        content: &str,
    ) -> Result<Message, EngineError> {
        let mut world = self.world();
        for party in [from, to] {
            if !world.users.contains_key(&party) {
                return Err(EngineError::UnknownUser(party));
            }
        }
        let message = Message {
            id: world.next_message_id,
            from,
            to,
            content: content.to_owned(),
        };
        world.next_message_id = message.id.next();
        world.messages.insert(message.id, message.clone());
        debug!(message_id = %message.id, from = %from, to = %to, "message sent");
        Ok(message)
    }

    /// Every message addressed to `user`, in the order they were sent.
    pub fn get_messages(&self, user: UserId) -> Vec<Message> {
        self.world()
            .messages
            .values()
            .filter(|message| message.to == user)
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Find a subreddit by exact, case-sensitive name.
    pub fn get_subreddit_by_name(&self, name: &str) -> Option<SubReddit> {
        self.world()
            .subreddits
            .values()
            .find(|sr| sr.name == name)
            .map(SubRedditEntry::snapshot)
    }

    /// Find a user by exact, case-sensitive name.
    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.world().user_by_name(username).cloned()
    }

    /// Whether any user has this exact name.
    pub fn user_exists(&self, username: &str) -> bool {
        self.world().user_by_name(username).is_some()
    }

    /// Find a post by its scoped identity alone.
    ///
    /// Post identities repeat across subreddits, so this returns the
    /// *first* match scanning subreddits in creation order. Callers that
    /// know the owning subreddit should use [`get_post`](Self::get_post).
    pub fn get_post_by_id(&self, id: PostId) -> Option<Post> {
        self.world()
            .subreddits
            .values()
            .find_map(|sr| sr.post(id))
            .map(|entry| entry.post.clone())
    }

    /// Find a post by its unambiguous reference.
    pub fn get_post(&self, post: PostRef) -> Option<Post> {
        self.world()
            .subreddits
            .get(&post.subreddit_id)
            .and_then(|sr| sr.post(post.post_id))
            .map(|entry| entry.post.clone())
    }

    /// The posts of a subreddit in creation order, unfiltered and unranked.
    ///
    /// `None` only if the subreddit identity was never issued.
    pub fn get_feed(&self, subreddit: SubRedditId) -> Option<Vec<Post>> {
        self.world().subreddits.get(&subreddit).map(SubRedditEntry::feed)
    }

    /// Every post: subreddits in creation order, posts in creation order
    /// within each.
    pub fn get_all_posts(&self) -> Vec<Post> {
        self.world()
            .subreddits
            .values()
            .flat_map(|sr| sr.posts.iter().map(|entry| entry.post.clone()))
            .collect()
    }

    /// Look up a user by identity.
    pub fn get_user(&self, id: UserId) -> Option<User> {
        self.world().users.get(&id).cloned()
    }

    /// Look up a subreddit by identity.
    pub fn get_subreddit(&self, id: SubRedditId) -> Option<SubReddit> {
        self.world().subreddits.get(&id).map(SubRedditEntry::snapshot)
    }

    /// All users in registration order.
    pub fn list_users(&self) -> Vec<User> {
        self.world().users.values().cloned().collect()
    }

    /// All subreddits in creation order.
    pub fn list_subreddits(&self) -> Vec<SubReddit> {
        self.world()
            .subreddits
            .values()
            .map(SubRedditEntry::snapshot)
            .collect()
    }

    /// Entity counts, taken in one critical section.
    pub fn stats(&self) -> EngineStats {
        let world = self.world();
        let (posts, comments) = world
            .subreddits
            .values()
            .flat_map(|sr| sr.posts.iter())
            .fold((0_u64, 0_u64), |(posts, comments), entry| {
                (
                    posts.saturating_add(1),
                    comments.saturating_add(count(entry.post.comments.len())),
                )
            });
        EngineStats {
            users: count(world.users.len()),
            subreddits: count(world.subreddits.len()),
            posts,
            comments,
            messages: count(world.messages.len()),
        }
    }
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agora_types::CommentId;

    use super::*;

    fn seeded() -> (Engine, User, SubReddit) {
        let engine = Engine::new();
        let user = engine.register_account("alice");
        let sr = engine.create_subreddit("rust");
        (engine, user, sr)
    }

    #[test]
    fn register_assigns_sequential_ids() {
        let engine = Engine::new();
        let ids: Vec<u64> = (0..5)
            .map(|i| engine.register_account(&format!("user{i}")).id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn register_does_not_guard_duplicate_names() {
        let engine = Engine::new();
        let first = engine.register_account("bob");
        let second = engine.register_account("bob");
        assert_ne!(first.id, second.id);
        assert_eq!(engine.list_users().len(), 2);
        // Lookup returns the earliest registration.
        assert_eq!(engine.get_user_by_username("bob").map(|u| u.id), Some(first.id));
    }

    #[test]
    fn new_user_starts_with_zero_karma() {
        let (_, user, _) = seeded();
        assert_eq!(user.karma, 0);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn post_ids_are_scoped_per_subreddit() {
        let (engine, user, rust) = seeded();
        let go = engine.create_subreddit("go");

        let a = engine.create_post(user.id, rust.id, "a", "").unwrap();
        let b = engine.create_post(user.id, rust.id, "b", "").unwrap();
        let c = engine.create_post(user.id, go.id, "c", "").unwrap();

        assert_eq!(a.id, PostId::new(1));
        assert_eq!(b.id, PostId::new(2));
        assert_eq!(c.id, PostId::new(1));
        assert_eq!(c.subreddit_id, go.id);
    }

    #[test]
    fn comments_are_scoped_per_post() {
        let (engine, user, sr) = seeded();
        let p1 = engine.create_post(user.id, sr.id, "p1", "").unwrap();
        let p2 = engine.create_post(user.id, sr.id, "p2", "").unwrap();

        let c1 = engine.create_comment(user.id, p1.post_ref(), "x").unwrap();
        let c2 = engine.create_comment(user.id, p1.post_ref(), "y").unwrap();
        let c3 = engine.create_comment(user.id, p2.post_ref(), "z").unwrap();

        assert_eq!(c1.id, CommentId::new(1));
        assert_eq!(c2.id, CommentId::new(2));
        assert_eq!(c3.id, CommentId::new(1));
        assert!(c1.replies.is_empty());

        let stored = engine.get_post(p1.post_ref()).unwrap();
        assert_eq!(stored.comments.len(), 2);
        assert_eq!(stored.comments.get(1).map(|c| c.content.as_str()), Some("y"));
    }

    #[test]
    fn vote_moves_tally_and_karma_together() {
        let (engine, author, sr) = seeded();
        let post = engine.create_post(author.id, sr.id, "t", "c").unwrap();

        engine.vote(post.post_ref(), false).unwrap();
        engine.vote(post.post_ref(), false).unwrap();
        engine.vote(post.post_ref(), true).unwrap();

        assert_eq!(engine.get_post(post.post_ref()).unwrap().votes, -1);
        assert_eq!(engine.get_user(author.id).unwrap().karma, -1);
    }

    #[test]
    fn vote_on_dangling_post_leaves_state_untouched() {
        let (engine, author, sr) = seeded();
        let missing = PostRef::new(sr.id, PostId::new(1));
        assert_eq!(
            engine.vote(missing, true),
            Err(EngineError::UnknownPost(missing))
        );
        assert_eq!(engine.get_user(author.id).unwrap().karma, 0);
    }

    #[test]
    fn create_post_rejects_dangling_references() {
        let (engine, user, sr) = seeded();
        let ghost = UserId::new(99);
        assert_eq!(
            engine.create_post(ghost, sr.id, "t", "c"),
            Err(EngineError::UnknownUser(ghost))
        );
        let nowhere = SubRedditId::new(42);
        assert_eq!(
            engine.create_post(user.id, nowhere, "t", "c"),
            Err(EngineError::UnknownSubReddit(nowhere))
        );
        assert_eq!(engine.stats().posts, 0);
    }

    #[test]
    fn membership_round_trip() {
        let (engine, user, sr) = seeded();
        assert!(engine.join_subreddit(user.id, sr.id).is_ok());
        assert_eq!(
            engine.join_subreddit(user.id, sr.id),
            Err(EngineError::AlreadyMember {
                user: user.id,
                subreddit: sr.id
            })
        );
        assert!(engine.get_subreddit(sr.id).unwrap().members.contains(&user.id));
        assert!(engine.leave_subreddit(user.id, sr.id).is_ok());
        assert_eq!(
            engine.leave_subreddit(user.id, sr.id),
            Err(EngineError::NotMember {
                user: user.id,
                subreddit: sr.id
            })
        );
        assert!(engine.get_subreddit(sr.id).unwrap().members.is_empty());
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let (engine, _, _) = seeded();
        assert!(engine.user_exists("alice"));
        assert!(!engine.user_exists("Alice"));
        assert!(engine.get_subreddit_by_name("Rust").is_none());
        assert!(engine.get_subreddit_by_name("rust").is_some());
    }

    #[test]
    fn get_post_by_id_returns_first_subreddit_match() {
        let (engine, user, first) = seeded();
        let second = engine.create_subreddit("second");
        engine.create_post(user.id, second.id, "later subreddit", "").unwrap();
        engine.create_post(user.id, first.id, "earlier subreddit", "").unwrap();

        let found = engine.get_post_by_id(PostId::new(1)).unwrap();
        assert_eq!(found.subreddit_id, first.id);
        assert_eq!(found.title, "earlier subreddit");
        assert!(engine.get_post_by_id(PostId::new(2)).is_none());
    }

    #[test]
    fn get_all_posts_orders_by_subreddit_then_post() {
        let (engine, user, a) = seeded();
        let b = engine.create_subreddit("b");
        engine.create_post(user.id, b.id, "b1", "").unwrap();
        engine.create_post(user.id, a.id, "a1", "").unwrap();
        engine.create_post(user.id, a.id, "a2", "").unwrap();

        let titles: Vec<String> = engine.get_all_posts().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn get_feed_for_unknown_subreddit_is_none() {
        let engine = Engine::new();
        assert!(engine.get_feed(SubRedditId::new(1)).is_none());
    }

    #[test]
    fn messages_are_filtered_by_recipient_in_send_order() {
        let engine = Engine::new();
        let a = engine.register_account("a");
        let b = engine.register_account("b");
        engine.send_message(a.id, b.id, "one").unwrap();
        engine.send_message(b.id, a.id, "reply").unwrap();
        engine.send_message(a.id, b.id, "two").unwrap();

        let inbox: Vec<String> = engine
            .get_messages(b.id)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(inbox, vec!["one", "two"]);
        assert_eq!(engine.get_messages(a.id).len(), 1);
    }

    #[test]
    fn send_message_to_unknown_user_fails() {
        let engine = Engine::new();
        let a = engine.register_account("a");
        let ghost = UserId::new(5);
        assert_eq!(
            engine.send_message(a.id, ghost, "hello?"),
            Err(EngineError::UnknownUser(ghost))
        );
        assert_eq!(engine.stats().messages, 0);
    }

    #[test]
    fn stats_count_every_collection() {
        let (engine, user, sr) = seeded();
        let post = engine.create_post(user.id, sr.id, "t", "c").unwrap();
        engine.create_comment(user.id, post.post_ref(), "x").unwrap();
        engine.create_comment(user.id, post.post_ref(), "y").unwrap();
        engine.send_message(user.id, user.id, "note to self").unwrap();

        let stats = engine.stats();
        assert_eq!(
            stats,
            EngineStats {
                users: 1,
                subreddits: 1,
                posts: 1,
                comments: 2,
                messages: 1,
            }
        );
    }
}
