//! In-memory data engine for the Agora forum simulation.
//!
//! The [`Engine`] owns every entity -- users, subreddits, posts, comments,
//! and direct messages -- assigns their identities, and serializes all
//! access behind a single exclusive lock.
//!
//! # Architecture
//!
//! One `Mutex` guards one aggregate world record. Every operation, read or
//! write, holds it for its whole duration, which makes each operation
//! atomic on its own (a vote moves the post tally and the author's karma
//! together) without offering transactions across operations.
//!
//! # Identities
//!
//! | Entity | Scope | Assigned as |
//! |--------|-------|-------------|
//! | User | global | users + 1 |
//! | Subreddit | global | subreddits + 1 |
//! | Post | owning subreddit | posts in subreddit + 1 |
//! | Comment | owning post | comments on post + 1 |
//! | Message | global | messages + 1 |
//!
//! Post identities repeat across subreddits; [`PostRef`] pairs a post with
//! its subreddit. [`Engine::get_post_by_id`] resolves a bare post identity
//! to the first match in subreddit creation order and is ambiguous by
//! construction.
//!
//! # Caller contract
//!
//! The engine does not enforce name uniqueness. Callers that need unique
//! user or subreddit names check [`Engine::user_exists`] or
//! [`Engine::get_subreddit_by_name`] before creating.
//!
//! # Usage
//!
//! ```
//! use agora_engine::Engine;
//!
//! let engine = Engine::new();
//! let alice = engine.register_account("alice");
//! let rust = engine.create_subreddit("rust");
//!
//! let post = engine.create_post(alice.id, rust.id, "Hello", "First post").ok();
//! assert!(post.is_some());
//!
//! if let Some(post) = post {
//!     assert!(engine.vote(post.post_ref(), true).is_ok());
//! }
//! assert_eq!(engine.get_user(alice.id).map(|u| u.karma), Some(1));
//! ```
//!
//! [`PostRef`]: agora_types::PostRef

pub mod engine;
pub mod error;
mod world;

pub use engine::Engine;
pub use error::EngineError;
