//! Shared type definitions for the Agora forum simulation.
//!
//! This crate is the single source of truth for the entity records and
//! identifiers used across the workspace. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for browser clients of the
//! request adapter.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for all entity identifiers
//! - [`records`] -- Entity records (users, subreddits, posts, comments, messages)

pub mod ids;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use ids::{CommentId, MessageId, PostId, SubRedditId, UserId};
pub use records::{Comment, EngineStats, Message, Post, PostRef, SubReddit, User};
