//! HTTP request adapter for the Agora forum engine.
//!
//! This crate exposes an [`Engine`](agora_engine::Engine) over a JSON REST
//! API built on Axum. Handlers translate usernames, subreddit names, and
//! path-encoded post ids into engine identities, then call the matching
//! engine operation.
//!
//! # Status codes
//!
//! - `404` when a named user, subreddit, or post does not exist
//! - `400` for malformed bodies or ids, duplicate subreddit names, and
//!   membership rule violations
//! - `500` if the engine rejects a reference the adapter already resolved
//!
//! Error bodies are `{"error": <message>, "status": <code>}`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
