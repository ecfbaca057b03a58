//! Axum router construction for the request adapter.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for browser clients.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// Collection routes live directly under `/api`. Routes of the form
/// `/api/{scope}/<action>` share one path parameter; depending on the
/// action it names a subreddit, a post id, or a username:
///
/// - `POST /api/user` -- login or register
/// - `POST /api/subreddit` -- create a subreddit
/// - `POST /api/message` -- send a direct message
/// - `GET /api/getusers`, `/api/getsubreddits`, `/api/getposts`, `/api/stats`
/// - `POST /api/{subreddit}/submit`, `/join`, `/leave`; `GET /api/{subreddit}/feed`
/// - `POST /api/{post_id}/comment`, `/vote`
/// - `GET /api/{username}/messages`
///
/// CORS allows any origin, method, and header.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Collections
        .route("/api/user", post(handlers::create_user))
        .route("/api/subreddit", post(handlers::create_subreddit))
        .route("/api/message", post(handlers::send_message))
        .route("/api/getusers", get(handlers::list_users))
        .route("/api/getsubreddits", get(handlers::list_subreddits))
        .route("/api/getposts", get(handlers::list_posts))
        .route("/api/stats", get(handlers::stats))
        // Scoped actions
        .route("/api/{scope}/submit", post(handlers::submit_post))
        .route("/api/{scope}/comment", post(handlers::create_comment))
        .route("/api/{scope}/vote", post(handlers::vote))
        .route("/api/{scope}/join", post(handlers::join_subreddit))
        .route("/api/{scope}/leave", post(handlers::leave_subreddit))
        .route("/api/{scope}/feed", get(handlers::get_feed))
        .route("/api/{scope}/messages", get(handlers::get_messages))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
