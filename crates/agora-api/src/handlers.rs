//! REST endpoint handlers for the request adapter.
//!
//! Every handler resolves the names and ids in the request to live
//! entities *before* calling an engine mutator, because the engine does
//! not check names itself. A resolve-then-mutate pair is two separate
//! engine calls and is not atomic as a pair.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/user` | Login or register by username |
//! | `POST` | `/api/subreddit` | Create a subreddit (name must be new) |
//! | `POST` | `/api/message` | Send a direct message |
//! | `GET` | `/api/getusers` | List all users |
//! | `GET` | `/api/getsubreddits` | List all subreddits |
//! | `GET` | `/api/getposts` | List every post |
//! | `GET` | `/api/stats` | Entity counts |
//! | `POST` | `/api/{subreddit}/submit` | Create a post |
//! | `POST` | `/api/{post_id}/comment` | Comment on a post |
//! | `POST` | `/api/{post_id}/vote` | Up- or down-vote a post |
//! | `POST` | `/api/{subreddit}/join` | Join a subreddit |
//! | `POST` | `/api/{subreddit}/leave` | Leave a subreddit |
//! | `GET` | `/api/{subreddit}/feed` | Posts of a subreddit |
//! | `GET` | `/api/{username}/messages` | Inbox of a user |

use std::sync::Arc;

use agora_types::{Comment, EngineStats, Message, Post, PostId, SubReddit, User};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body naming a user: login, join, and leave.
#[derive(Debug, serde::Deserialize)]
pub struct UsernameRequest {
    /// The acting user's name.
    pub username: String,
}

/// Body for `POST /api/subreddit`.
#[derive(Debug, serde::Deserialize)]
pub struct CreateSubRedditRequest {
    /// Name of the new subreddit.
    pub name: String,
}

/// Body for `POST /api/{subreddit}/submit`.
#[derive(Debug, serde::Deserialize)]
pub struct SubmitPostRequest {
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
    /// Authoring user's name.
    pub username: String,
}

/// Body for `POST /api/{post_id}/comment`.
#[derive(Debug, serde::Deserialize)]
pub struct CreateCommentRequest {
    /// Comment body.
    pub content: String,
    /// Authoring user's name.
    pub username: String,
}

/// Body for `POST /api/{post_id}/vote`.
#[derive(Debug, serde::Deserialize)]
pub struct VoteRequest {
    /// `true` to upvote, `false` to downvote.
    pub upvote: bool,
}

/// Body for `POST /api/message`.
#[derive(Debug, serde::Deserialize)]
pub struct SendMessageRequest {
    /// Sender's username.
    pub from: String,
    /// Recipient's username.
    pub to: String,
    /// Message body.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Accounts and communities
// ---------------------------------------------------------------------------

/// Return the user with this name, registering it first if it is new.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UsernameRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(body) = payload?;

    let user = if let Some(existing) = state.engine.get_user_by_username(&body.username) {
        existing
    } else {
        let user = state.engine.register_account(&body.username);
        debug!(user_id = %user.id, username = body.username, "registered via API");
        user
    };

    Ok(Json(user))
}

/// Create a subreddit. Names already in use are rejected.
pub async fn create_subreddit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSubRedditRequest>, JsonRejection>,
) -> Result<Json<SubReddit>, ApiError> {
    let Json(body) = payload?;

    if state.engine.get_subreddit_by_name(&body.name).is_some() {
        return Err(ApiError::BadRequest(format!(
            "subreddit {} already exists",
            body.name
        )));
    }

    Ok(Json(state.engine.create_subreddit(&body.name)))
}

/// List all users in registration order.
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.engine.list_users())
}

/// List all subreddits in creation order.
pub async fn list_subreddits(State(state): State<Arc<AppState>>) -> Json<Vec<SubReddit>> {
    Json(state.engine.list_subreddits())
}

/// List every post, grouped by subreddit.
pub async fn list_posts(State(state): State<Arc<AppState>>) -> Json<Vec<Post>> {
    Json(state.engine.get_all_posts())
}

/// Entity counts.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<EngineStats> {
    Json(state.engine.stats())
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Create a post in the subreddit named by the path.
pub async fn submit_post(
    State(state): State<Arc<AppState>>,
    Path(subreddit_name): Path<String>,
    payload: Result<Json<SubmitPostRequest>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
    let Json(body) = payload?;

    let subreddit = find_subreddit(&state, &subreddit_name)?;
    let user = find_user(&state, &body.username)?;

    let post = state
        .engine
        .create_post(user.id, subreddit.id, &body.title, &body.content)?;
    Ok(Json(post))
}

/// Comment on the post whose id is in the path.
///
/// The id is resolved with the engine's first-match scan, so when several
/// subreddits hold a post with this id the earliest subreddit wins.
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let post_id = parse_post_id(&post_id)?;
    let Json(body) = payload?;

    let user = find_user(&state, &body.username)?;
    let post = find_post(&state, post_id)?;

    let comment = state
        .engine
        .create_comment(user.id, post.post_ref(), &body.content)?;
    Ok(Json(comment))
}

/// Vote on the post whose id is in the path.
pub async fn vote(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;
    let post_id = parse_post_id(&post_id)?;

    let post = find_post(&state, post_id)?;
    state.engine.vote(post.post_ref(), body.upvote)?;
    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// Join the subreddit named by the path.
pub async fn join_subreddit(
    State(state): State<Arc<AppState>>,
    Path(subreddit_name): Path<String>,
    payload: Result<Json<UsernameRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;

    let user = find_user(&state, &body.username)?;
    let subreddit = find_subreddit(&state, &subreddit_name)?;

    state.engine.join_subreddit(user.id, subreddit.id)?;
    Ok(StatusCode::OK)
}

/// Leave the subreddit named by the path.
pub async fn leave_subreddit(
    State(state): State<Arc<AppState>>,
    Path(subreddit_name): Path<String>,
    payload: Result<Json<UsernameRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;

    let user = find_user(&state, &body.username)?;
    let subreddit = find_subreddit(&state, &subreddit_name)?;

    state.engine.leave_subreddit(user.id, subreddit.id)?;
    Ok(StatusCode::OK)
}

/// The posts of the subreddit named by the path, in creation order.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Path(subreddit_name): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let subreddit = find_subreddit(&state, &subreddit_name)?;
    let posts = state
        .engine
        .get_feed(subreddit.id)
        .ok_or_else(|| ApiError::Internal(format!("subreddit {} vanished", subreddit.id)))?;
    Ok(Json(posts))
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// Send a direct message between two named users.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let Json(body) = payload?;

    let from = find_user(&state, &body.from)?;
    let to = find_user(&state, &body.to)?;

    let message = state.engine.send_message(from.id, to.id, &body.content)?;
    Ok(Json(message))
}

/// The inbox of the user named by the path.
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let user = find_user(&state, &username)?;
    Ok(Json(state.engine.get_messages(user.id)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_user(state: &AppState, username: &str) -> Result<User, ApiError> {
    state
        .engine
        .get_user_by_username(username)
        .ok_or_else(|| ApiError::NotFound(String::from("user not found")))
}

fn find_subreddit(state: &AppState, name: &str) -> Result<SubReddit, ApiError> {
    state
        .engine
        .get_subreddit_by_name(name)
        .ok_or_else(|| ApiError::NotFound(String::from("subreddit not found")))
}

fn find_post(state: &AppState, id: PostId) -> Result<Post, ApiError> {
    state
        .engine
        .get_post_by_id(id)
        .ok_or_else(|| ApiError::NotFound(String::from("post not found")))
}

/// Parse a post id from a path segment, returning an [`ApiError`] on failure.
fn parse_post_id(s: &str) -> Result<PostId, ApiError> {
    s.parse::<PostId>()
        .map_err(|e| ApiError::BadRequest(format!("invalid post ID {s}: {e}")))
}
