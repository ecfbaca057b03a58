//! Integration tests for the REST endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use agora_api::router::build_router;
use agora_api::state::AppState;
use agora_types::PostId;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

fn make_router() -> (Arc<AppState>, Router) {
    let state = Arc::new(AppState::new());
    let router = build_router(Arc::clone(&state));
    (state, router)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn get_json(router: &Router, path: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

/// Register `alice`, create `rust`, and submit one post; returns the post id.
async fn seed(router: &Router) -> u64 {
    post_json(router, "/api/user", json!({"username": "alice"})).await;
    post_json(router, "/api/subreddit", json!({"name": "rust"})).await;
    let (status, post) = post_json(
        router,
        "/api/rust/submit",
        json!({"title": "Hello", "content": "World", "username": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    post["id"].as_u64().unwrap()
}

// =========================================================================
// Accounts and communities
// =========================================================================

#[tokio::test]
async fn test_login_twice_returns_the_same_user() {
    let (state, router) = make_router();

    let (status, first) = post_json(&router, "/api/user", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], 1);
    assert_eq!(first["karma"], 0);

    let (_, second) = post_json(&router, "/api/user", json!({"username": "alice"})).await;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(state.engine.list_users().len(), 1);
}

#[tokio::test]
async fn test_duplicate_subreddit_is_rejected() {
    let (_, router) = make_router();

    let (status, sr) = post_json(&router, "/api/subreddit", json!({"name": "rust"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sr["name"], "rust");

    let (status, err) = post_json(&router, "/api/subreddit", json!({"name": "rust"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["status"], 400);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (_, router) = make_router();

    let (status, _) = post_json(&router, "/api/user", json!({"name": "wrong-field"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_collection_listings() {
    let (_, router) = make_router();
    seed(&router).await;

    let (status, users) = get_json(&router, "/api/getusers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[0]["username"], "alice");

    let (_, subreddits) = get_json(&router, "/api/getsubreddits").await;
    assert_eq!(subreddits[0]["name"], "rust");
    assert_eq!(subreddits[0]["posts"][0]["title"], "Hello");

    let (_, posts) = get_json(&router, "/api/getposts").await;
    assert_eq!(posts.as_array().unwrap().len(), 1);

    let (_, stats) = get_json(&router, "/api/stats").await;
    assert_eq!(stats["users"], 1);
    assert_eq!(stats["subreddits"], 1);
    assert_eq!(stats["posts"], 1);
}

// =========================================================================
// Content
// =========================================================================

#[tokio::test]
async fn test_submit_then_feed() {
    let (_, router) = make_router();
    let post_id = seed(&router).await;
    assert_eq!(post_id, 1);

    let (status, feed) = get_json(&router, "/api/rust/feed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed.as_array().unwrap().len(), 1);
    assert_eq!(feed[0]["title"], "Hello");
    assert_eq!(feed[0]["votes"], 0);
}

#[tokio::test]
async fn test_submit_to_unknown_subreddit_is_not_found() {
    let (_, router) = make_router();
    post_json(&router, "/api/user", json!({"username": "alice"})).await;

    let (status, err) = post_json(
        &router,
        "/api/nowhere/submit",
        json!({"title": "t", "content": "c", "username": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["status"], 404);
}

#[tokio::test]
async fn test_submit_by_unknown_user_is_not_found() {
    let (_, router) = make_router();
    post_json(&router, "/api/subreddit", json!({"name": "rust"})).await;

    let (status, _) = post_json(
        &router,
        "/api/rust/submit",
        json!({"title": "t", "content": "c", "username": "ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_is_attached_to_the_post() {
    let (state, router) = make_router();
    let post_id = seed(&router).await;

    let (status, comment) = post_json(
        &router,
        &format!("/api/{post_id}/comment"),
        json!({"content": "nice", "username": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["id"], 1);
    assert_eq!(comment["content"], "nice");

    let stored = state.engine.get_post_by_id(PostId::new(post_id)).unwrap();
    assert_eq!(stored.comments.len(), 1);
}

#[tokio::test]
async fn test_comment_with_invalid_post_id_is_bad_request() {
    let (_, router) = make_router();
    seed(&router).await;

    let (status, _) = post_json(
        &router,
        "/api/abc/comment",
        json!({"content": "x", "username": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comment_on_missing_post_is_not_found() {
    let (_, router) = make_router();
    seed(&router).await;

    let (status, _) = post_json(
        &router,
        "/api/99/comment",
        json!({"content": "x", "username": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_votes_move_tally_and_karma() {
    let (state, router) = make_router();
    let post_id = seed(&router).await;
    let path = format!("/api/{post_id}/vote");

    let (status, _) = post_json(&router, &path, json!({"upvote": true})).await;
    assert_eq!(status, StatusCode::OK);
    post_json(&router, &path, json!({"upvote": true})).await;
    post_json(&router, &path, json!({"upvote": false})).await;

    let (_, feed) = get_json(&router, "/api/rust/feed").await;
    assert_eq!(feed[0]["votes"], 1);

    let alice = state.engine.get_user_by_username("alice").unwrap();
    assert_eq!(alice.karma, 1);
}

#[tokio::test]
async fn test_vote_on_missing_post_is_not_found() {
    let (_, router) = make_router();

    let (status, _) = post_json(&router, "/api/7/vote", json!({"upvote": true})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =========================================================================
// Membership
// =========================================================================

#[tokio::test]
async fn test_join_twice_is_bad_request() {
    let (state, router) = make_router();
    seed(&router).await;

    let (status, _) = post_json(&router, "/api/rust/join", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) = post_json(&router, "/api/rust/join", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("already"));

    let sr = state.engine.get_subreddit_by_name("rust").unwrap();
    assert_eq!(sr.members.len(), 1);
}

#[tokio::test]
async fn test_leave_without_membership_is_bad_request() {
    let (_, router) = make_router();
    seed(&router).await;

    let (status, _) = post_json(&router, "/api/rust/leave", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    post_json(&router, "/api/rust/join", json!({"username": "alice"})).await;
    let (status, _) = post_json(&router, "/api/rust/leave", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_join_unknown_subreddit_is_not_found() {
    let (_, router) = make_router();
    post_json(&router, "/api/user", json!({"username": "alice"})).await;

    let (status, _) = post_json(&router, "/api/nowhere/join", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feed_of_unknown_subreddit_is_not_found() {
    let (_, router) = make_router();

    let (status, err) = get_json(&router, "/api/nowhere/feed").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "subreddit not found");
}

// =========================================================================
// Messaging
// =========================================================================

#[tokio::test]
async fn test_message_reaches_recipient_inbox() {
    let (_, router) = make_router();
    post_json(&router, "/api/user", json!({"username": "alice"})).await;
    post_json(&router, "/api/user", json!({"username": "bob"})).await;

    let (status, message) = post_json(
        &router,
        "/api/message",
        json!({"from": "alice", "to": "bob", "content": "hi"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message["id"], 1);

    let (status, inbox) = get_json(&router, "/api/bob/messages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox[0]["content"], "hi");
    assert_eq!(inbox[0]["from"], 1);

    let (_, outbox) = get_json(&router, "/api/alice/messages").await;
    assert!(outbox.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_message_to_unknown_user_is_not_found() {
    let (_, router) = make_router();
    post_json(&router, "/api/user", json!({"username": "alice"})).await;

    let (status, _) = post_json(
        &router,
        "/api/message",
        json!({"from": "alice", "to": "ghost", "content": "hi"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&router, "/api/ghost/messages").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
