//! Concurrent workload driver.
//!
//! Each run builds a fresh engine, registers `user{i}` sessions and `sr{i}`
//! subreddits, then splits the configured activity across `actors`
//! blocking tasks that all hit the same engine:
//!
//! 1. posts, each followed by its comments and coin-flip votes
//! 2. join-or-leave membership toggles
//! 3. direct messages between random users
//!
//! Membership rejections caused by actors racing on the same pair are
//! counted in the report rather than failing the run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use agora_engine::Engine;
use agora_types::{EngineStats, SubReddit};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::client::Client;
use crate::config::SimulationRunConfig;
use crate::error::SimError;

/// Outcome of one workload run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Entity counts after the run.
    pub stats: EngineStats,
    /// Join/leave calls the engine refused.
    pub rejected_memberships: u64,
    /// Wall time of the activity phases plus setup.
    pub elapsed: Duration,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

/// Shared read-only world the actors draw from.
struct Cast {
    clients: Vec<Client>,
    subreddits: Vec<SubReddit>,
}

/// Work assigned to a single actor.
#[derive(Debug, Clone, Copy)]
struct ActorPlan {
    actor: usize,
    posts: usize,
    comments_per_post: usize,
    votes_per_post: usize,
    memberships: usize,
    messages: usize,
}

/// Execute one run and return its report.
///
/// # Errors
///
/// Returns [`SimError::Engine`] if the engine rejects an operation on ids
/// it issued, or [`SimError::Actor`] if an actor task panics.
pub async fn run(config: &SimulationRunConfig) -> Result<SimulationReport, SimError> {
    let started_at = Utc::now();
    let start = Instant::now();
    info!(
        num_users = config.num_users,
        num_subreddits = config.num_subreddits,
        num_posts = config.num_posts,
        num_comments = config.num_comments,
        num_votes = config.num_votes,
        num_messages = config.num_messages,
        num_memberships = config.num_memberships,
        actors = config.actors,
        "starting simulation"
    );

    let engine = Arc::new(Engine::new());
    let cast = Arc::new(populate(&engine, config));

    let mut rejected_memberships: u64 = 0;
    if cast.clients.is_empty() || cast.subreddits.is_empty() {
        info!("no users or no subreddits, skipping activity");
    } else {
        let mut tasks = JoinSet::new();
        for plan in plans(config) {
            let cast = Arc::clone(&cast);
            tasks.spawn_blocking(move || run_actor(&cast, plan));
        }

        while let Some(joined) = tasks.join_next().await {
            let rejected = joined.map_err(|e| SimError::Actor {
                message: e.to_string(),
            })??;
            rejected_memberships = rejected_memberships.saturating_add(rejected);
        }
    }

    let report = SimulationReport {
        stats: engine.stats(),
        rejected_memberships,
        elapsed: start.elapsed(),
        started_at,
    };
    info!(
        users = report.stats.users,
        subreddits = report.stats.subreddits,
        posts = report.stats.posts,
        comments = report.stats.comments,
        messages = report.stats.messages,
        rejected_memberships = report.rejected_memberships,
        elapsed_ms = report.elapsed.as_millis(),
        "simulation completed"
    );
    Ok(report)
}

/// Register the users and create the subreddits for a run.
fn populate(engine: &Arc<Engine>, config: &SimulationRunConfig) -> Cast {
    let clients = (0..config.num_users)
        .map(|i| {
            let client = Client::new(Arc::clone(engine), &format!("user{i}"));
            debug!(username = client.user().username, "created user");
            client
        })
        .collect();

    let subreddits = (0..config.num_subreddits)
        .map(|i| {
            let sr = engine.create_subreddit(&format!("sr{i}"));
            debug!(subreddit = sr.name, "created subreddit");
            sr
        })
        .collect();

    Cast {
        clients,
        subreddits,
    }
}

/// Split the run's totals across its actors. At least one actor runs.
fn plans(config: &SimulationRunConfig) -> Vec<ActorPlan> {
    let actors = config.actors.max(1);
    (0..actors)
        .map(|actor| ActorPlan {
            actor,
            posts: share(config.num_posts, actors, actor),
            comments_per_post: config.num_comments,
            votes_per_post: config.num_votes,
            memberships: share(config.num_memberships, actors, actor),
            messages: share(config.num_messages, actors, actor),
        })
        .collect()
}

/// The part of `total` that actor `index` of `actors` handles.
///
/// The first `total % actors` actors take one extra item so the shares sum
/// to `total`.
fn share(total: usize, actors: usize, index: usize) -> usize {
    let base = total.checked_div(actors).unwrap_or(0);
    let remainder = total.checked_rem(actors).unwrap_or(0);
    if index < remainder {
        base.saturating_add(1)
    } else {
        base
    }
}

/// Run one actor's plan to completion. Returns its membership rejections.
fn run_actor(cast: &Cast, plan: ActorPlan) -> Result<u64, SimError> {
    let mut rng = rand::rng();
    let mut rejected: u64 = 0;

    for i in 0..plan.posts {
        let (Some(author), Some(sr)) = (
            cast.clients.choose(&mut rng),
            cast.subreddits.choose(&mut rng),
        ) else {
            return Ok(rejected);
        };
        let post = author.create_post(sr.id, &format!("Post {}-{i}", plan.actor), "Content")?;
        debug!(
            username = author.user().username,
            subreddit = sr.name,
            title = post.title,
            "created post"
        );

        for j in 0..plan.comments_per_post {
            if let Some(commenter) = cast.clients.choose(&mut rng) {
                let comment = commenter.create_comment(post.post_ref(), &format!("Comment {j}"))?;
                debug!(
                    username = commenter.user().username,
                    post = %post.post_ref(),
                    comment_id = %comment.id,
                    "commented on post"
                );
            }
        }

        for _ in 0..plan.votes_per_post {
            if let Some(voter) = cast.clients.choose(&mut rng) {
                let upvote = rng.random_bool(0.5);
                voter.vote(post.post_ref(), upvote)?;
                debug!(
                    username = voter.user().username,
                    post = %post.post_ref(),
                    upvote,
                    "voted on post"
                );
            }
        }
    }

    for _ in 0..plan.memberships {
        let (Some(client), Some(sr)) = (
            cast.clients.choose(&mut rng),
            cast.subreddits.choose(&mut rng),
        ) else {
            break;
        };
        match client.toggle_membership(sr.id) {
            Ok(member) => debug!(
                username = client.user().username,
                subreddit = sr.name,
                member,
                "toggled membership"
            ),
            Err(e) if !e.is_precondition_violation() => {
                debug!(error = %e, "membership rejected");
                rejected = rejected.saturating_add(1);
            }
            Err(e) => return Err(e.into()),
        }
    }

    for i in 0..plan.messages {
        let (Some(from), Some(to)) = (
            cast.clients.choose(&mut rng),
            cast.clients.choose(&mut rng),
        ) else {
            break;
        };
        let message = from.send_message(to.user().id, &format!("Message {}-{i}", plan.actor))?;
        debug!(
            from = from.user().username,
            to = to.user().username,
            message_id = %message.id,
            "sent message"
        );
    }

    Ok(rejected)
}
