//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api_client::DEFAULT_BASE_URL;

/// In-memory forum engine: API server, workload driver, and API client.
#[derive(Parser, Debug)]
#[command(name = "agora", version, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "agora-config.yaml")]
    pub config: PathBuf,

    /// Enable or disable logging, overriding the config file.
    #[arg(long, value_name = "BOOL")]
    pub logging: Option<bool>,

    /// What to run. Defaults to `simulate`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level modes.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the REST API over a fresh engine.
    Serve {
        /// Listen on this port instead of the configured one.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run every configured workload simulation.
    Simulate,

    /// Call a running API server.
    Client {
        /// API root URL.
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// The request to make.
        #[command(subcommand)]
        action: ClientAction,
    },
}

/// One request against the REST API.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Log in or register.
    CreateUser {
        /// Account name.
        username: String,
    },
    /// Create a subreddit.
    CreateSubreddit {
        /// Subreddit name.
        name: String,
    },
    /// Submit a post.
    SubmitPost {
        /// Target subreddit.
        subreddit: String,
        /// Author.
        username: String,
        /// Post title.
        title: String,
        /// Post body.
        content: String,
    },
    /// Comment on a post.
    CreateComment {
        /// Id of the post.
        post_id: String,
        /// Author.
        username: String,
        /// Comment body.
        content: String,
    },
    /// Vote on a post (upvote unless `--down`).
    Vote {
        /// Id of the post.
        post_id: String,
        /// Downvote instead.
        #[arg(long)]
        down: bool,
    },
    /// List all users.
    GetAllUsers,
    /// List all subreddits.
    GetAllSubreddits,
    /// List every post.
    GetAllPosts,
    /// Join a subreddit.
    JoinSubreddit {
        /// Subreddit name.
        subreddit: String,
        /// Joining user.
        username: String,
    },
    /// Leave a subreddit.
    LeaveSubreddit {
        /// Subreddit name.
        subreddit: String,
        /// Leaving user.
        username: String,
    },
    /// Show a subreddit's posts.
    GetFeed {
        /// Subreddit name.
        subreddit: String,
    },
    /// Send a direct message.
    SendMessage {
        /// Sender.
        from: String,
        /// Recipient.
        to: String,
        /// Message body.
        content: String,
    },
    /// Show a user's inbox.
    GetMessages {
        /// Recipient.
        username: String,
    },
}
