//! `agora` binary: serves the REST API, drives the engine with concurrent
//! simulated users, or calls a running server.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration from `agora-config.yaml` (defaults if missing)
//! 3. Initialize structured logging (tracing)
//! 4. Dispatch to `serve`, `simulate` (the default), or `client`

mod api_client;
mod cli;
mod client;
mod config;
mod error;
mod logging;
mod simulator;

use std::sync::Arc;

use agora_api::AppState;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::api_client::ApiClient;
use crate::cli::{Args, ClientAction, Command};
use crate::config::AgoraConfig;
use crate::error::SimError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, or the selected
/// subcommand fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Parse arguments.
    let args = Args::parse();
    run(args).await?;
    Ok(())
}

/// Load configuration, install logging, and run the selected subcommand.
async fn run(args: Args) -> Result<(), SimError> {
    // 2. Load configuration.
    let mut config = AgoraConfig::load_or_default(&args.config)?;
    if let Some(enabled) = args.logging {
        config.logging.enabled = enabled;
    }

    // 3. Initialize structured logging.
    logging::init(&config.logging)?;
    info!(
        config = %args.config.display(),
        simulations = config.simulations.len(),
        "agora starting"
    );

    // 4. Dispatch.
    match args.command.unwrap_or(Command::Simulate) {
        Command::Serve { port } => serve(&config, port).await?,
        Command::Simulate => simulate(&config).await?,
        Command::Client { base_url, action } => {
            let api = ApiClient::new(&base_url);
            info!(base_url = api.base_url(), "calling API");
            let output = run_client(&api, action).await?;
            println!("{output}");
        }
    }

    Ok(())
}

/// Serve the REST API until Ctrl-C.
async fn serve(config: &AgoraConfig, port: Option<u16>) -> Result<(), SimError> {
    let mut server = config.server.to_server_config();
    if let Some(port) = port {
        server.port = port;
    }
    agora_api::start_server(&server, Arc::new(AppState::new())).await?;
    Ok(())
}

/// Run every configured simulation in order and print a summary of each.
async fn simulate(config: &AgoraConfig) -> Result<(), SimError> {
    println!(
        "Loaded {} simulations from config.",
        config.simulations.len()
    );

    for (index, run) in (1_usize..).zip(&config.simulations) {
        println!("\nRunning simulation #{index} with parameters: {run:?}");
        let report = simulator::run(run).await?;

        println!(
            "Simulation #{index} started at {} and completed in {:?}",
            report.started_at.to_rfc3339(),
            report.elapsed
        );
        println!("Users: {}", report.stats.users);
        println!("SubReddits: {}", report.stats.subreddits);
        println!("Posts: {}", report.stats.posts);
        println!("Comments: {}", report.stats.comments);
        println!("Messages: {}", report.stats.messages);
        println!("Rejected memberships: {}", report.rejected_memberships);
        println!("-------------------------------");
    }

    Ok(())
}

/// Perform one client request and render the response for printing.
async fn run_client(api: &ApiClient, action: ClientAction) -> Result<String, SimError> {
    match action {
        ClientAction::CreateUser { username } => pretty(&api.create_user(&username).await?),
        ClientAction::CreateSubreddit { name } => pretty(&api.create_subreddit(&name).await?),
        ClientAction::SubmitPost {
            subreddit,
            username,
            title,
            content,
        } => pretty(
            &api
                .submit_post(&subreddit, &username, &title, &content)
                .await?,
        ),
        ClientAction::CreateComment {
            post_id,
            username,
            content,
        } => pretty(&api.create_comment(&post_id, &username, &content).await?),
        ClientAction::Vote { post_id, down } => {
            api.vote(&post_id, !down).await?;
            Ok(String::from("Vote successful!"))
        }
        ClientAction::GetAllUsers => pretty(&api.get_all_users().await?),
        ClientAction::GetAllSubreddits => pretty(&api.get_all_subreddits().await?),
        ClientAction::GetAllPosts => pretty(&api.get_all_posts().await?),
        ClientAction::JoinSubreddit {
            subreddit,
            username,
        } => {
            api.join_subreddit(&subreddit, &username).await?;
            Ok(format!("{username} joined {subreddit}"))
        }
        ClientAction::LeaveSubreddit {
            subreddit,
            username,
        } => {
            api.leave_subreddit(&subreddit, &username).await?;
            Ok(format!("{username} left {subreddit}"))
        }
        ClientAction::GetFeed { subreddit } => pretty(&api.get_feed(&subreddit).await?),
        ClientAction::SendMessage { from, to, content } => {
            pretty(&api.send_message(&from, &to, &content).await?)
        }
        ClientAction::GetMessages { username } => pretty(&api.get_messages(&username).await?),
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<String, SimError> {
    Ok(serde_json::to_string_pretty(value)?)
}
