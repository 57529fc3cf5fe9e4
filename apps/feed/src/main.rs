//! Pulseboard terminal activity feed.

#![forbid(unsafe_code)]

mod commands;
mod demo_seed;
mod feed_app_config;
mod render;
mod session;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pulseboard_application::{ActivityFeed, ActivityRepository};
use pulseboard_core::{AppError, AppResult};
use pulseboard_infrastructure::{HttpActivityRepository, InMemoryActivityRepository};

use crate::commands::{FeedCommand, HELP_TEXT};
use crate::feed_app_config::FeedAppConfig;
use crate::render::FeedRenderer;
use crate::session::{FeedSession, SessionReply};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = FeedAppConfig::load()?;
    let repository = build_repository(&config).await?;
    let feed = Arc::new(ActivityFeed::new(repository, config.feed.clone())?);
    let refreshed = Arc::new(Notify::new());
    let renderer = FeedRenderer::new(config.feed.show_title, config.feed.show_clear_button);

    let mut session = FeedSession::new(feed, refreshed.clone());
    session.start().await?;

    info!(
        project_id = %config.feed.project_id,
        api_base_url = %config.api_base_url,
        demo = config.demo,
        limit = config.feed.limit,
        auto_refresh = session.auto_refresh_running(),
        "pulseboard-feed started"
    );

    print_snapshot(session.feed(), &renderer).await;
    println!("{HELP_TEXT}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|error| {
                    AppError::Internal(format!("failed to read command input: {error}"))
                })?;
                let Some(line) = line else {
                    session.shutdown().await;
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match handle_line(&mut session, line.as_str()).await {
                    Ok(SessionReply::Render) => print_snapshot(session.feed(), &renderer).await,
                    Ok(SessionReply::Message(message)) => println!("{message}"),
                    Ok(SessionReply::Quit) => break,
                    Err(error) => {
                        warn!(error = %error, "command rejected");
                        println!("error: {error}");
                    }
                }
            }
            () = refreshed.notified() => print_snapshot(session.feed(), &renderer).await,
        }
    }

    info!("pulseboard-feed stopped");
    Ok(())
}

async fn handle_line(session: &mut FeedSession, line: &str) -> AppResult<SessionReply> {
    let command = FeedCommand::parse(line)?;
    session.execute(command).await
}

async fn build_repository(config: &FeedAppConfig) -> AppResult<Arc<dyn ActivityRepository>> {
    if config.demo {
        let repository = InMemoryActivityRepository::new();
        demo_seed::run(&repository, &config.feed.project_id).await?;
        return Ok(Arc::new(repository));
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    Ok(Arc::new(HttpActivityRepository::new(
        http_client,
        config.api_base_url.as_str(),
        config.api_token.clone(),
    )?))
}

async fn print_snapshot(feed: &ActivityFeed, renderer: &FeedRenderer) {
    let snapshot = feed.snapshot().await;
    print!("\n{}", renderer.render(&snapshot, Utc::now()));
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
