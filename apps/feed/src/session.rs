use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{info, warn};

use pulseboard_application::{
    ActivityFeed, AutoRefresh, ClearOutcome, LoadOutcome, MIN_REFRESH_INTERVAL,
};
use pulseboard_core::{AppError, AppResult};

use crate::commands::{FeedCommand, HELP_TEXT};

/// What the terminal loop does after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    Render,
    Message(String),
    Quit,
}

/// Interactive session driving one mounted feed.
pub struct FeedSession {
    feed: Arc<ActivityFeed>,
    refreshed: Arc<Notify>,
    refresh_interval: Duration,
    auto_refresh: Option<AutoRefresh>,
}

impl FeedSession {
    pub fn new(feed: Arc<ActivityFeed>, refreshed: Arc<Notify>) -> Self {
        let refresh_interval = feed.config().refresh_interval;
        Self {
            feed,
            refreshed,
            refresh_interval,
            auto_refresh: None,
        }
    }

    pub fn feed(&self) -> &Arc<ActivityFeed> {
        &self.feed
    }

    pub fn auto_refresh_running(&self) -> bool {
        self.auto_refresh
            .as_ref()
            .is_some_and(AutoRefresh::is_running)
    }

    /// Mounts the feed and starts the timer when the configuration asks for it.
    pub async fn start(&mut self) -> AppResult<LoadOutcome> {
        let outcome = self.feed.mount().await?;
        if self.feed.config().auto_refresh {
            self.enable_auto_refresh()?;
        }
        Ok(outcome)
    }

    pub async fn execute(&mut self, command: FeedCommand) -> AppResult<SessionReply> {
        match command {
            FeedCommand::More => {
                if self.feed.load_more().await? == LoadOutcome::Skipped {
                    return Ok(SessionReply::Message(
                        "nothing more to load right now".to_owned(),
                    ));
                }
            }
            FeedCommand::Refresh => {
                self.feed.refresh().await?;
            }
            FeedCommand::Retry => {
                self.feed.retry().await?;
            }
            FeedCommand::Clear => {
                if self.feed.clear_all().await? == ClearOutcome::Skipped {
                    return Ok(SessionReply::Message("clear already in progress".to_owned()));
                }
            }
            FeedCommand::Cancel => self.feed.cancel_clear().await,
            FeedCommand::Action(action) => {
                self.feed.set_action_filter(action).await?;
            }
            FeedCommand::ResourceType(resource_type) => {
                self.feed.set_resource_type_filter(resource_type).await?;
            }
            FeedCommand::AutoRefresh(true) => {
                self.enable_auto_refresh()?;
                return Ok(SessionReply::Message(format!(
                    "auto-refresh every {} ms",
                    self.refresh_interval.as_millis()
                )));
            }
            FeedCommand::AutoRefresh(false) => {
                self.disable_auto_refresh();
                return Ok(SessionReply::Message("auto-refresh off".to_owned()));
            }
            FeedCommand::Interval(interval) => {
                self.change_interval(interval)?;
                return Ok(SessionReply::Message(format!(
                    "refresh interval set to {} ms",
                    interval.as_millis()
                )));
            }
            FeedCommand::Help => return Ok(SessionReply::Message(HELP_TEXT.to_owned())),
            FeedCommand::Quit => {
                self.shutdown().await;
                return Ok(SessionReply::Quit);
            }
        }

        Ok(SessionReply::Render)
    }

    /// Stops the timer and unmounts the feed.
    pub async fn shutdown(&mut self) {
        self.disable_auto_refresh();
        self.feed.unmount().await;
    }

    fn enable_auto_refresh(&mut self) -> AppResult<()> {
        if self.auto_refresh_running() {
            return Ok(());
        }

        self.auto_refresh = Some(AutoRefresh::start(
            self.feed.clone(),
            self.refresh_interval,
            self.refreshed.clone(),
        )?);
        info!(
            interval_ms = self.refresh_interval.as_millis(),
            "auto-refresh enabled"
        );
        Ok(())
    }

    fn disable_auto_refresh(&mut self) {
        if let Some(mut auto_refresh) = self.auto_refresh.take() {
            auto_refresh.stop();
            info!("auto-refresh disabled");
        }
    }

    fn change_interval(&mut self, interval: Duration) -> AppResult<()> {
        if interval < MIN_REFRESH_INTERVAL {
            warn!(
                interval_ms = interval.as_millis(),
                "rejected refresh interval"
            );
            return Err(AppError::Validation(format!(
                "refresh interval must be at least {} ms",
                MIN_REFRESH_INTERVAL.as_millis()
            )));
        }

        if let Some(auto_refresh) = self.auto_refresh.as_mut() {
            auto_refresh.set_interval(interval)?;
        }
        self.refresh_interval = interval;
        Ok(())
    }
}
