use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use pulseboard_core::{AppError, AppResult};

use crate::activity_feed::{ActivityFeed, LoadOutcome};
use crate::feed_config::MIN_REFRESH_INTERVAL;

/// Periodic replacing reload of page one for a mounted feed.
///
/// The timer task is aborted when the handle is stopped or dropped, and
/// exits on its own once the feed is unmounted.
pub struct AutoRefresh {
    feed: Arc<ActivityFeed>,
    refreshed: Arc<Notify>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    /// Starts refreshing `feed` every `interval`.
    ///
    /// `refreshed` is notified after every applied or failed reload.
    pub fn start(
        feed: Arc<ActivityFeed>,
        interval: Duration,
        refreshed: Arc<Notify>,
    ) -> AppResult<Self> {
        validate_interval(interval)?;

        let mut auto_refresh = Self {
            feed,
            refreshed,
            interval,
            task: None,
        };
        auto_refresh.spawn();
        Ok(auto_refresh)
    }

    /// Returns the current refresh period.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns whether the timer task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Replaces the refresh period. The old timer is canceled first.
    pub fn set_interval(&mut self, interval: Duration) -> AppResult<()> {
        validate_interval(interval)?;
        if interval == self.interval && self.is_running() {
            return Ok(());
        }

        self.stop();
        self.interval = interval;
        self.spawn();
        Ok(())
    }

    /// Cancels the timer task.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("auto-refresh stopped");
        }
    }

    fn spawn(&mut self) {
        let feed = self.feed.clone();
        let refreshed = self.refreshed.clone();
        let period = self.interval;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                if !feed.is_mounted().await {
                    debug!("feed unmounted, auto-refresh exiting");
                    break;
                }

                if feed.is_loading().await {
                    debug!("load in flight, skipping auto-refresh tick");
                    continue;
                }

                match feed.refresh().await {
                    Ok(LoadOutcome::Applied | LoadOutcome::Failed) => refreshed.notify_one(),
                    Ok(LoadOutcome::Discarded | LoadOutcome::Skipped) => {}
                    Err(error) => warn!(error = %error, "auto-refresh load rejected"),
                }
            }
        }));
        debug!(interval_ms = period.as_millis(), "auto-refresh started");
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}

fn validate_interval(interval: Duration) -> AppResult<()> {
    if interval < MIN_REFRESH_INTERVAL {
        return Err(AppError::Validation(format!(
            "refresh interval must be at least {} ms",
            MIN_REFRESH_INTERVAL.as_millis()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::{Mutex, Notify};

    use pulseboard_core::{AppResult, ProjectId};

    use crate::activity_ports::{ActivityPage, ActivityQuery, ActivityRepository};
    use crate::feed_config::FeedConfig;
    use crate::ActivityFeed;

    use super::AutoRefresh;

    #[derive(Default)]
    struct CountingRepository {
        offsets: Mutex<Vec<usize>>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl ActivityRepository for CountingRepository {
        async fn list_activities(&self, query: ActivityQuery) -> AppResult<ActivityPage> {
            self.offsets.lock().await.push(query.offset);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(ActivityPage::default())
        }

        async fn clear_activities(&self, _project_id: &ProjectId) -> AppResult<()> {
            Ok(())
        }
    }

    fn mounted_feed(repository: Arc<CountingRepository>) -> Arc<ActivityFeed> {
        let project_id = ProjectId::new("P1").unwrap_or_else(|_| panic!("valid project id"));
        Arc::new(
            ActivityFeed::new(repository, FeedConfig::new(project_id))
                .unwrap_or_else(|_| panic!("valid feed config")),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_page_one_on_each_tick_until_dropped() {
        let repository = Arc::new(CountingRepository::default());
        let feed = mounted_feed(repository.clone());
        let _ = feed.mount().await;

        let auto_refresh = AutoRefresh::start(
            feed.clone(),
            Duration::from_secs(30),
            Arc::new(Notify::new()),
        )
        .unwrap_or_else(|_| panic!("valid interval"));
        assert!(auto_refresh.is_running());

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(*repository.offsets.lock().await, vec![0, 0, 0, 0]);

        drop(auto_refresh);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(repository.offsets.lock().await.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn skips_ticks_while_a_load_is_in_flight() {
        let gate = Arc::new(Notify::new());
        let repository = Arc::new(CountingRepository {
            offsets: Mutex::new(Vec::new()),
            gate: Some(gate.clone()),
        });
        let feed = mounted_feed(repository.clone());

        let pending_mount = tokio::spawn({
            let feed = feed.clone();
            async move { feed.mount().await }
        });
        let _auto_refresh = AutoRefresh::start(
            feed.clone(),
            Duration::from_secs(10),
            Arc::new(Notify::new()),
        )
        .unwrap_or_else(|_| panic!("valid interval"));

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(repository.offsets.lock().await.len(), 1);

        gate.notify_one();
        let _ = pending_mount.await;
        assert!(!feed.is_loading().await);
    }

    #[tokio::test(start_paused = true)]
    async fn changing_interval_replaces_timer() {
        let repository = Arc::new(CountingRepository::default());
        let feed = mounted_feed(repository.clone());
        let _ = feed.mount().await;

        let mut auto_refresh = AutoRefresh::start(
            feed.clone(),
            Duration::from_secs(60),
            Arc::new(Notify::new()),
        )
        .unwrap_or_else(|_| panic!("valid interval"));
        tokio::time::sleep(Duration::from_secs(30)).await;

        let changed = auto_refresh.set_interval(Duration::from_secs(5));
        assert!(changed.is_ok());
        assert_eq!(auto_refresh.interval(), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(repository.offsets.lock().await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_exits_after_unmount() {
        let repository = Arc::new(CountingRepository::default());
        let feed = mounted_feed(repository.clone());
        let _ = feed.mount().await;

        let auto_refresh = AutoRefresh::start(
            feed.clone(),
            Duration::from_secs(5),
            Arc::new(Notify::new()),
        )
        .unwrap_or_else(|_| panic!("valid interval"));
        feed.unmount().await;

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!auto_refresh.is_running());
        assert_eq!(repository.offsets.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn sub_second_interval_is_rejected() {
        let feed = mounted_feed(Arc::new(CountingRepository::default()));
        let result = AutoRefresh::start(feed, Duration::from_millis(10), Arc::new(Notify::new()));
        assert!(result.is_err());
    }
}
