use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pulseboard_core::{AppError, AppResult};
use pulseboard_domain::{ActivityAction, ResourceType};

use crate::activity_ports::{ActivityPage, ActivityQuery, ActivityRepository};
use crate::feed_config::{ActionFilterStrategy, FeedConfig};

mod state;


pub use state::{FeedFailure, FeedFooter, FeedSnapshot};

use state::FeedState;

/// Result of one page load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced or extended the displayed entries.
    Applied,
    /// The request failed and the failure was recorded.
    Failed,
    /// The response belonged to superseded filters or an unmounted feed.
    Discarded,
    /// No request was issued.
    Skipped,
}

/// Result of one clear-all invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// First step: confirmation armed, nothing deleted.
    Armed,
    /// Second step succeeded; the feed is empty.
    Cleared,
    /// Second step failed; the feed is unchanged.
    Failed,
    /// A clear request is already in flight.
    Skipped,
}

/// Paginated, filterable activity stream for one project.
///
/// State sits behind an async mutex that is never held across a backend
/// call, so a manual refresh and a timer refresh can overlap. The later
/// response wins.
pub struct ActivityFeed {
    repository: Arc<dyn ActivityRepository>,
    config: FeedConfig,
    state: Mutex<FeedState>,
}

impl ActivityFeed {
    /// Creates an unmounted feed after validating its configuration.
    pub fn new(repository: Arc<dyn ActivityRepository>, config: FeedConfig) -> AppResult<Self> {
        config.validate()?;

        Ok(Self {
            repository,
            config,
            state: Mutex::new(FeedState::new()),
        })
    }

    /// Returns the embedding configuration.
    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Mounts the feed and issues the initial page load.
    pub async fn mount(&self) -> AppResult<LoadOutcome> {
        {
            let mut state = self.state.lock().await;
            if state.mounted {
                return Ok(LoadOutcome::Skipped);
            }
            state.mounted = true;
        }

        info!(project_id = %self.config.project_id, "activity feed mounted");
        self.load_page(1, false).await
    }

    /// Unmounts the feed. Responses resolving afterwards are dropped.
    pub async fn unmount(&self) {
        let mut state = self.state.lock().await;
        state.mounted = false;
        state.invalidate_in_flight();
        info!(project_id = %self.config.project_id, "activity feed unmounted");
    }

    /// Returns whether the feed is mounted.
    pub async fn is_mounted(&self) -> bool {
        self.state.lock().await.mounted
    }

    /// Returns whether a replacing or appending load is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading()
    }

    /// Returns a copy of the current state for rendering.
    pub async fn snapshot(&self) -> FeedSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Loads page `page_number` and replaces or appends the displayed entries.
    ///
    /// Backend failures are recorded as [`FeedFailure::LoadFailed`] and leave
    /// previously displayed entries in place. Only invalid input is returned
    /// as an error.
    pub async fn load_page(&self, page_number: usize, append: bool) -> AppResult<LoadOutcome> {
        if page_number == 0 {
            return Err(AppError::Validation(
                "page number must be at least 1".to_owned(),
            ));
        }

        let (query, generation, action_filter) = {
            let mut state = self.state.lock().await;
            if !state.mounted {
                return Ok(LoadOutcome::Skipped);
            }

            state.begin_load(append);
            if state.failure == Some(FeedFailure::LoadFailed) {
                state.failure = None;
            }
            (
                self.build_query(&state, page_number),
                state.generation,
                state.action_filter,
            )
        };

        debug!(
            project_id = %query.project_id,
            limit = query.limit,
            offset = query.offset,
            append,
            "loading activity page"
        );
        let result = self.repository.list_activities(query).await;

        let mut state = self.state.lock().await;
        if !state.mounted || state.generation != generation {
            debug!(page_number, "discarding superseded activity page");
            return Ok(LoadOutcome::Discarded);
        }
        state.finish_load(append);

        match result {
            Ok(page) => {
                self.apply_page(&mut state, page, page_number, append, action_filter);
                Ok(LoadOutcome::Applied)
            }
            Err(error) => {
                warn!(
                    project_id = %self.config.project_id,
                    page_number,
                    error = %error,
                    "failed to load activity page"
                );
                state.failure = Some(FeedFailure::LoadFailed);
                state.last_failed_load = Some((page_number, append));
                Ok(LoadOutcome::Failed)
            }
        }
    }

    /// Reloads page one, replacing the displayed entries.
    pub async fn refresh(&self) -> AppResult<LoadOutcome> {
        self.load_page(1, false).await
    }

    /// Appends the next page while more entries exist.
    ///
    /// Ignored while another append is in flight.
    pub async fn load_more(&self) -> AppResult<LoadOutcome> {
        let next_page = {
            let state = self.state.lock().await;
            if state.appends_in_flight > 0 || state.entries.len() >= state.total {
                return Ok(LoadOutcome::Skipped);
            }
            state.page.saturating_add(1)
        };

        self.load_page(next_page, true).await
    }

    /// Repeats the last failed load, or refreshes when nothing failed.
    pub async fn retry(&self) -> AppResult<LoadOutcome> {
        let last_failed_load = self.state.lock().await.last_failed_load;
        match last_failed_load {
            Some((page_number, append)) => self.load_page(page_number, append).await,
            None => self.refresh().await,
        }
    }

    /// Two-step destructive clear of the project's activity log.
    ///
    /// The first call only arms the confirmation. The second call, while
    /// armed, deletes every entry on the backend and empties the feed.
    pub async fn clear_all(&self) -> AppResult<ClearOutcome> {
        if !self.config.show_clear_button {
            return Err(AppError::Validation(
                "clearing activity is disabled for this feed".to_owned(),
            ));
        }

        {
            let mut state = self.state.lock().await;
            if state.clearing {
                return Ok(ClearOutcome::Skipped);
            }
            if !state.clear_armed {
                state.clear_armed = true;
                if state.failure == Some(FeedFailure::ClearFailed) {
                    state.failure = None;
                }
                return Ok(ClearOutcome::Armed);
            }
            state.clearing = true;
        }

        let result = self
            .repository
            .clear_activities(&self.config.project_id)
            .await;

        let mut state = self.state.lock().await;
        state.clear_armed = false;
        state.clearing = false;

        match result {
            Ok(()) => {
                info!(project_id = %self.config.project_id, "cleared project activity");
                state.entries.clear();
                state.total = 0;
                state.page = 1;
                state.failure = None;
                state.last_failed_load = None;
                state.invalidate_in_flight();
                Ok(ClearOutcome::Cleared)
            }
            Err(error) => {
                warn!(
                    project_id = %self.config.project_id,
                    error = %error,
                    "failed to clear project activity"
                );
                state.failure = Some(FeedFailure::ClearFailed);
                Ok(ClearOutcome::Failed)
            }
        }
    }

    /// Disarms a pending clear confirmation.
    pub async fn cancel_clear(&self) {
        self.state.lock().await.clear_armed = false;
    }

    /// Changes the action filter and reloads from page one.
    pub async fn set_action_filter(
        &self,
        action: Option<ActivityAction>,
    ) -> AppResult<LoadOutcome> {
        {
            let mut state = self.state.lock().await;
            if state.action_filter == action {
                return Ok(LoadOutcome::Skipped);
            }
            state.action_filter = action;
            state.reset_for_new_filters();
        }

        self.load_page(1, false).await
    }

    /// Changes the UI resource type filter and reloads from page one.
    pub async fn set_resource_type_filter(
        &self,
        resource_type: Option<ResourceType>,
    ) -> AppResult<LoadOutcome> {
        {
            let mut state = self.state.lock().await;
            if state.resource_type_filter == resource_type {
                return Ok(LoadOutcome::Skipped);
            }
            state.resource_type_filter = resource_type;
            state.reset_for_new_filters();
        }

        self.load_page(1, false).await
    }

    fn build_query(&self, state: &FeedState, page_number: usize) -> ActivityQuery {
        let offset = (page_number - 1).saturating_mul(self.config.limit);
        let action = match self.config.action_filter_strategy {
            ActionFilterStrategy::Server => state.action_filter,
            ActionFilterStrategy::ClientPage => None,
        };

        ActivityQuery {
            project_id: self.config.project_id.clone(),
            limit: self.config.limit,
            offset,
            user_id: self.config.user_id.clone(),
            resource_type: state.resource_type_filter.or(self.config.resource_type),
            action,
        }
    }

    fn apply_page(
        &self,
        state: &mut FeedState,
        page: ActivityPage,
        page_number: usize,
        append: bool,
        action_filter: Option<ActivityAction>,
    ) {
        let ActivityPage {
            mut activities,
            total,
        } = page;

        if let Some(action) = action_filter {
            activities.retain(|entry| entry.action() == action);
        }

        state.total = match (action_filter, self.config.action_filter_strategy) {
            (Some(_), ActionFilterStrategy::ClientPage) => activities.len(),
            _ => total,
        };

        if append {
            let known_ids: HashSet<String> = state
                .entries
                .iter()
                .map(|entry| entry.id().to_owned())
                .collect();
            let fetched = activities.len();
            activities.retain(|entry| !known_ids.contains(entry.id()));
            if activities.len() < fetched {
                debug!(
                    duplicates = fetched - activities.len(),
                    "skipped activity entries already displayed"
                );
            }
            state.entries.extend(activities);
        } else {
            state.entries = activities;
        }

        state.page = page_number;
        state.last_failed_load = None;
    }
}
