use std::time::Duration;

use pulseboard_core::{AppError, AppResult, ProjectId};
use pulseboard_domain::ResourceType;

/// Page size used when the embedding context does not set one.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Largest page size accepted by the feed.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Auto-refresh period used when the embedding context does not set one.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(30_000);

/// Shortest accepted auto-refresh period.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1_000);

/// Where the action filter is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionFilterStrategy {
    /// Action is applied to each fetched page only. The displayed total
    /// becomes the filtered page length, so pagination is approximate.
    #[default]
    ClientPage,
    /// Action is sent to the backend and the backend total is trusted.
    /// Only correct for backends that honor the `action` query parameter.
    Server,
}

impl ActionFilterStrategy {
    /// Parses a configuration value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "server" => Ok(Self::Server),
            "client_page" => Ok(Self::ClientPage),
            _ => Err(AppError::Validation(format!(
                "unknown action filter strategy '{value}'"
            ))),
        }
    }
}

/// Configuration supplied by the embedding context of one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Project whose activity is shown.
    pub project_id: ProjectId,
    /// Optional acting-user filter applied server-side.
    pub user_id: Option<String>,
    /// Resource type filter from the embedding context; a UI selection overrides it.
    pub resource_type: Option<ResourceType>,
    /// Whether the feed title is rendered.
    pub show_title: bool,
    /// Page size.
    pub limit: usize,
    /// Whether the feed reloads page one periodically.
    pub auto_refresh: bool,
    /// Period between auto-refresh loads.
    pub refresh_interval: Duration,
    /// Whether the destructive clear control is offered.
    pub show_clear_button: bool,
    /// Where the action filter is evaluated.
    pub action_filter_strategy: ActionFilterStrategy,
}

impl FeedConfig {
    /// Creates a configuration with defaults for every optional setting.
    #[must_use]
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            user_id: None,
            resource_type: None,
            show_title: true,
            limit: DEFAULT_PAGE_LIMIT,
            auto_refresh: false,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            show_clear_button: true,
            action_filter_strategy: ActionFilterStrategy::default(),
        }
    }

    /// Validates numeric bounds.
    pub fn validate(&self) -> AppResult<()> {
        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(AppError::Validation(format!(
                "feed limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }

        if self.refresh_interval < MIN_REFRESH_INTERVAL {
            return Err(AppError::Validation(format!(
                "refresh interval must be at least {} ms",
                MIN_REFRESH_INTERVAL.as_millis()
            )));
        }

        if self
            .user_id
            .as_deref()
            .is_some_and(|user_id| user_id.trim().is_empty())
        {
            return Err(AppError::Validation(
                "user filter must not be blank when present".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pulseboard_core::ProjectId;

    use super::{ActionFilterStrategy, FeedConfig};

    fn project() -> ProjectId {
        ProjectId::new("p1").unwrap_or_else(|_| panic!("valid project id"))
    }

    #[test]
    fn defaults_match_embedding_contract() {
        let config = FeedConfig::new(project());
        assert!(config.show_title);
        assert_eq!(config.limit, 20);
        assert!(!config.auto_refresh);
        assert_eq!(config.refresh_interval, Duration::from_millis(30_000));
        assert!(config.show_clear_button);
        assert_eq!(
            config.action_filter_strategy,
            ActionFilterStrategy::ClientPage
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let config = FeedConfig {
            limit: 0,
            ..FeedConfig::new(project())
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sub_second_refresh_is_rejected() {
        let config = FeedConfig {
            refresh_interval: Duration::from_millis(250),
            ..FeedConfig::new(project())
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn strategy_parses_configuration_values() {
        assert_eq!(
            ActionFilterStrategy::parse("client_page").ok(),
            Some(ActionFilterStrategy::ClientPage)
        );
        assert!(ActionFilterStrategy::parse("everywhere").is_err());
    }
}
