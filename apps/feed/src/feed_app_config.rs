use std::env;
use std::str::FromStr;
use std::time::Duration;

use pulseboard_application::{ActionFilterStrategy, FeedConfig};
use pulseboard_core::{AppError, AppResult, ProjectId};
use pulseboard_domain::ResourceType;

#[derive(Debug, Clone)]
pub struct FeedAppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub http_timeout_secs: u64,
    pub demo: bool,
    pub feed: FeedConfig,
}

impl FeedAppConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_base_url = lookup("FEED_API_BASE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:3001/api".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let api_token = lookup("FEED_API_TOKEN");
        let http_timeout_secs =
            parse_or("FEED_HTTP_TIMEOUT_SECS", lookup("FEED_HTTP_TIMEOUT_SECS"), 15)?;
        let demo = parse_bool("FEED_DEMO", lookup("FEED_DEMO"), false)?;

        let project_id = lookup("FEED_PROJECT_ID")
            .ok_or_else(|| AppError::Validation("FEED_PROJECT_ID is required".to_owned()))?;
        let mut feed = FeedConfig::new(ProjectId::new(project_id)?);
        feed.user_id = lookup("FEED_USER_ID");
        feed.resource_type = lookup("FEED_RESOURCE_TYPE")
            .map(|value| ResourceType::from_str(value.as_str()))
            .transpose()?;
        feed.show_title = parse_bool("FEED_SHOW_TITLE", lookup("FEED_SHOW_TITLE"), true)?;
        feed.limit = parse_or("FEED_LIMIT", lookup("FEED_LIMIT"), feed.limit)?;
        feed.auto_refresh = parse_bool("FEED_AUTO_REFRESH", lookup("FEED_AUTO_REFRESH"), false)?;
        feed.refresh_interval = Duration::from_millis(parse_or(
            "FEED_REFRESH_INTERVAL_MS",
            lookup("FEED_REFRESH_INTERVAL_MS"),
            30_000,
        )?);
        feed.show_clear_button = parse_bool(
            "FEED_SHOW_CLEAR_BUTTON",
            lookup("FEED_SHOW_CLEAR_BUTTON"),
            true,
        )?;
        if let Some(strategy) = lookup("FEED_ACTION_FILTER") {
            feed.action_filter_strategy = ActionFilterStrategy::parse(strategy.as_str())?;
        }

        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "FEED_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }
        feed.validate()?;

        Ok(Self {
            api_base_url,
            api_token,
            http_timeout_secs,
            demo,
            feed,
        })
    }
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value.parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, value: Option<String>, default: bool) -> AppResult<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(AppError::Validation(format!(
            "invalid {name} value '{other}': expected a boolean"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use pulseboard_application::ActionFilterStrategy;
    use pulseboard_domain::ResourceType;

    use super::FeedAppConfig;

    fn load(pairs: &[(&str, &str)]) -> Result<FeedAppConfig, String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        FeedAppConfig::from_lookup(|name| values.get(name).cloned())
            .map_err(|error| error.to_string())
    }

    #[test]
    fn project_id_is_required() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn defaults_apply_when_only_project_is_set() {
        let config = load(&[("FEED_PROJECT_ID", "p1")])
            .unwrap_or_else(|error| panic!("config should load: {error}"));

        assert_eq!(config.api_base_url, "http://127.0.0.1:3001/api");
        assert!(!config.demo);
        assert_eq!(config.feed.limit, 20);
        assert!(!config.feed.auto_refresh);
        assert_eq!(config.feed.refresh_interval, Duration::from_secs(30));
        assert_eq!(
            config.feed.action_filter_strategy,
            ActionFilterStrategy::ClientPage
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("FEED_PROJECT_ID", "p1"),
            ("FEED_API_BASE_URL", "https://pulse.example.com/api/"),
            ("FEED_RESOURCE_TYPE", "todo"),
            ("FEED_LIMIT", "50"),
            ("FEED_AUTO_REFRESH", "on"),
            ("FEED_REFRESH_INTERVAL_MS", "5000"),
            ("FEED_SHOW_CLEAR_BUTTON", "false"),
            ("FEED_ACTION_FILTER", "server"),
        ])
        .unwrap_or_else(|error| panic!("config should load: {error}"));

        assert_eq!(config.api_base_url, "https://pulse.example.com/api");
        assert_eq!(config.feed.resource_type, Some(ResourceType::Todo));
        assert_eq!(config.feed.limit, 50);
        assert!(config.feed.auto_refresh);
        assert_eq!(config.feed.refresh_interval, Duration::from_secs(5));
        assert!(!config.feed.show_clear_button);
        assert_eq!(config.feed.action_filter_strategy, ActionFilterStrategy::Server);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(load(&[("FEED_PROJECT_ID", "p1"), ("FEED_LIMIT", "lots")]).is_err());
        assert!(load(&[("FEED_PROJECT_ID", "p1"), ("FEED_LIMIT", "500")]).is_err());
        assert!(load(&[("FEED_PROJECT_ID", "p1"), ("FEED_AUTO_REFRESH", "maybe")]).is_err());
    }
}
