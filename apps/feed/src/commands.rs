use std::str::FromStr;
use std::time::Duration;

use pulseboard_core::{AppError, AppResult};
use pulseboard_domain::{ActivityAction, ResourceType};

pub const HELP_TEXT: &str = "commands: more | refresh | retry | clear | cancel | \
action <name|all> | type <name|all> | auto on|off | interval <ms> | help | quit";

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    More,
    Refresh,
    Retry,
    Clear,
    Cancel,
    Action(Option<ActivityAction>),
    ResourceType(Option<ResourceType>),
    AutoRefresh(bool),
    Interval(Duration),
    Help,
    Quit,
}

impl FeedCommand {
    pub fn parse(line: &str) -> AppResult<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let argument = words.next();

        if words.next().is_some() {
            return Err(AppError::Validation(format!(
                "too many arguments in '{}'",
                line.trim()
            )));
        }

        match (command.as_str(), argument) {
            ("more" | "m", None) => Ok(Self::More),
            ("refresh" | "r", None) => Ok(Self::Refresh),
            ("retry", None) => Ok(Self::Retry),
            ("clear", None) => Ok(Self::Clear),
            ("cancel", None) => Ok(Self::Cancel),
            ("action", Some(value)) => {
                parse_optional(value, ActivityAction::from_str).map(Self::Action)
            }
            ("type", Some(value)) => {
                parse_optional(value, ResourceType::from_str).map(Self::ResourceType)
            }
            ("auto", Some("on")) => Ok(Self::AutoRefresh(true)),
            ("auto", Some("off")) => Ok(Self::AutoRefresh(false)),
            ("interval", Some(value)) => value
                .parse::<u64>()
                .map(|millis| Self::Interval(Duration::from_millis(millis)))
                .map_err(|error| {
                    AppError::Validation(format!("invalid interval '{value}': {error}"))
                }),
            ("help" | "?", None) => Ok(Self::Help),
            ("quit" | "exit" | "q", None) => Ok(Self::Quit),
            ("", None) => Err(AppError::Validation("empty command".to_owned())),
            _ => Err(AppError::Validation(format!(
                "unrecognized command '{}'",
                line.trim()
            ))),
        }
    }
}

fn parse_optional<T>(value: &str, parse: fn(&str) -> AppResult<T>) -> AppResult<Option<T>> {
    if value.eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        parse(value).map(Some)
    }
}
