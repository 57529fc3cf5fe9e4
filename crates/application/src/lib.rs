//! Application services and ports.

#![forbid(unsafe_code)]

mod activity_feed;
mod activity_ports;
mod auto_refresh;
mod feed_config;

pub use activity_feed::{
    ActivityFeed, ClearOutcome, FeedFailure, FeedFooter, FeedSnapshot, LoadOutcome,
};
pub use activity_ports::{ActivityPage, ActivityQuery, ActivityRepository};
pub use auto_refresh::AutoRefresh;
pub use feed_config::{
    ActionFilterStrategy, DEFAULT_PAGE_LIMIT, DEFAULT_REFRESH_INTERVAL, FeedConfig,
    MAX_PAGE_LIMIT, MIN_REFRESH_INTERVAL,
};
