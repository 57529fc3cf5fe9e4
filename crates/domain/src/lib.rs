//! Domain entities and display derivations for project activity feeds.

#![forbid(unsafe_code)]

mod activity;
mod field_format;
mod relative_time;

pub use activity::{ActivityAction, ActivityActor, ActivityDetails, ActivityEntry, ResourceType};
pub use field_format::{EMPTY_VALUE_LABEL, FieldFormatter, FieldFormatterRegistry};
pub use relative_time::format_relative_time;
