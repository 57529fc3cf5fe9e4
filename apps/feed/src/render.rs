use std::fmt::Write;

use chrono::{DateTime, Utc};

use pulseboard_application::{FeedFooter, FeedSnapshot};
use pulseboard_domain::{ActivityEntry, FieldFormatterRegistry, format_relative_time};

/// Renders a feed snapshot as plain text for the terminal.
pub struct FeedRenderer {
    registry: FieldFormatterRegistry,
    show_title: bool,
    show_clear_button: bool,
}

impl FeedRenderer {
    pub fn new(show_title: bool, show_clear_button: bool) -> Self {
        Self {
            registry: FieldFormatterRegistry::default(),
            show_title,
            show_clear_button,
        }
    }

    pub fn render(&self, snapshot: &FeedSnapshot, now: DateTime<Utc>) -> String {
        let mut output = String::new();

        if self.show_title {
            output.push_str("Activity\n");
        }
        let _ = writeln!(output, "{}", filter_line(snapshot));

        if let Some(failure) = snapshot.failure {
            if failure.is_retryable() {
                let _ = writeln!(output, "! {} (type 'retry')", failure.message());
            } else {
                let _ = writeln!(output, "! {}", failure.message());
            }
        }

        if snapshot.loading && snapshot.entries.is_empty() {
            output.push_str("Loading activities...\n");
            return output;
        }

        for entry in &snapshot.entries {
            output.push_str(self.render_row(entry, now).as_str());
        }

        match snapshot.footer() {
            FeedFooter::LoadMore { remaining } if snapshot.loading_more => {
                let _ = writeln!(output, "Loading more... ({remaining} remaining)");
            }
            FeedFooter::LoadMore { remaining } => {
                let _ = writeln!(output, "Load more ({remaining} remaining)");
            }
            FeedFooter::AllLoaded { count } => {
                let _ = writeln!(output, "All {count} activities loaded");
            }
            FeedFooter::Empty => output.push_str("No activity yet\n"),
        }

        if self.show_clear_button && !snapshot.entries.is_empty() {
            if snapshot.clearing {
                output.push_str("Clearing activity...\n");
            } else if snapshot.clear_armed {
                output.push_str(
                    "Clear all activity for this project? Type 'clear' to confirm or 'cancel'.\n",
                );
            }
        }

        output
    }

    fn render_row(&self, entry: &ActivityEntry, now: DateTime<Utc>) -> String {
        let mut row = format!(
            "{} {} {} {} {} {} · {}\n",
            entry.action().icon(),
            entry.resource_type().icon(),
            entry.actor().display_name(),
            entry.action().verb(),
            entry.resource_type().as_str(),
            entry.id(),
            format_relative_time(entry.timestamp(), now),
        );

        if let Some(details) = entry.details() {
            let _ = writeln!(row, "    {}", self.registry.describe_change(details));
        }

        row
    }
}

fn filter_line(snapshot: &FeedSnapshot) -> String {
    let action = snapshot
        .action_filter
        .map_or("all", |action| action.as_str());
    let resource_type = snapshot
        .resource_type_filter
        .map_or("all", |resource_type| resource_type.as_str());

    format!("[action: {action}] [type: {resource_type}]")
}
