use chrono::{DateTime, Utc};

/// Formats `timestamp` relative to `now` for feed rows.
///
/// Timestamps in the future (clock skew between client and backend) render
/// as `"just now"`. Anything older than a week falls back to a calendar date.
#[must_use]
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let seconds = elapsed.num_seconds();

    if seconds < 60 {
        return "just now".to_owned();
    }

    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = elapsed.num_days();
    if days < 7 {
        return format!("{days}d ago");
    }

    timestamp.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use super::format_relative_time;

    #[test]
    fn recent_and_future_timestamps_are_just_now() {
        let now = Utc::now();
        assert_eq!(format_relative_time(now - Duration::seconds(59), now), "just now");
        assert_eq!(format_relative_time(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn buckets_use_largest_whole_unit() {
        let now = Utc::now();
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative_time(now - Duration::minutes(150), now), "2h ago");
        assert_eq!(format_relative_time(now - Duration::hours(49), now), "2d ago");
    }

    #[test]
    fn older_entries_show_calendar_date() {
        let timestamp = Utc
            .with_ymd_and_hms(2024, 3, 9, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("valid timestamp"));
        let now = timestamp + Duration::days(30);
        assert_eq!(format_relative_time(timestamp, now), "Mar 9, 2024");
    }

    proptest! {
        #[test]
        fn never_returns_empty_text(offset_seconds in -100_000_i64..10_000_000) {
            let now = Utc::now();
            let text = format_relative_time(now - Duration::seconds(offset_seconds), now);
            prop_assert!(!text.is_empty());
        }
    }
}
