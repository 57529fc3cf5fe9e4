use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::ActivityDetails;

/// Label rendered for null, missing, or blank values.
pub const EMPTY_VALUE_LABEL: &str = "empty";

const LIST_EMPTY_LABEL: &str = "none";
const IDENTIFIER_PREFIX_CHARS: usize = 8;
const IDENTIFIER_ABBREVIATE_AFTER: usize = 12;

/// Formatting strategy for one changed field.
#[derive(Debug, Clone, Copy)]
pub enum FieldFormatter {
    /// RFC3339 strings or epoch milliseconds rendered as date and time.
    DateTime,
    /// Long opaque identifiers shortened to a prefix.
    Identifier,
    /// Boolean completion flags rendered as words.
    Completion,
    /// Arrays joined with commas, `"none"` when empty.
    List,
    /// Caller supplied formatting function.
    Custom(fn(&Value) -> String),
}

impl FieldFormatter {
    fn apply(&self, value: &Value) -> String {
        match self {
            Self::DateTime => format_date_time(value),
            Self::Identifier => format_identifier(value),
            Self::Completion => match value {
                Value::Bool(true) => "completed".to_owned(),
                Value::Bool(false) => "not completed".to_owned(),
                other => coerce_to_string(other),
            },
            Self::List => match value {
                Value::Array(items) if items.is_empty() => LIST_EMPTY_LABEL.to_owned(),
                Value::Array(items) => items
                    .iter()
                    .map(coerce_to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                other => coerce_to_string(other),
            },
            Self::Custom(format) => format(value),
        }
    }
}

/// Registry mapping field names to their formatting strategy.
///
/// Unregistered array values use the list strategy; any other unregistered
/// value uses generic string coercion.
#[derive(Debug, Clone)]
pub struct FieldFormatterRegistry {
    formatters: HashMap<String, FieldFormatter>,
}

impl FieldFormatterRegistry {
    /// Creates a registry without any field registrations.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// Registers or replaces the formatter for `field`.
    pub fn register(&mut self, field: impl Into<String>, formatter: FieldFormatter) -> &mut Self {
        self.formatters.insert(field.into(), formatter);
        self
    }

    /// Returns the formatter registered for `field`.
    #[must_use]
    pub fn formatter_for(&self, field: &str) -> Option<FieldFormatter> {
        self.formatters.get(field).copied()
    }

    /// Formats one field value for display.
    #[must_use]
    pub fn format_value(&self, field: Option<&str>, value: Option<&Value>) -> String {
        let Some(value) = value.filter(|value| !is_blank(value)) else {
            return EMPTY_VALUE_LABEL.to_owned();
        };

        let formatted = match field.and_then(|field| self.formatter_for(field)) {
            Some(formatter) => formatter.apply(value),
            None if value.is_array() => FieldFormatter::List.apply(value),
            None => coerce_to_string(value),
        };

        if formatted.trim().is_empty() {
            EMPTY_VALUE_LABEL.to_owned()
        } else {
            formatted
        }
    }

    /// Renders a change payload as `field: old → new`.
    #[must_use]
    pub fn describe_change(&self, details: &ActivityDetails) -> String {
        let field = details.field.as_deref();
        let old_value = self.format_value(field, details.old_value.as_ref());
        let new_value = self.format_value(field, details.new_value.as_ref());

        match field {
            Some(field) => format!("{field}: {old_value} → {new_value}"),
            None => format!("{old_value} → {new_value}"),
        }
    }
}

impl Default for FieldFormatterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for field in [
            "dueDate",
            "reminderDate",
            "deadline",
            "startDate",
            "endDate",
            "createdAt",
            "updatedAt",
            "completedAt",
            "archivedAt",
        ] {
            registry.register(field, FieldFormatter::DateTime);
        }
        for field in [
            "assignedTo",
            "parentTodoId",
            "userId",
            "projectId",
            "ownerId",
            "createdBy",
        ] {
            registry.register(field, FieldFormatter::Identifier);
        }
        for field in ["tags", "technologies", "collaborators", "sharedWith"] {
            registry.register(field, FieldFormatter::List);
        }
        registry.register("completed", FieldFormatter::Completion);
        registry
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn format_date_time(value: &Value) -> String {
    let parsed = match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc)),
        Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };

    match parsed {
        Some(timestamp) => timestamp.format("%b %-d, %Y, %H:%M UTC").to_string(),
        None => coerce_to_string(value),
    }
}

fn format_identifier(value: &Value) -> String {
    let Value::String(identifier) = value else {
        return coerce_to_string(value);
    };

    if identifier.chars().count() <= IDENTIFIER_ABBREVIATE_AFTER {
        return identifier.clone();
    }

    let prefix: String = identifier.chars().take(IDENTIFIER_PREFIX_CHARS).collect();
    format!("{prefix}…")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn blank_values_render_as_empty() {
        let registry = FieldFormatterRegistry::default();
        assert_eq!(registry.format_value(Some("title"), None), "empty");
        assert_eq!(registry.format_value(Some("title"), Some(&Value::Null)), "empty");
        assert_eq!(registry.format_value(Some("title"), Some(&json!("  "))), "empty");
    }

    #[test]
    fn unregistered_arrays_use_the_list_strategy() {
        let registry = FieldFormatterRegistry::default();
        assert_eq!(registry.format_value(Some("labels"), Some(&json!([]))), "none");
        assert_eq!(
            registry.format_value(Some("labels"), Some(&json!(["a", "b"]))),
            "a, b"
        );
        assert_eq!(registry.format_value(None, Some(&json!([1, [2, 3]]))), "1, 2, 3");
    }

    #[test]
    fn date_fields_render_date_and_time() {
        let registry = FieldFormatterRegistry::default();
        let formatted = registry.format_value(Some("dueDate"), Some(&json!("2024-05-01T14:30:00Z")));
        assert_eq!(formatted, "May 1, 2024, 14:30 UTC");
    }

    #[test]
    fn unparseable_dates_fall_back_to_raw_text() {
        let registry = FieldFormatterRegistry::default();
        let formatted = registry.format_value(Some("dueDate"), Some(&json!("next week")));
        assert_eq!(formatted, "next week");
    }

    #[test]
    fn long_identifiers_are_abbreviated() {
        let registry = FieldFormatterRegistry::default();
        assert_eq!(
            registry.format_value(Some("assignedTo"), Some(&json!("64f1c2aa9e01b7d3c8a41f20"))),
            "64f1c2aa…"
        );
        assert_eq!(registry.format_value(Some("assignedTo"), Some(&json!("short-id"))), "short-id");
    }

    #[test]
    fn completion_flags_render_as_words() {
        let registry = FieldFormatterRegistry::default();
        assert_eq!(registry.format_value(Some("completed"), Some(&json!(true))), "completed");
        assert_eq!(
            registry.format_value(Some("completed"), Some(&json!(false))),
            "not completed"
        );
    }

    #[test]
    fn list_fields_join_or_report_none() {
        let registry = FieldFormatterRegistry::default();
        assert_eq!(
            registry.format_value(Some("tags"), Some(&json!(["rust", "api"]))),
            "rust, api"
        );
        assert_eq!(registry.format_value(Some("tags"), Some(&json!([]))), "none");
    }

    #[test]
    fn custom_formatters_can_be_registered() {
        fn shout(value: &Value) -> String {
            value.as_str().unwrap_or_default().to_uppercase()
        }

        let mut registry = FieldFormatterRegistry::default();
        registry.register("priority", FieldFormatter::Custom(shout));
        assert_eq!(registry.format_value(Some("priority"), Some(&json!("high"))), "HIGH");
    }

    #[test]
    fn describe_change_formats_both_sides() {
        let registry = FieldFormatterRegistry::default();
        let details = ActivityDetails {
            field: Some("completed".to_owned()),
            old_value: Some(json!(false)),
            new_value: Some(json!(true)),
        };
        assert_eq!(
            registry.describe_change(&details),
            "completed: not completed → completed"
        );
    }

    proptest! {
        #[test]
        fn unregistered_strings_pass_through(text in "[a-zA-Z0-9 ]{0,40}") {
            let registry = FieldFormatterRegistry::default();
            let formatted = registry.format_value(Some("title"), Some(&Value::String(text.clone())));
            if text.trim().is_empty() {
                prop_assert_eq!(formatted, "empty");
            } else {
                prop_assert_eq!(formatted, text);
            }
        }
    }
}
