use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pulseboard_application::ActivityPage;
use pulseboard_core::{AppError, AppResult};
use pulseboard_domain::{
    ActivityAction, ActivityActor, ActivityDetails, ActivityEntry, ResourceType,
};

/// Backend payload for one activity page.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityListResponse {
    /// Entries in backend order.
    pub activities: Vec<ActivityEntryResponse>,
    /// Total matching entries.
    pub total: usize,
}

/// Backend representation of one activity entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntryResponse {
    /// Opaque entry identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Action transport value.
    pub action: String,
    /// Resource type transport value.
    pub resource_type: String,
    /// Acting user, populated or as a bare identifier.
    #[serde(default, alias = "userId")]
    pub user: Option<ActivityActorReference>,
    /// RFC3339 timestamp.
    pub timestamp: String,
    /// Optional change payload.
    #[serde(default)]
    pub details: Option<ActivityDetailsResponse>,
}

/// Actor field as sent by the backend.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityActorReference {
    /// Populated user document.
    Populated(ActivityActorResponse),
    /// Unpopulated user identifier.
    Id(String),
}

/// Populated actor reference.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityActorResponse {
    /// User identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Preferred display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Login handle.
    #[serde(default)]
    pub username: Option<String>,
}

/// Change payload attached to an activity entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetailsResponse {
    /// Changed attribute name.
    #[serde(default)]
    pub field: Option<String>,
    /// Value before the change.
    #[serde(default)]
    pub old_value: Option<Value>,
    /// Value after the change.
    #[serde(default)]
    pub new_value: Option<Value>,
}

impl ActivityListResponse {
    pub(super) fn try_into_page(self) -> AppResult<ActivityPage> {
        let activities = self
            .activities
            .into_iter()
            .map(ActivityEntryResponse::try_into_entry)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(ActivityPage {
            activities,
            total: self.total,
        })
    }
}

impl ActivityEntryResponse {
    fn try_into_entry(self) -> AppResult<ActivityEntry> {
        let action = ActivityAction::from_str(self.action.as_str())?;
        let resource_type = ResourceType::from_str(self.resource_type.as_str())?;
        let timestamp = DateTime::parse_from_rfc3339(self.timestamp.as_str())
            .map_err(|error| {
                AppError::Validation(format!(
                    "invalid timestamp '{}' on activity '{}': {error}",
                    self.timestamp, self.id
                ))
            })?
            .with_timezone(&Utc);
        let actor = self
            .user
            .map(ActivityActorReference::into_actor)
            .unwrap_or_else(|| ActivityActor::new("", ""));
        let details = self.details.map(|details| ActivityDetails {
            field: details.field,
            old_value: details.old_value,
            new_value: details.new_value,
        });

        ActivityEntry::new(self.id, action, resource_type, actor, timestamp, details)
    }
}

impl ActivityActorReference {
    fn into_actor(self) -> ActivityActor {
        match self {
            Self::Populated(actor) => actor.into_actor(),
            Self::Id(user_id) => ActivityActor::new(user_id, ""),
        }
    }
}

impl ActivityActorResponse {
    fn into_actor(self) -> ActivityActor {
        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let display_name = self
            .display_name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| (!full_name.is_empty()).then_some(full_name))
            .or(self.username)
            .unwrap_or_default();

        ActivityActor::new(self.id, display_name)
    }
}
