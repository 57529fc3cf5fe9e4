use std::str::FromStr;

use chrono::{DateTime, Utc};
use pulseboard_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Action recorded by one activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// A resource was created.
    Created,
    /// A resource was updated.
    Updated,
    /// A resource was deleted.
    Deleted,
    /// A resource was viewed.
    Viewed,
    /// A member was added to the project team.
    AddedMember,
    /// A member was removed from the project team.
    RemovedMember,
    /// A member role changed.
    UpdatedRole,
    /// A technology was added to the project stack.
    AddedTech,
    /// A technology was removed from the project stack.
    RemovedTech,
    /// Public sharing settings changed.
    UpdatedSharing,
    /// The resource was archived.
    Archived,
    /// The resource was restored from the archive.
    Unarchived,
    /// A user joined the project.
    Joined,
    /// A user left the project.
    Left,
}

impl ActivityAction {
    /// Returns the stable transport value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Viewed => "viewed",
            Self::AddedMember => "added_member",
            Self::RemovedMember => "removed_member",
            Self::UpdatedRole => "updated_role",
            Self::AddedTech => "added_tech",
            Self::RemovedTech => "removed_tech",
            Self::UpdatedSharing => "updated_sharing",
            Self::Archived => "archived",
            Self::Unarchived => "unarchived",
            Self::Joined => "joined",
            Self::Left => "left",
        }
    }

    /// Returns all known actions in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ActivityAction] = &[
            ActivityAction::Created,
            ActivityAction::Updated,
            ActivityAction::Deleted,
            ActivityAction::Viewed,
            ActivityAction::AddedMember,
            ActivityAction::RemovedMember,
            ActivityAction::UpdatedRole,
            ActivityAction::AddedTech,
            ActivityAction::RemovedTech,
            ActivityAction::UpdatedSharing,
            ActivityAction::Archived,
            ActivityAction::Unarchived,
            ActivityAction::Joined,
            ActivityAction::Left,
        ];

        ALL
    }

    /// Returns the feed icon for this action.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Created => "➕",
            Self::Updated => "✏️",
            Self::Deleted => "🗑️",
            Self::Viewed => "👁️",
            Self::AddedMember | Self::Joined => "👋",
            Self::RemovedMember | Self::Left => "🚪",
            Self::UpdatedRole => "🛡️",
            Self::AddedTech | Self::RemovedTech => "🧰",
            Self::UpdatedSharing => "🔗",
            Self::Archived => "📦",
            Self::Unarchived => "📤",
        }
    }

    /// Returns the past-tense verb used in feed sentences.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Viewed => "viewed",
            Self::AddedMember => "added a member to",
            Self::RemovedMember => "removed a member from",
            Self::UpdatedRole => "changed a role in",
            Self::AddedTech => "added a technology to",
            Self::RemovedTech => "removed a technology from",
            Self::UpdatedSharing => "changed sharing for",
            Self::Archived => "archived",
            Self::Unarchived => "unarchived",
            Self::Joined => "joined",
            Self::Left => "left",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown activity action '{value}'")))
    }
}

/// Category of object an activity acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// The project itself.
    Project,
    /// A project note.
    Note,
    /// A todo item.
    Todo,
    /// An architecture component.
    Component,
    /// A devlog entry.
    Devlog,
    /// An external link.
    Link,
    /// A technology in the project stack.
    Tech,
    /// The project team.
    Team,
    /// Project settings.
    Settings,
}

impl ResourceType {
    /// Returns the stable transport value for this resource type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Note => "note",
            Self::Todo => "todo",
            Self::Component => "component",
            Self::Devlog => "devlog",
            Self::Link => "link",
            Self::Tech => "tech",
            Self::Team => "team",
            Self::Settings => "settings",
        }
    }

    /// Returns all known resource types in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceType] = &[
            ResourceType::Project,
            ResourceType::Note,
            ResourceType::Todo,
            ResourceType::Component,
            ResourceType::Devlog,
            ResourceType::Link,
            ResourceType::Tech,
            ResourceType::Team,
            ResourceType::Settings,
        ];

        ALL
    }

    /// Returns the feed icon for this resource type.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Project => "📁",
            Self::Note => "📝",
            Self::Todo => "✅",
            Self::Component => "🧩",
            Self::Devlog => "📓",
            Self::Link => "🔗",
            Self::Tech => "⚙️",
            Self::Team => "👥",
            Self::Settings => "🔧",
        }
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource_type| resource_type.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource type '{value}'")))
    }
}

/// User that performed an activity. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityActor {
    user_id: String,
    display_name: String,
}

impl ActivityActor {
    /// Creates an actor reference.
    ///
    /// Falls back to `"Unknown user"` when the backend omitted the name.
    #[must_use]
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            "Unknown user".to_owned()
        } else {
            display_name
        };

        Self {
            user_id: user_id.into(),
            display_name,
        }
    }

    /// Returns the backend user identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Returns the name shown in the feed.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}

/// Optional change payload attached to an activity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityDetails {
    /// Name of the changed attribute.
    pub field: Option<String>,
    /// Value before the change.
    pub old_value: Option<Value>,
    /// Value after the change.
    pub new_value: Option<Value>,
}

impl ActivityDetails {
    /// Returns true when the payload carries nothing worth rendering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field.is_none() && self.old_value.is_none() && self.new_value.is_none()
    }
}

/// One immutable record of a user action on a project resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    id: NonEmptyString,
    action: ActivityAction,
    resource_type: ResourceType,
    actor: ActivityActor,
    timestamp: DateTime<Utc>,
    details: Option<ActivityDetails>,
}

impl ActivityEntry {
    /// Creates a validated activity entry.
    pub fn new(
        id: impl Into<String>,
        action: ActivityAction,
        resource_type: ResourceType,
        actor: ActivityActor,
        timestamp: DateTime<Utc>,
        details: Option<ActivityDetails>,
    ) -> AppResult<Self> {
        let id = NonEmptyString::new(id)
            .map_err(|_| AppError::Validation("activity id must not be empty".to_owned()))?;

        Ok(Self {
            id,
            action,
            resource_type,
            actor,
            timestamp,
            details: details.filter(|details| !details.is_empty()),
        })
    }

    /// Returns the opaque entry identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the recorded action.
    #[must_use]
    pub fn action(&self) -> ActivityAction {
        self.action
    }

    /// Returns the resource category acted upon.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Returns the acting user.
    #[must_use]
    pub fn actor(&self) -> &ActivityActor {
        &self.actor
    }

    /// Returns when the action occurred.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the optional change payload.
    #[must_use]
    pub fn details(&self) -> Option<&ActivityDetails> {
        self.details.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn action_roundtrip_transport_value() {
        for action in ActivityAction::all() {
            let restored = ActivityAction::from_str(action.as_str());
            assert_eq!(restored.ok(), Some(*action));
        }
    }

    #[test]
    fn unknown_resource_type_is_rejected() {
        assert!(ResourceType::from_str("spreadsheet").is_err());
    }

    #[test]
    fn serde_uses_transport_values() {
        let encoded = serde_json::to_string(&ActivityAction::UpdatedSharing)
            .unwrap_or_else(|_| panic!("action should serialize"));
        assert_eq!(encoded, "\"updated_sharing\"");
    }

    #[test]
    fn blank_actor_name_falls_back() {
        let actor = ActivityActor::new("u1", "  ");
        assert_eq!(actor.display_name(), "Unknown user");
    }

    #[test]
    fn entry_rejects_empty_id() {
        let entry = ActivityEntry::new(
            "",
            ActivityAction::Created,
            ResourceType::Note,
            ActivityActor::new("u1", "Ada"),
            Utc::now(),
            None,
        );
        assert!(matches!(entry, Err(AppError::Validation(_))));
    }

    #[test]
    fn entry_drops_empty_details() {
        let entry = ActivityEntry::new(
            "a1",
            ActivityAction::Viewed,
            ResourceType::Project,
            ActivityActor::new("u1", "Ada"),
            Utc::now(),
            Some(ActivityDetails::default()),
        )
        .unwrap_or_else(|_| panic!("entry should be valid"));
        assert!(entry.details().is_none());
    }

    proptest! {
        #[test]
        fn unknown_action_strings_never_parse(value in "[A-Z]{1,12}") {
            prop_assert!(ActivityAction::from_str(value.as_str()).is_err());
        }
    }
}
