use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tracing::info;

use pulseboard_core::{AppResult, ProjectId};
use pulseboard_domain::{
    ActivityAction, ActivityActor, ActivityDetails, ActivityEntry, ResourceType,
};
use pulseboard_infrastructure::InMemoryActivityRepository;

const DEMO_ACTORS: [(&str, &str); 3] = [
    ("6650a1f0c2e4b81d9a3f7701", "Ada Lovelace"),
    ("6650a1f0c2e4b81d9a3f7702", "Grace Hopper"),
    ("6650a1f0c2e4b81d9a3f7703", "Linus Torvalds"),
];

/// Fills the in-memory repository with a spread of recent project activity.
pub async fn run(
    repository: &InMemoryActivityRepository,
    project_id: &ProjectId,
) -> AppResult<()> {
    let now = Utc::now();
    let script = demo_script();
    let count = script.len();

    // Oldest first so the newest entry ends up at the top.
    for (index, (action, resource_type, details)) in script.into_iter().enumerate().rev() {
        let (user_id, display_name) = DEMO_ACTORS[index % DEMO_ACTORS.len()];
        let minutes_ago = i64::try_from(index).unwrap_or(i64::MAX).saturating_mul(47);
        let entry = ActivityEntry::new(
            format!("demo-{index:03}"),
            action,
            resource_type,
            ActivityActor::new(user_id, display_name),
            now - Duration::minutes(minutes_ago),
            details,
        )?;
        repository.record(project_id, entry).await;
    }

    info!(project_id = %project_id, count, "seeded demo activity");
    Ok(())
}

fn change(field: &str, old_value: Value, new_value: Value) -> Option<ActivityDetails> {
    Some(ActivityDetails {
        field: Some(field.to_owned()),
        old_value: Some(old_value),
        new_value: Some(new_value),
    })
}

fn demo_script() -> Vec<(ActivityAction, ResourceType, Option<ActivityDetails>)> {
    let mut script = vec![
        (
            ActivityAction::Updated,
            ResourceType::Todo,
            change("completed", json!(false), json!(true)),
        ),
        (ActivityAction::Created, ResourceType::Devlog, None),
        (
            ActivityAction::Updated,
            ResourceType::Todo,
            change("dueDate", Value::Null, json!("2024-06-01T09:00:00Z")),
        ),
        (ActivityAction::AddedMember, ResourceType::Team, None),
        (
            ActivityAction::Updated,
            ResourceType::Todo,
            change(
                "assignedTo",
                json!("6650a1f0c2e4b81d9a3f7701"),
                json!("6650a1f0c2e4b81d9a3f7702"),
            ),
        ),
        (
            ActivityAction::AddedTech,
            ResourceType::Tech,
            change("technologies", json!(["rust"]), json!(["rust", "tokio"])),
        ),
        (ActivityAction::Viewed, ResourceType::Note, None),
        (
            ActivityAction::UpdatedSharing,
            ResourceType::Settings,
            change("sharedWith", json!([]), json!(["design", "ops"])),
        ),
        (ActivityAction::Archived, ResourceType::Component, None),
        (ActivityAction::Deleted, ResourceType::Link, None),
    ];

    for index in 0..15 {
        let resource_type = if index % 2 == 0 {
            ResourceType::Note
        } else {
            ResourceType::Todo
        };
        script.push((ActivityAction::Created, resource_type, None));
    }

    script
}
