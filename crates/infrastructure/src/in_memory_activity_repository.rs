use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use pulseboard_application::{ActivityPage, ActivityQuery, ActivityRepository};
use pulseboard_core::{AppResult, ProjectId};
use pulseboard_domain::{
    ActivityAction, ActivityActor, ActivityDetails, ActivityEntry, ResourceType,
};

/// In-memory activity log keyed by project, newest entry first.
#[derive(Debug, Default)]
pub struct InMemoryActivityRepository {
    entries: RwLock<HashMap<ProjectId, Vec<ActivityEntry>>>,
}

impl InMemoryActivityRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores an entry as the newest activity of `project_id`.
    pub async fn record(&self, project_id: &ProjectId, entry: ActivityEntry) {
        self.entries
            .write()
            .await
            .entry(project_id.clone())
            .or_default()
            .insert(0, entry);
    }

    /// Records an action performed now with a generated identifier.
    pub async fn record_action(
        &self,
        project_id: &ProjectId,
        action: ActivityAction,
        resource_type: ResourceType,
        actor: ActivityActor,
        details: Option<ActivityDetails>,
    ) -> AppResult<ActivityEntry> {
        let entry = ActivityEntry::new(
            Uuid::new_v4().to_string(),
            action,
            resource_type,
            actor,
            Utc::now(),
            details,
        )?;
        self.record(project_id, entry.clone()).await;
        Ok(entry)
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn list_activities(&self, query: ActivityQuery) -> AppResult<ActivityPage> {
        let entries = self.entries.read().await;
        let Some(project_entries) = entries.get(&query.project_id) else {
            return Ok(ActivityPage::default());
        };

        let matching: Vec<&ActivityEntry> = project_entries
            .iter()
            .filter(|entry| {
                query
                    .resource_type
                    .is_none_or(|resource_type| entry.resource_type() == resource_type)
            })
            .filter(|entry| query.action.is_none_or(|action| entry.action() == action))
            .filter(|entry| {
                query
                    .user_id
                    .as_deref()
                    .is_none_or(|user_id| entry.actor().user_id() == user_id)
            })
            .collect();

        Ok(ActivityPage {
            total: matching.len(),
            activities: matching
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .cloned()
                .collect(),
        })
    }

    async fn clear_activities(&self, project_id: &ProjectId) -> AppResult<()> {
        self.entries.write().await.remove(project_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pulseboard_application::{ActivityQuery, ActivityRepository};
    use pulseboard_core::ProjectId;
    use pulseboard_domain::{ActivityAction, ActivityActor, ResourceType};

    use super::InMemoryActivityRepository;

    fn project(value: &str) -> ProjectId {
        ProjectId::new(value).unwrap_or_else(|_| panic!("valid project id"))
    }

    fn query(project_id: ProjectId, limit: usize, offset: usize) -> ActivityQuery {
        ActivityQuery {
            project_id,
            limit,
            offset,
            user_id: None,
            resource_type: None,
            action: None,
        }
    }

    async fn seeded(project_id: &ProjectId, count: usize) -> InMemoryActivityRepository {
        let repository = InMemoryActivityRepository::new();
        for index in 0..count {
            let resource_type = if index % 2 == 0 {
                ResourceType::Note
            } else {
                ResourceType::Todo
            };
            let _ = repository
                .record_action(
                    project_id,
                    ActivityAction::Created,
                    resource_type,
                    ActivityActor::new(format!("u{}", index % 3), "Ada"),
                    None,
                )
                .await;
        }
        repository
    }

    #[tokio::test]
    async fn pages_use_offset_and_report_full_total() {
        let project_id = project("p1");
        let repository = seeded(&project_id, 25).await;

        let page = repository
            .list_activities(query(project_id.clone(), 20, 20))
            .await
            .unwrap_or_else(|_| panic!("list should succeed"));

        assert_eq!(page.total, 25);
        assert_eq!(page.activities.len(), 5);
    }

    #[tokio::test]
    async fn newest_entry_is_listed_first() {
        let project_id = project("p1");
        let repository = InMemoryActivityRepository::new();
        let _ = repository
            .record_action(
                &project_id,
                ActivityAction::Created,
                ResourceType::Note,
                ActivityActor::new("u1", "Ada"),
                None,
            )
            .await;
        let newest = repository
            .record_action(
                &project_id,
                ActivityAction::Deleted,
                ResourceType::Note,
                ActivityActor::new("u1", "Ada"),
                None,
            )
            .await
            .unwrap_or_else(|_| panic!("record should succeed"));

        let page = repository
            .list_activities(query(project_id, 20, 0))
            .await
            .unwrap_or_else(|_| panic!("list should succeed"));
        assert_eq!(page.activities[0].id(), newest.id());
    }

    #[tokio::test]
    async fn filters_combine_resource_type_and_user() {
        let project_id = project("p1");
        let repository = seeded(&project_id, 12).await;

        let page = repository
            .list_activities(ActivityQuery {
                resource_type: Some(ResourceType::Todo),
                user_id: Some("u1".to_owned()),
                ..query(project_id, 20, 0)
            })
            .await
            .unwrap_or_else(|_| panic!("list should succeed"));

        assert_eq!(page.total, 2);
        assert!(page.activities.iter().all(|entry| {
            entry.resource_type() == ResourceType::Todo && entry.actor().user_id() == "u1"
        }));
    }

    #[tokio::test]
    async fn clear_only_affects_one_project() {
        let first = project("p1");
        let second = project("p2");
        let repository = seeded(&first, 3).await;
        let _ = repository
            .record_action(
                &second,
                ActivityAction::Joined,
                ResourceType::Team,
                ActivityActor::new("u9", "Grace"),
                None,
            )
            .await;

        assert!(repository.clear_activities(&first).await.is_ok());

        let cleared = repository
            .list_activities(query(first, 20, 0))
            .await
            .unwrap_or_else(|_| panic!("list should succeed"));
        let untouched = repository
            .list_activities(query(second, 20, 0))
            .await
            .unwrap_or_else(|_| panic!("list should succeed"));
        assert_eq!(cleared.total, 0);
        assert_eq!(untouched.total, 1);
    }
}
