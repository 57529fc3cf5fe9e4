use async_trait::async_trait;

use pulseboard_core::{AppResult, ProjectId};
use pulseboard_domain::{ActivityAction, ActivityEntry, ResourceType};

/// Query parameters for one activity page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Project whose activity log is read.
    pub project_id: ProjectId,
    /// Maximum entries returned.
    pub limit: usize,
    /// Number of entries skipped for offset pagination.
    pub offset: usize,
    /// Optional acting-user filter.
    pub user_id: Option<String>,
    /// Optional resource type filter.
    pub resource_type: Option<ResourceType>,
    /// Optional action filter, only sent when the backend filters actions.
    pub action: Option<ActivityAction>,
}

/// One page of activity entries plus the backend total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivityPage {
    /// Entries in backend order.
    pub activities: Vec<ActivityEntry>,
    /// Total matching entries reported by the backend.
    pub total: usize,
}

/// Port for reading and clearing a project's activity log.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Lists one page of project activity.
    async fn list_activities(&self, query: ActivityQuery) -> AppResult<ActivityPage>;

    /// Deletes every activity entry of the project.
    async fn clear_activities(&self, project_id: &ProjectId) -> AppResult<()>;
}
