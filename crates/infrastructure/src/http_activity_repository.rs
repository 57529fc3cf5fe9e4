use async_trait::async_trait;
use reqwest::{StatusCode, header};
use tracing::debug;
use url::Url;

use pulseboard_application::{ActivityPage, ActivityQuery, ActivityRepository};
use pulseboard_core::{AppError, AppResult, ProjectId};

mod wire;

pub use wire::{
    ActivityActorReference, ActivityActorResponse, ActivityDetailsResponse, ActivityEntryResponse,
    ActivityListResponse,
};

/// REST-backed implementation of the activity repository port.
pub struct HttpActivityRepository {
    http_client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpActivityRepository {
    /// Creates a repository for the API rooted at `base_url`.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        api_token: Option<String>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid API base URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "API base URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            api_token: api_token.filter(|token| !token.trim().is_empty()),
        })
    }

    fn project_url(&self, project_id: &ProjectId) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("API base URL cannot carry a path".to_owned()))?
            .pop_if_empty()
            .extend(["activity", "project", project_id.as_str()]);
        Ok(url)
    }

    fn list_url(&self, query: &ActivityQuery) -> AppResult<Url> {
        let mut url = self.project_url(&query.project_id)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("limit", query.limit.to_string().as_str())
                .append_pair("offset", query.offset.to_string().as_str());
            if let Some(user_id) = &query.user_id {
                pairs.append_pair("userId", user_id);
            }
            if let Some(resource_type) = query.resource_type {
                pairs.append_pair("resourceType", resource_type.as_str());
            }
            if let Some(action) = query.action {
                pairs.append_pair("action", action.as_str());
            }
        }
        Ok(url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }
}

#[async_trait]
impl ActivityRepository for HttpActivityRepository {
    async fn list_activities(&self, query: ActivityQuery) -> AppResult<ActivityPage> {
        let url = self.list_url(&query)?;
        debug!(url = %url, "requesting activity page");

        let response = self
            .authorize(self.http_client.get(url))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to call activity list endpoint: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(status_error("activity list", status, body));
        }

        response
            .json::<ActivityListResponse>()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to parse activity list response body: {error}"
                ))
            })?
            .try_into_page()
    }

    async fn clear_activities(&self, project_id: &ProjectId) -> AppResult<()> {
        let url = self.project_url(project_id)?;
        debug!(url = %url, "clearing project activity");

        let response = self
            .authorize(self.http_client.delete(url))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to call activity clear endpoint: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(status_error("activity clear", status, body));
        }

        Ok(())
    }
}

fn status_error(endpoint: &str, status: StatusCode, body: String) -> AppError {
    let message = format!(
        "{endpoint} endpoint returned status {}: {body}",
        status.as_u16()
    );

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}
