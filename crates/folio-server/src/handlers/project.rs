//! Project endpoints.
//!
//! A PRIVATE project is readable by its owner only; everyone else gets 403,
//! authenticated or not.

use axum::extract::{Path, State};
use folio_api::{ApiError, ApiResponse};
use folio_auth::{BearerAuth, OptionalBearerAuth, keys};
use folio_storage::{AuditAction, NewProject, Project, ProjectChanges, Visibility};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::{JsonBody, non_blank, parse_id};
use crate::audit::RequestMeta;
use crate::cache::{cache_aside, invalidate};
use crate::error::storage_error;
use crate::server::AppState;

const PROJECT_NOT_FOUND: &str = "Project not found";
const PROJECT_FORBIDDEN: &str = "Forbidden - you do not have access to this project";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub github_link: Option<String>,
    pub preview_link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub visibility: Option<String>,
}

impl CreateProjectRequest {
    fn into_new_project(self, owner_id: Uuid) -> Result<NewProject, ApiError> {
        let (Some(title), Some(description), Some(github_link), Some(preview_link), Some(visibility)) = (
            non_blank(self.title),
            non_blank(self.description),
            non_blank(self.github_link),
            non_blank(self.preview_link),
            non_blank(self.visibility),
        ) else {
            return Err(ApiError::fail("Missing required fields"));
        };
        let visibility = visibility
            .parse::<Visibility>()
            .map_err(ApiError::fail)?;

        Ok(NewProject {
            owner_id,
            title,
            description,
            github_link,
            preview_link,
            tags: self.tags,
            visibility,
        })
    }
}

/// Partial project update as sent by the client.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub github_link: Option<String>,
    pub preview_link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<String>,
}

impl UpdateProjectRequest {
    fn into_changes(self) -> Result<ProjectChanges, ApiError> {
        let visibility = self
            .visibility
            .map(|v| v.parse::<Visibility>())
            .transpose()
            .map_err(ApiError::fail)?;

        Ok(ProjectChanges {
            title: self.title,
            description: self.description,
            github_link: self.github_link,
            preview_link: self.preview_link,
            tags: self.tags,
            visibility,
        })
    }
}

/// Loads a project the caller owns, or reports why not.
async fn owned_project(state: &AppState, raw_id: &str, caller: Uuid) -> Result<Project, ApiError> {
    let id = parse_id(raw_id, PROJECT_NOT_FOUND)?;
    let project = state
        .storage
        .find_project(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::not_found(PROJECT_NOT_FOUND))?;
    if project.owner_id != caller {
        return Err(ApiError::forbidden(PROJECT_FORBIDDEN));
    }
    Ok(project)
}

fn projects_response(projects: Vec<Project>) -> ApiResponse<Value> {
    ApiResponse::ok(
        "Projects retrieved successfully",
        json!({ "projects": projects }),
    )
}

/// Every project of the caller, read through the cache.
pub async fn list_own_projects(
    State(state): State<AppState>,
    BearerAuth(ctx): BearerAuth,
) -> Result<ApiResponse<Value>, ApiError> {
    let owner_id = ctx.user_id();
    let projects = cache_aside(
        state.cache.as_ref(),
        &keys::user_projects(owner_id),
        state.cache_config.projects_ttl,
        || async { state.storage.list_projects(owner_id, None).await.map(Some) },
    )
    .await
    .map_err(storage_error)?
    .unwrap_or_default();

    Ok(projects_response(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    auth: OptionalBearerAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let id = parse_id(&id, PROJECT_NOT_FOUND)?;
    let project = state
        .storage
        .find_project(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::not_found(PROJECT_NOT_FOUND))?;

    if !project.is_visible_to(auth.user_id()) {
        return Err(ApiError::forbidden(PROJECT_FORBIDDEN));
    }

    Ok(ApiResponse::ok(
        "Project retrieved successfully",
        json!({ "project": project }),
    ))
}

pub async fn list_public_projects(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let owner_id = parse_id(&user_id, "User not found")?;
    let projects = state
        .storage
        .list_projects(owner_id, Some(Visibility::Public))
        .await
        .map_err(storage_error)?;
    Ok(projects_response(projects))
}

pub async fn list_private_projects(
    State(state): State<AppState>,
    auth: OptionalBearerAuth,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let owner_id = parse_id(&user_id, "User not found")?;
    if auth.user_id() != Some(owner_id) {
        return Err(ApiError::forbidden(PROJECT_FORBIDDEN));
    }
    let projects = state
        .storage
        .list_projects(owner_id, Some(Visibility::Private))
        .await
        .map_err(storage_error)?;
    Ok(projects_response(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    meta: RequestMeta,
    BearerAuth(ctx): BearerAuth,
    JsonBody(body): JsonBody<CreateProjectRequest>,
) -> Result<ApiResponse<Value>, ApiError> {
    let owner_id = ctx.user_id();
    let project = state
        .storage
        .create_project(body.into_new_project(owner_id)?)
        .await
        .map_err(storage_error)?;

    invalidate(state.cache.as_ref(), &keys::user_projects(owner_id)).await;
    state
        .audit
        .record(owner_id, AuditAction::ProjectCreate, project.id, &meta)
        .await
        .map_err(storage_error)?;

    Ok(ApiResponse::created(
        "Project created successfully",
        json!({ "project": project }),
    ))
}

pub async fn update_project(
    State(state): State<AppState>,
    meta: RequestMeta,
    BearerAuth(ctx): BearerAuth,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateProjectRequest>,
) -> Result<ApiResponse<Value>, ApiError> {
    let owner_id = ctx.user_id();
    let existing = owned_project(&state, &id, owner_id).await?;
    let project = state
        .storage
        .update_project(existing.id, body.into_changes()?)
        .await
        .map_err(storage_error)?;

    invalidate(state.cache.as_ref(), &keys::user_projects(owner_id)).await;
    state
        .audit
        .record(owner_id, AuditAction::ProjectUpdate, project.id, &meta)
        .await
        .map_err(storage_error)?;

    Ok(ApiResponse::ok(
        "Project updated successfully",
        json!({ "project": project }),
    ))
}

pub async fn delete_project(
    State(state): State<AppState>,
    meta: RequestMeta,
    BearerAuth(ctx): BearerAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let owner_id = ctx.user_id();
    let project = owned_project(&state, &id, owner_id).await?;
    state
        .storage
        .delete_project(project.id)
        .await
        .map_err(storage_error)?;

    invalidate(state.cache.as_ref(), &keys::user_projects(owner_id)).await;
    state
        .audit
        .record(owner_id, AuditAction::ProjectDelete, project.id, &meta)
        .await
        .map_err(storage_error)?;

    Ok(ApiResponse::message("Project deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(visibility: Option<&str>) -> CreateProjectRequest {
        CreateProjectRequest {
            title: Some("engine".into()),
            description: Some("d".into()),
            github_link: Some("https://github.com/a/engine".into()),
            preview_link: Some("https://engine.dev".into()),
            tags: vec!["rust".into()],
            visibility: visibility.map(String::from),
        }
    }

    #[test]
    fn missing_fields_fail() {
        let err = request(None).into_new_project(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.public_message(), "Missing required fields");
        assert_eq!(err.envelope_status(), folio_api::ResponseStatus::Fail);
    }

    #[test]
    fn unknown_visibility_fails() {
        let err = request(Some("SECRET")).into_new_project(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.envelope_status(), folio_api::ResponseStatus::Fail);
    }

    #[test]
    fn builds_new_project() {
        let owner = Uuid::new_v4();
        let project = request(Some("PRIVATE")).into_new_project(owner).unwrap();
        assert_eq!(project.owner_id, owner);
        assert_eq!(project.visibility, Visibility::Private);
        assert_eq!(project.tags, vec!["rust".to_string()]);
    }

    #[test]
    fn update_with_unknown_visibility_fails() {
        let body = UpdateProjectRequest {
            visibility: Some("hidden".into()),
            ..Default::default()
        };
        let err = body.into_changes().unwrap_err();
        assert_eq!(err.envelope_status(), folio_api::ResponseStatus::Fail);
        assert_eq!(err.public_message(), "unknown visibility 'hidden'");
    }

    #[test]
    fn update_keeps_absent_fields_unset() {
        let body = UpdateProjectRequest {
            title: Some("renamed".into()),
            visibility: Some("PUBLIC".into()),
            ..Default::default()
        };
        let changes = body.into_changes().unwrap();
        assert_eq!(changes.title.as_deref(), Some("renamed"));
        assert_eq!(changes.visibility, Some(Visibility::Public));
        assert!(changes.description.is_none());
        assert!(changes.tags.is_none());
    }
}
