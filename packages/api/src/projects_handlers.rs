// ABOUTME: HTTP request handlers for projects
// ABOUTME: Project create, list, fetch and the cascading delete

use axum::{
    extract::{Path, State},
    Json,
};
use plankit_storage::{Project, ProjectCreateInput};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::{CurrentUser, EditorUser};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_project(
    EditorUser(user): EditorUser,
    State(state): State<AppState>,
    Json(input): Json<ProjectCreateInput>,
) -> ApiResult<Json<Project>> {
    info!("Creating project '{}' for {}", input.name, user.id);

    let project = state.project_storage.create_project(input, &user.id).await?;
    Ok(Json(project))
}

pub async fn list_projects(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Project>>> {
    info!("Listing projects");

    Ok(Json(state.project_storage.list_projects().await?))
}

pub async fn get_project(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Project>> {
    info!("Getting project: {}", project_id);

    Ok(Json(state.project_storage.get_project(&project_id).await?))
}

pub async fn delete_project(
    EditorUser(user): EditorUser,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Value>> {
    info!("User {} deleting project {}", user.id, project_id);

    state
        .project_storage
        .delete_with_content(&project_id, &state.registry)
        .await?;

    Ok(Json(json!({"message": "Project deleted successfully"})))
}
