// ABOUTME: HTTP request handlers for the named plan-document resources
// ABOUTME: One set of generic handlers, parameterized by the resource each route is mounted for

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use plankit_storage::{decode, NamedResource, StorageError, StoredRow};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::auth::{CurrentUser, EditorUser};
use crate::error::ApiResult;
use crate::state::AppState;

/// Natural key of a single-entry field
const FIELD_NAME: &str = "field_name";

pub async fn list_items(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
    Extension(resource): Extension<NamedResource>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<StoredRow>>> {
    info!("Listing {} for project {}", resource.path(), project_id);

    let schema = state.registry.named(resource);
    Ok(Json(state.rows.list(schema, &project_id).await?))
}

pub async fn create_item(
    EditorUser(_): EditorUser,
    State(state): State<AppState>,
    Extension(resource): Extension<NamedResource>,
    Path(project_id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResult<Json<StoredRow>> {
    info!("Creating {} item in project {}", resource.path(), project_id);

    let schema = state.registry.named(resource);
    let values = decode(schema, &payload)?;
    Ok(Json(state.rows.create(schema, &project_id, &values).await?))
}

pub async fn update_item(
    EditorUser(_): EditorUser,
    State(state): State<AppState>,
    Extension(resource): Extension<NamedResource>,
    Path((project_id, item_id)): Path<(String, String)>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResult<Json<StoredRow>> {
    info!("Updating {} item {} in project {}", resource.path(), item_id, project_id);

    let schema = state.registry.named(resource);
    let values = decode(schema, &payload)?;
    Ok(Json(
        state
            .rows
            .update(schema, &project_id, &item_id, &values)
            .await?,
    ))
}

pub async fn delete_item(
    EditorUser(_): EditorUser,
    State(state): State<AppState>,
    Extension(resource): Extension<NamedResource>,
    Path((project_id, item_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    info!("Deleting {} item {} in project {}", resource.path(), item_id, project_id);

    let schema = state.registry.named(resource);
    state.rows.delete(schema, &project_id, &item_id).await?;
    Ok(Json(json!({"message": "Item deleted successfully"})))
}

/// Project details are a single record per project; `null` until created
pub async fn get_project_details(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Option<StoredRow>>> {
    info!("Getting project details for {}", project_id);

    let schema = state.registry.named(NamedResource::ProjectDetails);
    Ok(Json(state.rows.find_first(schema, &project_id).await?))
}

pub async fn upsert_single_entry(
    EditorUser(_): EditorUser,
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResult<Json<StoredRow>> {
    let schema = state.registry.named(NamedResource::SingleEntry);
    let values = decode(schema, &payload)?;
    let field_name = values
        .get(FIELD_NAME)
        .and_then(|value| value.as_str())
        .unwrap_or_default();
    info!("Saving single entry {} for project {}", field_name, project_id);

    Ok(Json(
        state
            .rows
            .upsert_by(schema, &project_id, FIELD_NAME, &values)
            .await?,
    ))
}

pub async fn get_single_entry(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
    Path((project_id, field_name)): Path<(String, String)>,
) -> ApiResult<Json<Option<StoredRow>>> {
    info!("Getting single entry {} for project {}", field_name, project_id);

    let schema = state.registry.named(NamedResource::SingleEntry);
    Ok(Json(
        state
            .rows
            .find_by(schema, &project_id, FIELD_NAME, &field_name)
            .await?,
    ))
}

/// Delete one single-entry field. `entry` is tried as an item id first,
/// then as a field name.
pub async fn delete_single_entry(
    EditorUser(_): EditorUser,
    State(state): State<AppState>,
    Path((project_id, entry)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    info!("Deleting single entry {} for project {}", entry, project_id);

    let schema = state.registry.named(NamedResource::SingleEntry);
    match state.rows.delete(schema, &project_id, &entry).await {
        Err(StorageError::NotFound(_)) => {
            state
                .rows
                .delete_by(schema, &project_id, FIELD_NAME, &entry)
                .await?
        }
        result => result?,
    }
    Ok(Json(json!({"message": "Item deleted successfully"})))
}
