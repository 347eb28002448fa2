// ABOUTME: HTTP request handlers for generic section tables
// ABOUTME: Resolves (section, table_name) through the registry and dispatches row operations

use axum::{
    extract::{Path, State},
    Json,
};
use plankit_storage::{decode, encode, SectionInfo, SectionRow};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::auth::{CurrentUser, EditorUser};
use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for section row writes
#[derive(Debug, Deserialize)]
pub struct SectionPayload {
    pub data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct TablePath {
    pub project_id: String,
    pub section: String,
    pub table_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RowPath {
    pub project_id: String,
    pub section: String,
    pub table_name: String,
    pub item_id: String,
}

/// Every declared section table with its columns
pub async fn list_sections(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
) -> Json<Vec<SectionInfo>> {
    Json(state.registry.catalogue())
}

pub async fn create_row(
    EditorUser(_): EditorUser,
    State(state): State<AppState>,
    Path(path): Path<TablePath>,
    Json(payload): Json<SectionPayload>,
) -> ApiResult<Json<SectionRow>> {
    info!(
        "Creating {}/{} row in project {}",
        path.section, path.table_name, path.project_id
    );

    let table = state.registry.section(&path.section, &path.table_name)?;
    let values = decode(&table.schema, &payload.data)?;
    let row = state
        .rows
        .create(&table.schema, &path.project_id, &values)
        .await?;

    Ok(Json(encode(&path.section, &path.table_name, row)))
}

pub async fn list_rows(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
    Path(path): Path<TablePath>,
) -> ApiResult<Json<Vec<SectionRow>>> {
    info!(
        "Listing {}/{} rows in project {}",
        path.section, path.table_name, path.project_id
    );

    let table = state.registry.section(&path.section, &path.table_name)?;
    let rows = state.rows.list(&table.schema, &path.project_id).await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| encode(&path.section, &path.table_name, row))
            .collect(),
    ))
}

pub async fn update_row(
    EditorUser(_): EditorUser,
    State(state): State<AppState>,
    Path(path): Path<RowPath>,
    Json(payload): Json<SectionPayload>,
) -> ApiResult<Json<SectionRow>> {
    info!(
        "Updating {}/{} row {} in project {}",
        path.section, path.table_name, path.item_id, path.project_id
    );

    let table = state.registry.section(&path.section, &path.table_name)?;
    let values = decode(&table.schema, &payload.data)?;
    let row = state
        .rows
        .update(&table.schema, &path.project_id, &path.item_id, &values)
        .await?;

    Ok(Json(encode(&path.section, &path.table_name, row)))
}

pub async fn delete_row(
    EditorUser(_): EditorUser,
    State(state): State<AppState>,
    Path(path): Path<RowPath>,
) -> ApiResult<Json<Value>> {
    info!(
        "Deleting {}/{} row {} in project {}",
        path.section, path.table_name, path.item_id, path.project_id
    );

    let table = state.registry.section(&path.section, &path.table_name)?;
    state
        .rows
        .delete(&table.schema, &path.project_id, &path.item_id)
        .await?;

    Ok(Json(json!({"message": "Item deleted successfully"})))
}
