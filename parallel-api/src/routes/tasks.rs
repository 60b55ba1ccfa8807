/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/tasks?workspace_id=&project_id=&assignee_id=&status=&search=&due_date=`
/// - `POST /v1/tasks` - Create at the head of its column
/// - `POST /v1/tasks/reorder` - Apply a drag-and-drop batch
/// - `GET|PATCH|DELETE /v1/tasks/:id`
/// - `POST /v1/workspaces/:id/board/:status/rebalance` - Renumber one column
///
/// Lists come back in board display order: highest position first, ties
/// broken by creation time.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use parallel_shared::{
    auth::session::RequestContext,
    board::Reposition,
    models::task::{Task, TaskStatus},
    services::tasks::{self, CreateTaskInput, ListTasksInput, TaskView, UpdateTaskInput},
};
use serde::Deserialize;
use uuid::Uuid;

/// Bulk reorder request
///
/// ```json
/// { "tasks": [ { "id": "uuid", "status": "IN_PROGRESS", "position": 2500 } ] }
/// ```
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub tasks: Vec<Reposition>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiQuery(query): ApiQuery<ListTasksInput>,
) -> ApiResult<Json<Vec<TaskView>>> {
    Ok(Json(tasks::list(&state.db, &ctx, query).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let task = tasks::create(&state.db, &ctx, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(tasks::get(&state.db, &ctx, id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskInput>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(tasks::update(&state.db, &ctx, id, req).await?))
}

/// Deletes a task and returns it
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(tasks::delete(&state.db, &ctx, id).await?))
}

/// Apply a drag-and-drop batch atomically
///
/// # Errors
///
/// - `400 Bad Request`: Empty batch or duplicate task IDs
/// - `403 Forbidden`: Not a member, or the batch spans workspaces
/// - `404 Not Found`: The first task does not exist
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(tasks::bulk_reorder(&state.db, &ctx, req.tasks).await?))
}

pub async fn rebalance_column(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath((workspace_id, status)): ApiPath<(Uuid, String)>,
) -> ApiResult<Json<Vec<Task>>> {
    let status: TaskStatus = status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown task status: {}", status)))?;

    Ok(Json(tasks::rebalance(&state.db, &ctx, workspace_id, status).await?))
}
