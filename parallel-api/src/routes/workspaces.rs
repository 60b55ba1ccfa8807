/// Workspace endpoints
///
/// # Endpoints
///
/// - `GET /v1/workspaces` - Workspaces the actor belongs to
/// - `POST /v1/workspaces` - Create a workspace (creator becomes ADMIN)
/// - `GET /v1/workspaces/:id` - Workspace with its members
/// - `PATCH /v1/workspaces/:id` - Rename or change image (ADMIN)
/// - `DELETE /v1/workspaces/:id` - Delete with everything in it (ADMIN)
/// - `POST /v1/workspaces/:id/join` - Join with an invite code
/// - `POST /v1/workspaces/:id/invite-code` - Replace the invite code (ADMIN)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use parallel_shared::{
    auth::session::RequestContext,
    models::workspace::Workspace,
    services::workspaces::{self, CreateWorkspaceInput, UpdateWorkspaceInput, WorkspaceDetail},
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub invite_code: String,
}

pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Json<Vec<Workspace>>> {
    Ok(Json(workspaces::list(&state.db, &ctx).await?))
}

pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<CreateWorkspaceInput>,
) -> ApiResult<(StatusCode, Json<Workspace>)> {
    let workspace = workspaces::create(&state.db, &ctx, req).await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

pub async fn get_workspace(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<WorkspaceDetail>> {
    Ok(Json(workspaces::get(&state.db, &ctx, id).await?))
}

pub async fn update_workspace(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateWorkspaceInput>,
) -> ApiResult<Json<Workspace>> {
    Ok(Json(workspaces::update(&state.db, &ctx, id, req).await?))
}

pub async fn delete_workspace(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    workspaces::delete(&state.db, &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Join a workspace
///
/// ```text
/// POST /v1/workspaces/:id/join
/// { "invite_code": "a1B2c3D4e5" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown workspace or wrong code
/// - `409 Conflict`: Already a member
pub async fn join_workspace(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<JoinRequest>,
) -> ApiResult<Json<Workspace>> {
    Ok(Json(workspaces::join(&state.db, &ctx, id, &req.invite_code).await?))
}

pub async fn reset_invite_code(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Workspace>> {
    Ok(Json(workspaces::reset_invite_code(&state.db, &ctx, id).await?))
}
