/// Workspace member endpoints
///
/// - `GET /v1/workspaces/:id/members`
/// - `DELETE /v1/workspaces/:id/members/:user_id` (ADMIN)
/// - `PATCH /v1/workspaces/:id/members/:user_id` (ADMIN)
///
/// Removing or re-roling is refused with `INVALID_OPERATION` while the
/// workspace has a single member.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use parallel_shared::{
    auth::session::RequestContext,
    models::membership::{MemberProfile, Membership},
    services::members::{self, UpdateRoleInput},
};
use uuid::Uuid;

pub async fn list_members(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<MemberProfile>>> {
    Ok(Json(members::list(&state.db, &ctx, workspace_id).await?))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath((workspace_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    members::remove(&state.db, &ctx, workspace_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath((workspace_id, user_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateRoleInput>,
) -> ApiResult<Json<Membership>> {
    Ok(Json(
        members::update_role(&state.db, &ctx, workspace_id, user_id, req).await?,
    ))
}
