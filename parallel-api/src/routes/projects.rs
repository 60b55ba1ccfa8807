/// Project endpoints
///
/// - `GET /v1/projects?workspace_id=` - Newest first
/// - `POST /v1/projects`
/// - `GET|PATCH|DELETE /v1/projects/:id`

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use parallel_shared::{
    auth::session::RequestContext,
    models::project::Project,
    services::projects::{self, CreateProjectInput, UpdateProjectInput},
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub workspace_id: Uuid,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiQuery(query): ApiQuery<ListProjectsQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(projects::list(&state.db, &ctx, query.workspace_id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(req): ApiJson<CreateProjectInput>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = projects::create(&state.db, &ctx, req).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(projects::get(&state.db, &ctx, id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateProjectInput>,
) -> ApiResult<Json<Project>> {
    Ok(Json(projects::update(&state.db, &ctx, id, req).await?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    projects::delete(&state.db, &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
