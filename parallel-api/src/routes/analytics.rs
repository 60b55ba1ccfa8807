/// Analytics endpoints
///
/// Month-over-month task counts, computed against the reporting time zone.

use crate::{app::AppState, error::ApiResult, extract::ApiPath};
use axum::{extract::State, Extension, Json};
use parallel_shared::{
    analytics::TaskAnalytics, auth::session::RequestContext, services::analytics,
};
use uuid::Uuid;

/// `GET /v1/workspaces/:id/analytics`
pub async fn workspace_analytics(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskAnalytics>> {
    Ok(Json(
        analytics::for_workspace(&state.db, &ctx, id, state.reporting_offset).await?,
    ))
}

/// `GET /v1/projects/:id/analytics`
pub async fn project_analytics(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskAnalytics>> {
    Ok(Json(
        analytics::for_project(&state.db, &ctx, id, state.reporting_offset).await?,
    ))
}
