/// Analytics operations
///
/// "now" is read once per call and every count is taken against it.

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::projects::authorize_project;
use crate::analytics::{self, AnalyticsScope, TaskAnalytics};
use crate::auth::authorization::{require_permission, ResourcePermission};
use crate::auth::session::RequestContext;
use crate::error::ServiceResult;

/// Analytics for one project
pub async fn for_project(
    pool: &PgPool,
    ctx: &RequestContext,
    project_id: Uuid,
    offset: FixedOffset,
) -> ServiceResult<TaskAnalytics> {
    for_project_at(pool, ctx, project_id, offset, Utc::now()).await
}

pub async fn for_project_at(
    pool: &PgPool,
    ctx: &RequestContext,
    project_id: Uuid,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> ServiceResult<TaskAnalytics> {
    let actor = ctx.actor()?;
    authorize_project(pool, ctx, project_id, ResourcePermission::Read).await?;

    Ok(analytics::compute(pool, AnalyticsScope::Project(project_id), actor.id, now, offset).await?)
}

/// Analytics for a whole workspace
pub async fn for_workspace(
    pool: &PgPool,
    ctx: &RequestContext,
    workspace_id: Uuid,
    offset: FixedOffset,
) -> ServiceResult<TaskAnalytics> {
    for_workspace_at(pool, ctx, workspace_id, offset, Utc::now()).await
}

pub async fn for_workspace_at(
    pool: &PgPool,
    ctx: &RequestContext,
    workspace_id: Uuid,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> ServiceResult<TaskAnalytics> {
    let actor = ctx.actor()?;
    require_permission(pool, workspace_id, actor.id, ResourcePermission::Read).await?;

    Ok(analytics::compute(
        pool,
        AnalyticsScope::Workspace(workspace_id),
        actor.id,
        now,
        offset,
    )
    .await?)
}
