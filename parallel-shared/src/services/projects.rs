/// Project operations
///
/// All of them need membership in the project's workspace. For operations
/// on an existing project the project is looked up first, so a missing
/// project is `NOT_FOUND` and a foreign one is `FORBIDDEN`.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{clean_name, clean_text};
use crate::auth::authorization::{require_permission, ResourcePermission};
use crate::auth::session::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::present;
use crate::models::project::{CreateProject, Project, UpdateProject};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectInput {
    pub workspace_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

/// Loads a project and checks the actor may act on it
pub(crate) async fn authorize_project(
    pool: &PgPool,
    ctx: &RequestContext,
    id: Uuid,
    permission: ResourcePermission,
) -> ServiceResult<Project> {
    let actor = ctx.actor()?;

    let project = Project::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Project"))?;
    require_permission(pool, project.workspace_id, actor.id, permission).await?;

    Ok(project)
}

pub async fn create(
    pool: &PgPool,
    ctx: &RequestContext,
    input: CreateProjectInput,
) -> ServiceResult<Project> {
    let actor = ctx.actor()?;
    require_permission(pool, input.workspace_id, actor.id, ResourcePermission::Write).await?;

    let project = Project::create(
        pool,
        CreateProject {
            name: clean_name(&input.name, "Name")?,
            image: clean_text(input.image),
            workspace_id: input.workspace_id,
        },
    )
    .await?;

    tracing::info!(
        project_id = %project.id,
        workspace_id = %project.workspace_id,
        "Project created"
    );
    Ok(project)
}

/// Lists a workspace's projects, newest first
pub async fn list(
    pool: &PgPool,
    ctx: &RequestContext,
    workspace_id: Uuid,
) -> ServiceResult<Vec<Project>> {
    let actor = ctx.actor()?;
    require_permission(pool, workspace_id, actor.id, ResourcePermission::Read).await?;

    Ok(Project::list_by_workspace(pool, workspace_id).await?)
}

pub async fn get(pool: &PgPool, ctx: &RequestContext, id: Uuid) -> ServiceResult<Project> {
    authorize_project(pool, ctx, id, ResourcePermission::Read).await
}

pub async fn update(
    pool: &PgPool,
    ctx: &RequestContext,
    id: Uuid,
    input: UpdateProjectInput,
) -> ServiceResult<Project> {
    authorize_project(pool, ctx, id, ResourcePermission::Write).await?;

    let data = UpdateProject {
        name: input.name.as_deref().map(|n| clean_name(n, "Name")).transpose()?,
        image: input.image.map(clean_text),
    };

    let project = Project::update(pool, id, data)
        .await?
        .ok_or_else(|| ServiceError::not_found("Project"))?;

    tracing::info!(project_id = %id, "Project updated");
    Ok(project)
}

/// Deletes a project together with its tasks
pub async fn delete(pool: &PgPool, ctx: &RequestContext, id: Uuid) -> ServiceResult<()> {
    authorize_project(pool, ctx, id, ResourcePermission::Write).await?;

    if !Project::delete(pool, id).await? {
        return Err(ServiceError::not_found("Project"));
    }

    tracing::info!(project_id = %id, "Project deleted");
    Ok(())
}
