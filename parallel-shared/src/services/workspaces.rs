/// Workspace operations
///
/// | Operation          | Requirement |
/// |--------------------|-------------|
/// | create, list       | signed in   |
/// | get                | member      |
/// | update, delete     | admin       |
/// | reset invite code  | admin       |
/// | join               | valid code  |

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{clean_name, clean_text};
use crate::auth::authorization::{require_permission, ResourcePermission};
use crate::auth::invite_code::{generate_invite_code, is_valid_invite_code};
use crate::auth::session::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::membership::{CreateMembership, MemberProfile, Membership, MembershipRole};
use crate::models::present;
use crate::models::workspace::{CreateWorkspace, UpdateWorkspace, Workspace};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkspaceInput {
    pub name: String,

    /// Image URL, uploaded beforehand or supplied directly
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkspaceInput {
    #[serde(default)]
    pub name: Option<String>,

    /// `null` clears the image
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

/// A workspace with its member list
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceDetail {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub members: Vec<MemberProfile>,
}

/// Creates a workspace; the creator becomes its first ADMIN
pub async fn create(
    pool: &PgPool,
    ctx: &RequestContext,
    input: CreateWorkspaceInput,
) -> ServiceResult<Workspace> {
    let actor = ctx.actor()?;
    let name = clean_name(&input.name, "Name")?;

    let mut tx = pool.begin().await?;

    let workspace = Workspace::create(
        &mut *tx,
        CreateWorkspace {
            name,
            user_id: actor.id,
            image: clean_text(input.image),
            invite_code: generate_invite_code(),
        },
    )
    .await?;

    Membership::create(
        &mut *tx,
        CreateMembership {
            workspace_id: workspace.id,
            user_id: actor.id,
            role: MembershipRole::Admin,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        workspace_id = %workspace.id,
        user_id = %actor.id,
        correlation_id = %ctx.correlation_id,
        "Workspace created"
    );
    Ok(workspace)
}

/// Lists the actor's workspaces; empty when they belong to none
pub async fn list(pool: &PgPool, ctx: &RequestContext) -> ServiceResult<Vec<Workspace>> {
    let actor = ctx.actor()?;
    Ok(Workspace::list_by_member(pool, actor.id).await?)
}

/// Gets a workspace with its members
pub async fn get(pool: &PgPool, ctx: &RequestContext, id: Uuid) -> ServiceResult<WorkspaceDetail> {
    let actor = ctx.actor()?;
    require_permission(pool, id, actor.id, ResourcePermission::Read).await?;

    let workspace = Workspace::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Workspace"))?;
    let members = Membership::list_by_workspace(pool, id).await?;

    Ok(WorkspaceDetail { workspace, members })
}

pub async fn update(
    pool: &PgPool,
    ctx: &RequestContext,
    id: Uuid,
    input: UpdateWorkspaceInput,
) -> ServiceResult<Workspace> {
    let actor = ctx.actor()?;
    require_permission(pool, id, actor.id, ResourcePermission::Manage).await?;

    let data = UpdateWorkspace {
        name: input.name.as_deref().map(|n| clean_name(n, "Name")).transpose()?,
        image: input.image.map(clean_text),
    };

    let workspace = Workspace::update(pool, id, data)
        .await?
        .ok_or_else(|| ServiceError::not_found("Workspace"))?;

    tracing::info!(workspace_id = %id, "Workspace updated");
    Ok(workspace)
}

/// Deletes a workspace with all of its projects, tasks and memberships
pub async fn delete(pool: &PgPool, ctx: &RequestContext, id: Uuid) -> ServiceResult<()> {
    let actor = ctx.actor()?;
    require_permission(pool, id, actor.id, ResourcePermission::Manage).await?;

    if !Workspace::delete(pool, id).await? {
        return Err(ServiceError::not_found("Workspace"));
    }

    tracing::info!(workspace_id = %id, user_id = %actor.id, "Workspace deleted");
    Ok(())
}

/// Replaces the invite code; the old one stops working immediately
pub async fn reset_invite_code(
    pool: &PgPool,
    ctx: &RequestContext,
    id: Uuid,
) -> ServiceResult<Workspace> {
    let actor = ctx.actor()?;
    require_permission(pool, id, actor.id, ResourcePermission::Manage).await?;

    let workspace = Workspace::reset_invite_code(pool, id, &generate_invite_code())
        .await?
        .ok_or_else(|| ServiceError::not_found("Workspace"))?;

    tracing::info!(workspace_id = %id, "Invite code reset");
    Ok(workspace)
}

/// Joins a workspace as MEMBER by presenting its current invite code
///
/// A stale or wrong code is `NOT_FOUND`; joining twice is `ALREADY_EXISTS`.
pub async fn join(
    pool: &PgPool,
    ctx: &RequestContext,
    id: Uuid,
    invite_code: &str,
) -> ServiceResult<Workspace> {
    let actor = ctx.actor()?;
    let invite_code = invite_code.trim();

    if !is_valid_invite_code(invite_code) {
        return Err(ServiceError::not_found("Workspace"));
    }

    let workspace = Workspace::find_by_id_and_invite_code(pool, id, invite_code)
        .await?
        .ok_or_else(|| ServiceError::not_found("Workspace"))?;

    if Membership::find(pool, id, actor.id).await?.is_some() {
        return Err(ServiceError::AlreadyExists(
            "Already a member of this workspace".to_string(),
        ));
    }

    Membership::create(
        pool,
        CreateMembership {
            workspace_id: id,
            user_id: actor.id,
            role: MembershipRole::Member,
        },
    )
    .await?;

    tracing::info!(workspace_id = %id, user_id = %actor.id, "Joined workspace");
    Ok(workspace)
}
