/// Member operations
///
/// Listing needs membership; removal and role changes need ADMIN and are
/// refused while the workspace has a single member. Removing a member also
/// clears their task assignments in that workspace, in the same transaction.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::authorization::{
    ensure_not_last_member, require_permission, require_role, ResourcePermission,
};
use crate::auth::session::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::membership::{MemberProfile, Membership, MembershipRole};
use crate::models::task::Task;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleInput {
    pub role: MembershipRole,
}

pub async fn list(
    pool: &PgPool,
    ctx: &RequestContext,
    workspace_id: Uuid,
) -> ServiceResult<Vec<MemberProfile>> {
    let actor = ctx.actor()?;
    require_permission(pool, workspace_id, actor.id, ResourcePermission::Read).await?;

    Ok(Membership::list_by_workspace(pool, workspace_id).await?)
}

/// Removes a member from a workspace
pub async fn remove(
    pool: &PgPool,
    ctx: &RequestContext,
    workspace_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<()> {
    let actor = ctx.actor()?;
    let mut tx = pool.begin().await?;

    require_role(&mut *tx, workspace_id, actor.id, MembershipRole::Admin).await?;

    let count = Membership::count_by_workspace(&mut *tx, workspace_id).await?;
    ensure_not_last_member(count, workspace_id)?;

    if !Membership::delete(&mut *tx, workspace_id, user_id).await? {
        return Err(ServiceError::not_found("Member"));
    }
    let unassigned = Task::unassign(&mut *tx, workspace_id, user_id).await?;

    tx.commit().await?;

    tracing::info!(
        workspace_id = %workspace_id,
        user_id = %user_id,
        removed_by = %actor.id,
        unassigned,
        "Member removed"
    );
    Ok(())
}

/// Changes a member's role
pub async fn update_role(
    pool: &PgPool,
    ctx: &RequestContext,
    workspace_id: Uuid,
    user_id: Uuid,
    input: UpdateRoleInput,
) -> ServiceResult<Membership> {
    let actor = ctx.actor()?;
    let mut tx = pool.begin().await?;

    require_role(&mut *tx, workspace_id, actor.id, MembershipRole::Admin).await?;

    let count = Membership::count_by_workspace(&mut *tx, workspace_id).await?;
    ensure_not_last_member(count, workspace_id)?;

    let membership = Membership::update_role(&mut *tx, workspace_id, user_id, input.role)
        .await?
        .ok_or_else(|| ServiceError::not_found("Member"))?;

    tx.commit().await?;

    tracing::info!(
        workspace_id = %workspace_id,
        user_id = %user_id,
        role = %membership.role,
        "Member role changed"
    );
    Ok(membership)
}
