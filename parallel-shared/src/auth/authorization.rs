/// Workspace-scoped authorization guard
///
/// Access is decided by membership and role only; there is no per-resource
/// ACL.
///
/// # Permission Model
///
/// 1. **Membership**: the actor must be a member of the resource's workspace.
///    Used for every read and for project and task operations (a task or
///    project is resolved to its workspace first).
/// 2. **Admin**: the actor must hold ADMIN. Used for workspace mutation,
///    invite-code reset, member removal and role changes.
///
/// A missing membership is reported as `NotMember` whether or not the
/// workspace exists, so non-members cannot probe for workspaces.
///
/// # Example
///
/// ```no_run
/// use parallel_shared::auth::authorization::{require_permission, ResourcePermission};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, workspace_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let membership =
///     require_permission(&pool, workspace_id, user_id, ResourcePermission::Manage).await?;
/// println!("acting as {}", membership.role);
/// # Ok(())
/// # }
/// ```

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::membership::{Membership, MembershipRole};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is not a member of the workspace
    #[error("Not a member of workspace {0}")]
    NotMember(Uuid),

    /// User doesn't have the required role
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole {
        required: MembershipRole,
        actual: MembershipRole,
    },

    /// The operation would leave the workspace without members
    #[error("Workspace {0} must keep at least one member")]
    LastMember(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Permission levels for workspace resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcePermission {
    /// Read anything in the workspace
    Read,

    /// Create, update and delete projects and tasks
    Write,

    /// Administer the workspace and its members
    Manage,
}

impl ResourcePermission {
    /// Gets the minimum role required for this permission
    pub fn min_role(&self) -> MembershipRole {
        match self {
            ResourcePermission::Read | ResourcePermission::Write => MembershipRole::Member,
            ResourcePermission::Manage => MembershipRole::Admin,
        }
    }
}

/// Decides access from an already loaded membership
///
/// This is the whole policy; the async helpers below only load the
/// membership and call it.
pub fn check_role(
    membership: Option<Membership>,
    workspace_id: Uuid,
    required: MembershipRole,
) -> Result<Membership, AuthzError> {
    let membership = membership.ok_or(AuthzError::NotMember(workspace_id))?;

    if !membership.role.has_permission(&required) {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: membership.role,
        });
    }

    Ok(membership)
}

/// Requires at least `required_role` in the workspace
pub async fn require_role<'e, E>(
    executor: E,
    workspace_id: Uuid,
    user_id: Uuid,
    required_role: MembershipRole,
) -> Result<Membership, AuthzError>
where
    E: PgExecutor<'e>,
{
    let membership = Membership::find(executor, workspace_id, user_id).await?;
    let result = check_role(membership, workspace_id, required_role);

    if let Err(ref err) = result {
        tracing::debug!(
            workspace_id = %workspace_id,
            user_id = %user_id,
            error = %err,
            "Authorization denied"
        );
    }

    result
}

/// Requires the role behind a permission level
pub async fn require_permission<'e, E>(
    executor: E,
    workspace_id: Uuid,
    user_id: Uuid,
    permission: ResourcePermission,
) -> Result<Membership, AuthzError>
where
    E: PgExecutor<'e>,
{
    require_role(executor, workspace_id, user_id, permission.min_role()).await
}

/// Rejects member removal and role changes in a single-member workspace
///
/// The check looks at the workspace-wide count only, not at who the target
/// is.
pub fn ensure_not_last_member(member_count: i64, workspace_id: Uuid) -> Result<(), AuthzError> {
    if member_count <= 1 {
        return Err(AuthzError::LastMember(workspace_id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn membership(role: MembershipRole) -> Membership {
        Membership {
            workspace_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_resource_permission_min_role() {
        assert_eq!(ResourcePermission::Read.min_role(), MembershipRole::Member);
        assert_eq!(ResourcePermission::Write.min_role(), MembershipRole::Member);
        assert_eq!(ResourcePermission::Manage.min_role(), MembershipRole::Admin);
    }

    #[test]
    fn test_non_member_is_rejected() {
        let workspace_id = Uuid::new_v4();
        let result = check_role(None, workspace_id, MembershipRole::Member);

        assert!(matches!(result, Err(AuthzError::NotMember(id)) if id == workspace_id));
    }

    #[test]
    fn test_member_cannot_administer() {
        let result = check_role(
            Some(membership(MembershipRole::Member)),
            Uuid::new_v4(),
            MembershipRole::Admin,
        );

        assert!(matches!(
            result,
            Err(AuthzError::InsufficientRole {
                required: MembershipRole::Admin,
                actual: MembershipRole::Member,
            })
        ));
    }

    #[test]
    fn test_admin_passes_every_check() {
        for required in [MembershipRole::Member, MembershipRole::Admin] {
            let result = check_role(Some(membership(MembershipRole::Admin)), Uuid::new_v4(), required);
            assert!(result.is_ok());
        }
    }

    #[test]
    fn test_last_member_guard() {
        let workspace_id = Uuid::new_v4();

        assert!(matches!(
            ensure_not_last_member(1, workspace_id),
            Err(AuthzError::LastMember(_))
        ));
        assert!(ensure_not_last_member(0, workspace_id).is_err());
        assert!(ensure_not_last_member(2, workspace_id).is_ok());
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::InsufficientRole {
            required: MembershipRole::Admin,
            actual: MembershipRole::Member,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient permissions: requires ADMIN, has MEMBER"
        );
    }
}
