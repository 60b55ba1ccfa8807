/// Membership model and database operations
///
/// This is the identity and membership store: a durable mapping of users to
/// workspaces with a role. Every authorization decision reads from here.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('ADMIN', 'MEMBER');
///
/// CREATE TABLE workspace_members (
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'MEMBER',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT workspace_members_pkey PRIMARY KEY (workspace_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **ADMIN**: mutate the workspace, reset the invite code, manage members
/// - **MEMBER**: read everything in the workspace, manage projects and tasks
///
/// An absent membership is a normal `None` result. Callers turn it into
/// `FORBIDDEN` so non-members cannot probe which workspaces exist.
///
/// # Example
///
/// ```no_run
/// use parallel_shared::models::membership::{Membership, CreateMembership, MembershipRole};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, workspace_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let membership = Membership::create(&pool, CreateMembership {
///     workspace_id,
///     user_id,
///     role: MembershipRole::Member,
/// }).await?;
///
/// let count = Membership::count_by_workspace(&pool, workspace_id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Roles a user can hold in a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipRole {
    /// Administrative capability over the workspace
    Admin,

    /// Plain member
    Member,
}

impl MembershipRole {
    /// Converts role to its stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Admin => "ADMIN",
            MembershipRole::Member => "MEMBER",
        }
    }

    /// Checks if this role satisfies the required role
    ///
    /// Hierarchy: Admin > Member
    pub fn has_permission(&self, required: &MembershipRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            MembershipRole::Admin => 2,
            MembershipRole::Member => 1,
        }
    }
}

impl std::fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership model representing a user-workspace relationship with role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership joined with the member's public profile
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberProfile {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub workspace_id: Uuid,
    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default = "default_role")]
    pub role: MembershipRole,
}

fn default_role() -> MembershipRole {
    MembershipRole::Member
}

const MEMBERSHIP_COLUMNS: &str = "workspace_id, user_id, role, created_at, updated_at";

impl Membership {
    /// Creates a new membership
    ///
    /// # Errors
    ///
    /// A duplicate (workspace, user) pair violates `workspace_members_pkey`.
    pub async fn create<'e, E>(executor: E, data: CreateMembership) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(&format!(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            MEMBERSHIP_COLUMNS
        ))
        .bind(data.workspace_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_one(executor)
        .await
    }

    /// Finds the membership of a user in a workspace
    pub async fn find<'e, E>(
        executor: E,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
            MEMBERSHIP_COLUMNS
        ))
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists the members of a workspace with their profiles
    ///
    /// Ordered by when they joined, then by user ID so the order is stable.
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<MemberProfile>, sqlx::Error> {
        sqlx::query_as::<_, MemberProfile>(
            r#"
            SELECT m.workspace_id, m.user_id, m.role, u.name, u.email, m.created_at
            FROM workspace_members m
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.workspace_id = $1
            ORDER BY m.created_at ASC, m.user_id ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await
    }

    /// Counts the members of a workspace
    pub async fn count_by_workspace<'e, E>(executor: E, workspace_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM workspace_members WHERE workspace_id = $1")
            .bind(workspace_id)
            .fetch_one(executor)
            .await
    }

    /// Updates a member's role
    ///
    /// Returns `None` if the membership doesn't exist.
    pub async fn update_role<'e, E>(
        executor: E,
        workspace_id: Uuid,
        user_id: Uuid,
        role: MembershipRole,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(&format!(
            r#"
            UPDATE workspace_members
            SET role = $3, updated_at = NOW()
            WHERE workspace_id = $1 AND user_id = $2
            RETURNING {}
            "#,
            MEMBERSHIP_COLUMNS
        ))
        .bind(workspace_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(executor)
        .await
    }

    /// Removes a membership
    ///
    /// Returns true if a row was deleted.
    pub async fn delete<'e, E>(executor: E, workspace_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("DELETE FROM workspace_members WHERE workspace_id = $1 AND user_id = $2")
                .bind(workspace_id)
                .bind(user_id)
                .execute(executor)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(MembershipRole::Admin.has_permission(&MembershipRole::Admin));
        assert!(MembershipRole::Admin.has_permission(&MembershipRole::Member));
        assert!(MembershipRole::Member.has_permission(&MembershipRole::Member));
        assert!(!MembershipRole::Member.has_permission(&MembershipRole::Admin));
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&MembershipRole::Admin).unwrap(), "\"ADMIN\"");
        let role: MembershipRole = serde_json::from_str("\"MEMBER\"").unwrap();
        assert_eq!(role, MembershipRole::Member);
        assert_eq!(MembershipRole::Member.to_string(), "MEMBER");
    }

    #[test]
    fn test_create_membership_defaults_to_member() {
        let data: CreateMembership = serde_json::from_value(serde_json::json!({
            "workspace_id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
        }))
        .unwrap();

        assert_eq!(data.role, MembershipRole::Member);
    }
}
