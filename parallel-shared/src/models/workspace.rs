/// Workspace model and database operations
///
/// A workspace is the tenancy root. Projects, tasks and memberships are owned
/// by it and are removed by foreign-key cascade when it is deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE workspaces (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
///     image TEXT,
///     invite_code TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT workspaces_invite_code_key UNIQUE (invite_code)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use parallel_shared::models::workspace::{Workspace, CreateWorkspace};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let workspace = Workspace::create(&pool, CreateWorkspace {
///     name: "Acme".to_string(),
///     user_id,
///     image: None,
///     invite_code: "a1B2c3D4e5".to_string(),
/// }).await?;
///
/// let workspaces = Workspace::list_by_member(&pool, user_id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Workspace model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workspace {
    /// Unique workspace ID
    pub id: Uuid,

    /// Workspace name
    pub name: String,

    /// Creator of the workspace
    pub user_id: Uuid,

    /// Image URL
    pub image: Option<String>,

    /// Current invite code; the only token that grants join access
    pub invite_code: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new workspace
#[derive(Debug, Clone)]
pub struct CreateWorkspace {
    pub name: String,
    pub user_id: Uuid,
    pub image: Option<String>,
    pub invite_code: String,
}

/// Input for updating a workspace
///
/// `image: Some(None)` clears the image.
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub image: Option<Option<String>>,
}

const WORKSPACE_COLUMNS: &str = "id, name, user_id, image, invite_code, created_at, updated_at";

impl Workspace {
    /// Creates a new workspace
    ///
    /// Runs inside the caller's transaction so the creator's ADMIN membership
    /// can be inserted atomically with it.
    pub async fn create<'e, E>(executor: E, data: CreateWorkspace) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let workspace = sqlx::query_as::<_, Workspace>(&format!(
            r#"
            INSERT INTO workspaces (name, user_id, image, invite_code)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            WORKSPACE_COLUMNS
        ))
        .bind(data.name)
        .bind(data.user_id)
        .bind(data.image)
        .bind(data.invite_code)
        .fetch_one(executor)
        .await?;

        Ok(workspace)
    }

    /// Finds a workspace by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {} FROM workspaces WHERE id = $1",
            WORKSPACE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a workspace only if `invite_code` is its current code
    pub async fn find_by_id_and_invite_code(
        pool: &PgPool,
        id: Uuid,
        invite_code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {} FROM workspaces WHERE id = $1 AND invite_code = $2",
            WORKSPACE_COLUMNS
        ))
        .bind(id)
        .bind(invite_code)
        .fetch_optional(pool)
        .await
    }

    /// Lists every workspace where the user holds a membership
    ///
    /// Ordered by workspace creation, newest first.
    pub async fn list_by_member(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(
            r#"
            SELECT w.id, w.name, w.user_id, w.image, w.invite_code, w.created_at, w.updated_at
            FROM workspaces w
            INNER JOIN workspace_members m ON m.workspace_id = w.id
            WHERE m.user_id = $1
            ORDER BY w.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Updates name and/or image
    ///
    /// Returns `None` if the workspace doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateWorkspace,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE workspaces SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.image.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", WORKSPACE_COLUMNS));

        let mut q = sqlx::query_as::<_, Workspace>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        q.fetch_optional(pool).await
    }

    /// Replaces the invite code; the previous code stops granting access
    pub async fn reset_invite_code(
        pool: &PgPool,
        id: Uuid,
        invite_code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(&format!(
            r#"
            UPDATE workspaces
            SET invite_code = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            WORKSPACE_COLUMNS
        ))
        .bind(id)
        .bind(invite_code)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a workspace
    ///
    /// Memberships, projects and tasks are removed by cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
