/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     image TEXT,
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT projects_id_workspace_key UNIQUE (id, workspace_id)
/// );
/// ```
///
/// The `(id, workspace_id)` key is the target of the tasks foreign key, which
/// keeps every task in the same workspace as its project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub workspace_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub image: Option<String>,
    pub workspace_id: Uuid,
}

/// Input for updating a project
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub image: Option<Option<String>>,
}

const PROJECT_COLUMNS: &str = "id, name, image, workspace_id, created_at, updated_at";

impl Project {
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (name, image, workspace_id) VALUES ($1, $2, $3) RETURNING {}",
            PROJECT_COLUMNS
        ))
        .bind(data.name)
        .bind(data.image)
        .bind(data.workspace_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists projects of a workspace, newest first
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE workspace_id = $1 ORDER BY created_at DESC",
            PROJECT_COLUMNS
        ))
        .bind(workspace_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.image.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", PROJECT_COLUMNS));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a project; its tasks go with it
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
