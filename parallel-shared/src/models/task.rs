/// Task model and database operations
///
/// Tasks sit on a workspace board. Each (workspace_id, status) pair is a
/// board column ("partition") and `position` orders the tasks inside it.
/// Position arithmetic lives in [`crate::board`]; this module only reads and
/// writes rows.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('BACKLOG', 'TODO', 'IN_PROGRESS', 'IN_REVIEW', 'DONE');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     status task_status NOT NULL DEFAULT 'BACKLOG',
///     due_date TIMESTAMPTZ,
///     position INTEGER NOT NULL,
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     project_id UUID NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT tasks_project_workspace_fkey FOREIGN KEY (project_id, workspace_id)
///         REFERENCES projects(id, workspace_id) ON DELETE CASCADE
/// );
/// ```
///
/// # Display order
///
/// Every listing sorts by `position DESC, created_at ASC`: the highest
/// position is the top of the column, and equal positions fall back to the
/// older task first.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::str::FromStr;
use uuid::Uuid;

/// Board column a task sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    InReview,
    Done,
}

impl TaskStatus {
    /// All statuses in board order
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Backlog,
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "BACKLOG",
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::InReview => "IN_REVIEW",
            TaskStatus::Done => "DONE",
        }
    }

    /// DONE is the only completed status
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown task status: {}", s))
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,

    /// Order within the (workspace_id, status) partition
    pub position: i32,

    pub workspace_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert; the position has already been chosen by the board
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub position: i32,
    pub workspace_id: Uuid,
    pub project_id: Uuid,
}

/// Input for updating a task
///
/// Outer `None` leaves a field unchanged; `Some(None)` clears a nullable
/// field.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub assignee_id: Option<Option<Uuid>>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub project_id: Option<Uuid>,
    pub position: Option<i32>,
}

/// Listing filter; `workspace_id` is always required
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub workspace_id: Uuid,
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub status: Option<TaskStatus>,

    /// Case-insensitive substring of the name
    pub search: Option<String>,

    /// Calendar day (UTC) of the due date
    pub due_on: Option<NaiveDate>,
}

/// One (id, status, position) assignment applied by a bulk update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reposition {
    pub id: Uuid,
    pub status: TaskStatus,
    pub position: i32,
}

/// Minimal row read by the analytics aggregator
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalyticsRow {
    pub status: TaskStatus,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str = "id, name, description, assignee_id, status, due_date, position, \
                            workspace_id, project_id, created_at, updated_at";

impl Task {
    /// Inserts a task
    ///
    /// # Errors
    ///
    /// A project from another workspace violates `tasks_project_workspace_fkey`.
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (name, description, assignee_id, status, due_date, position,
                               workspace_id, project_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.assignee_id)
        .bind(data.status)
        .bind(data.due_date)
        .bind(data.position)
        .bind(data.workspace_id)
        .bind(data.project_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lists tasks matching a filter in display order
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {} FROM tasks WHERE workspace_id = $1", TASK_COLUMNS);
        let mut bind_count = 1;

        if filter.project_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND project_id = ${}", bind_count));
        }
        if filter.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND assignee_id = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND name ILIKE ${}", bind_count));
        }
        if filter.due_on.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND (due_date AT TIME ZONE 'UTC')::date = ${}",
                bind_count
            ));
        }

        query.push_str(" ORDER BY position DESC, created_at ASC");

        let mut q = sqlx::query_as::<_, Task>(&query).bind(filter.workspace_id);

        if let Some(project_id) = filter.project_id {
            q = q.bind(project_id);
        }
        if let Some(assignee_id) = filter.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(search) = &filter.search {
            q = q.bind(format!("%{}%", escape_like(search)));
        }
        if let Some(due_on) = filter.due_on {
            q = q.bind(due_on);
        }

        q.fetch_all(pool).await
    }

    /// Smallest position in a partition, `None` if the partition is empty
    pub async fn min_position<'e, E>(
        executor: E,
        workspace_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<i32>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT MIN(position) FROM tasks WHERE workspace_id = $1 AND status = $2")
            .bind(workspace_id)
            .bind(status)
            .fetch_one(executor)
            .await
    }

    /// Ids of a partition in display order, row-locked for the transaction
    pub async fn lock_partition<'e, E>(
        executor: E,
        workspace_id: Uuid,
        status: TaskStatus,
    ) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"
            SELECT id FROM tasks
            WHERE workspace_id = $1 AND status = $2
            ORDER BY position DESC, created_at ASC
            FOR UPDATE
            "#,
        )
        .bind(workspace_id)
        .bind(status)
        .fetch_all(executor)
        .await
    }

    /// Locks the listed tasks and returns `(id, workspace_id)` for each one
    /// that exists
    pub async fn lock_owners<'e, E>(
        executor: E,
        ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT id, workspace_id FROM tasks WHERE id = ANY($1) FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(executor)
        .await
    }

    /// Applies (status, position) pairs to many tasks in one statement
    ///
    /// Ids that don't match a row are skipped. Returns the updated rows.
    pub async fn apply_positions<'e, E>(
        executor: E,
        updates: &[Reposition],
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let ids: Vec<Uuid> = updates.iter().map(|u| u.id).collect();
        let statuses: Vec<&str> = updates.iter().map(|u| u.status.as_str()).collect();
        let positions: Vec<i32> = updates.iter().map(|u| u.position).collect();

        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks AS t
            SET status = u.status::task_status, position = u.position, updated_at = NOW()
            FROM UNNEST($1::uuid[], $2::text[], $3::int4[]) AS u(id, status, position)
            WHERE t.id = u.id
            RETURNING t.id, t.name, t.description, t.assignee_id, t.status, t.due_date,
                      t.position, t.workspace_id, t.project_id, t.created_at, t.updated_at
            "#,
        )
        .bind(ids)
        .bind(statuses)
        .bind(positions)
        .fetch_all(executor)
        .await
    }

    /// Updates the given fields of a task
    ///
    /// Returns `None` if the task doesn't exist.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.project_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", project_id = ${}", bind_count));
        }
        if data.position.is_some() {
            bind_count += 1;
            query.push_str(&format!(", position = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", TASK_COLUMNS));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(assignee_id) = data.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(project_id) = data.project_id {
            q = q.bind(project_id);
        }
        if let Some(position) = data.position {
            q = q.bind(position);
        }

        q.fetch_optional(executor).await
    }

    /// Clears the assignee on every task of a workspace assigned to a user
    pub async fn unassign<'e, E>(
        executor: E,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tasks SET assignee_id = NULL, updated_at = NOW()
            WHERE workspace_id = $1 AND assignee_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reads the rows analytics needs for one scope and time range
    ///
    /// Exactly one of `workspace_id` or `project_id` narrows the scan; the
    /// range is half-open `[from, until)` on `created_at`.
    pub async fn analytics_rows(
        pool: &PgPool,
        workspace_id: Option<Uuid>,
        project_id: Option<Uuid>,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<AnalyticsRow>, sqlx::Error> {
        sqlx::query_as::<_, AnalyticsRow>(
            r#"
            SELECT status, assignee_id, due_date, created_at
            FROM tasks
            WHERE ($1::uuid IS NULL OR workspace_id = $1)
              AND ($2::uuid IS NULL OR project_id = $2)
              AND created_at >= $3 AND created_at < $4
            "#,
        )
        .bind(workspace_id)
        .bind(project_id)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await
    }
}

/// Escapes LIKE wildcards so a search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let status: TaskStatus = serde_json::from_str("\"IN_REVIEW\"").unwrap();
        assert_eq!(status, TaskStatus::InReview);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("backlog".parse::<TaskStatus>().unwrap(), TaskStatus::Backlog);
        assert_eq!("DONE".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("ARCHIVED".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_only_done_is_done() {
        let done: Vec<_> = TaskStatus::ALL.into_iter().filter(|s| s.is_done()).collect();
        assert_eq!(done, vec![TaskStatus::Done]);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
