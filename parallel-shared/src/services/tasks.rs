/// Task operations
///
/// Every task operation needs membership in the task's workspace. Existing
/// tasks are looked up before authorization, giving a clean `NOT_FOUND`
/// versus `FORBIDDEN` split. Reads return [`TaskView`]s with the assignee
/// and project resolved.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{clean_name, clean_text};
use crate::auth::authorization::{require_permission, ResourcePermission};
use crate::auth::session::RequestContext;
use crate::board::{self, Reposition, TaskDraft};
use crate::error::{ServiceError, ServiceResult};
use crate::models::membership::Membership;
use crate::models::present;
use crate::models::project::Project;
use crate::models::task::{Task, TaskFilter, TaskStatus, UpdateTask};
use crate::models::user::UserProfile;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskInput {
    pub workspace_id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Backlog
}

/// Partial task update; `null` clears nullable fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default, deserialize_with = "present")]
    pub assignee_id: Option<Option<Uuid>>,
}

/// Listing query
#[derive(Debug, Clone, Deserialize)]
pub struct ListTasksInput {
    pub workspace_id: Uuid,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Project fields shown alongside a task
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            image: project.image.clone(),
        }
    }
}

/// A task with its assignee and project resolved
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub assignee: Option<UserProfile>,
    pub project: Option<ProjectSummary>,
}

/// Lookup tables for one workspace, used to build views
struct ViewContext {
    members: HashMap<Uuid, UserProfile>,
    projects: HashMap<Uuid, ProjectSummary>,
}

impl ViewContext {
    async fn load(pool: &PgPool, workspace_id: Uuid) -> ServiceResult<Self> {
        let members = Membership::list_by_workspace(pool, workspace_id)
            .await?
            .into_iter()
            .map(|m| {
                let profile = UserProfile {
                    id: m.user_id,
                    name: m.name,
                    email: m.email,
                };
                (m.user_id, profile)
            })
            .collect();

        let projects = Project::list_by_workspace(pool, workspace_id)
            .await?
            .iter()
            .map(|p| (p.id, ProjectSummary::from(p)))
            .collect();

        Ok(Self { members, projects })
    }

    fn view(&self, task: Task) -> TaskView {
        TaskView {
            assignee: task.assignee_id.and_then(|id| self.members.get(&id).cloned()),
            project: self.projects.get(&task.project_id).cloned(),
            task,
        }
    }
}

/// Loads a task and checks the actor is a member of its workspace
async fn authorize_task(pool: &PgPool, ctx: &RequestContext, id: Uuid) -> ServiceResult<Task> {
    let actor = ctx.actor()?;

    let task = Task::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task"))?;
    require_permission(pool, task.workspace_id, actor.id, ResourcePermission::Write).await?;

    Ok(task)
}

/// Checks a project exists inside the workspace
async fn ensure_project_in_workspace(
    pool: &PgPool,
    project_id: Uuid,
    workspace_id: Uuid,
) -> ServiceResult<()> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Project"))?;

    if project.workspace_id != workspace_id {
        return Err(ServiceError::bad_input(
            "Project does not belong to this workspace",
        ));
    }
    Ok(())
}

/// Checks a would-be assignee is a member of the workspace
async fn ensure_assignable(pool: &PgPool, assignee_id: Uuid, workspace_id: Uuid) -> ServiceResult<()> {
    if Membership::find(pool, workspace_id, assignee_id).await?.is_none() {
        return Err(ServiceError::bad_input(
            "Assignee must be a member of the workspace",
        ));
    }
    Ok(())
}

/// Creates a task at the head of its board column
pub async fn create(
    pool: &PgPool,
    ctx: &RequestContext,
    input: CreateTaskInput,
) -> ServiceResult<TaskView> {
    let actor = ctx.actor()?;
    require_permission(pool, input.workspace_id, actor.id, ResourcePermission::Write).await?;

    let name = clean_name(&input.name, "Name")?;
    ensure_project_in_workspace(pool, input.project_id, input.workspace_id).await?;
    if let Some(assignee_id) = input.assignee_id {
        ensure_assignable(pool, assignee_id, input.workspace_id).await?;
    }

    let task = board::insert_task(
        pool,
        TaskDraft {
            name,
            description: clean_text(input.description),
            assignee_id: input.assignee_id,
            status: input.status,
            due_date: input.due_date,
            workspace_id: input.workspace_id,
            project_id: input.project_id,
        },
    )
    .await?;

    tracing::info!(
        task_id = %task.id,
        workspace_id = %task.workspace_id,
        position = task.position,
        correlation_id = %ctx.correlation_id,
        "Task created"
    );

    let views = ViewContext::load(pool, task.workspace_id).await?;
    Ok(views.view(task))
}

/// Lists tasks in board display order
pub async fn list(
    pool: &PgPool,
    ctx: &RequestContext,
    input: ListTasksInput,
) -> ServiceResult<Vec<TaskView>> {
    let actor = ctx.actor()?;
    require_permission(pool, input.workspace_id, actor.id, ResourcePermission::Read).await?;

    let filter = TaskFilter {
        workspace_id: input.workspace_id,
        project_id: input.project_id,
        assignee_id: input.assignee_id,
        status: input.status,
        search: clean_text(input.search),
        due_on: input.due_date,
    };

    let tasks = Task::list(pool, &filter).await?;
    let views = ViewContext::load(pool, input.workspace_id).await?;

    Ok(tasks.into_iter().map(|t| views.view(t)).collect())
}

pub async fn get(pool: &PgPool, ctx: &RequestContext, id: Uuid) -> ServiceResult<TaskView> {
    let task = authorize_task(pool, ctx, id).await?;
    let views = ViewContext::load(pool, task.workspace_id).await?;

    Ok(views.view(task))
}

/// Updates a task
///
/// A status change moves the task to the head of its new column.
pub async fn update(
    pool: &PgPool,
    ctx: &RequestContext,
    id: Uuid,
    input: UpdateTaskInput,
) -> ServiceResult<TaskView> {
    let existing = authorize_task(pool, ctx, id).await?;
    let workspace_id = existing.workspace_id;

    let name = input.name.as_deref().map(|n| clean_name(n, "Name")).transpose()?;
    if let Some(project_id) = input.project_id {
        ensure_project_in_workspace(pool, project_id, workspace_id).await?;
    }
    if let Some(Some(assignee_id)) = input.assignee_id {
        ensure_assignable(pool, assignee_id, workspace_id).await?;
    }

    let mut tx = pool.begin().await?;

    let status = input.status.filter(|s| *s != existing.status);
    let position = match status {
        Some(status) => Some(board::head_position(&mut *tx, workspace_id, status).await?),
        None => None,
    };

    let task = Task::update(
        &mut *tx,
        id,
        UpdateTask {
            name,
            description: input.description.map(clean_text),
            assignee_id: input.assignee_id,
            status,
            due_date: input.due_date,
            project_id: input.project_id,
            position,
        },
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("Task"))?;

    tx.commit().await?;

    tracing::info!(task_id = %id, "Task updated");

    let views = ViewContext::load(pool, workspace_id).await?;
    Ok(views.view(task))
}

pub async fn delete(pool: &PgPool, ctx: &RequestContext, id: Uuid) -> ServiceResult<Task> {
    let task = authorize_task(pool, ctx, id).await?;

    if !Task::delete(pool, id).await? {
        return Err(ServiceError::not_found("Task"));
    }

    tracing::info!(task_id = %id, "Task deleted");
    Ok(task)
}

/// Applies a drag-and-drop batch of (task, status, position) triples
///
/// The first task decides the workspace the actor is authorized against;
/// every other existing task must belong to the same workspace.
pub async fn bulk_reorder(
    pool: &PgPool,
    ctx: &RequestContext,
    updates: Vec<Reposition>,
) -> ServiceResult<Vec<Task>> {
    let actor = ctx.actor()?;
    board::validate_batch(&updates)?;

    let first = Task::find_by_id(pool, updates[0].id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task"))?;
    require_permission(pool, first.workspace_id, actor.id, ResourcePermission::Write).await?;

    let mut tasks = board::bulk_reorder(pool, first.workspace_id, &updates).await?;
    board::sort_for_display(&mut tasks);

    Ok(tasks)
}

/// Renumbers one board column
pub async fn rebalance(
    pool: &PgPool,
    ctx: &RequestContext,
    workspace_id: Uuid,
    status: TaskStatus,
) -> ServiceResult<Vec<Task>> {
    let actor = ctx.actor()?;
    require_permission(pool, workspace_id, actor.id, ResourcePermission::Write).await?;

    board::rebalance(pool, workspace_id, status).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_defaults_to_backlog() {
        let input: CreateTaskInput = serde_json::from_value(serde_json::json!({
            "workspace_id": Uuid::new_v4(),
            "project_id": Uuid::new_v4(),
            "name": "Write docs",
        }))
        .unwrap();

        assert_eq!(input.status, TaskStatus::Backlog);
        assert!(input.assignee_id.is_none());
    }

    #[test]
    fn test_update_input_clear_assignee() {
        let input: UpdateTaskInput =
            serde_json::from_str(r#"{"assignee_id": null, "status": "DONE"}"#).unwrap();

        assert_eq!(input.assignee_id, Some(None));
        assert_eq!(input.status, Some(TaskStatus::Done));
        assert_eq!(input.due_date, None);
    }

    #[test]
    fn test_task_view_flattens_task() {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            name: "T1".to_string(),
            description: None,
            assignee_id: None,
            status: TaskStatus::Todo,
            due_date: None,
            position: 1000,
            workspace_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        let view = TaskView {
            task,
            assignee: None,
            project: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "T1");
        assert_eq!(json["position"], 1000);
        assert!(json["assignee"].is_null());
    }
}
