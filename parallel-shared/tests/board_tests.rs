/// Integration tests for task placement and reordering
///
/// Require a PostgreSQL database in DATABASE_URL; skipped otherwise.

mod common;

use parallel_shared::auth::session::RequestContext;
use parallel_shared::board::Reposition;
use parallel_shared::error::ErrorKind;
use parallel_shared::models::task::{Task, TaskStatus};
use parallel_shared::services::tasks::{self, CreateTaskInput, ListTasksInput, UpdateTaskInput};
use sqlx::PgPool;
use uuid::Uuid;

async fn new_task(
    pool: &PgPool,
    ctx: &RequestContext,
    workspace_id: Uuid,
    project_id: Uuid,
    name: &str,
    status: TaskStatus,
) -> Task {
    tasks::create(
        pool,
        ctx,
        CreateTaskInput {
            workspace_id,
            project_id,
            name: name.to_string(),
            description: None,
            status,
            due_date: None,
            assignee_id: None,
        },
    )
    .await
    .expect("Failed to create task")
    .task
}

async fn column(pool: &PgPool, ctx: &RequestContext, workspace_id: Uuid, status: TaskStatus) -> Vec<Uuid> {
    tasks::list(
        pool,
        ctx,
        ListTasksInput {
            workspace_id,
            project_id: None,
            assignee_id: None,
            status: Some(status),
            search: None,
            due_date: None,
        },
    )
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.task.id)
    .collect()
}

#[tokio::test]
async fn test_positions_on_insert() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let workspace = common::workspace(&pool, &alice).await;
    let project = common::project(&pool, &alice, workspace.id).await;

    let first = new_task(&pool, &alice, workspace.id, project.id, "T1", TaskStatus::Todo).await;
    assert_eq!(first.position, 1000);

    let second = new_task(&pool, &alice, workspace.id, project.id, "T2", TaskStatus::Todo).await;
    assert_eq!(second.position, 2000);

    // Other columns are separate partitions.
    let other = new_task(&pool, &alice, workspace.id, project.id, "T3", TaskStatus::Done).await;
    assert_eq!(other.position, 1000);
}

#[tokio::test]
async fn test_end_to_end_reorder() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let workspace = common::workspace(&pool, &alice).await;
    let project = common::project(&pool, &alice, workspace.id).await;

    let t1 = new_task(&pool, &alice, workspace.id, project.id, "T1", TaskStatus::Backlog).await;
    let t2 = new_task(&pool, &alice, workspace.id, project.id, "T2", TaskStatus::Backlog).await;
    assert_eq!((t1.position, t2.position), (1000, 2000));
    assert_eq!(
        column(&pool, &alice, workspace.id, TaskStatus::Backlog).await,
        vec![t2.id, t1.id]
    );

    tasks::bulk_reorder(
        &pool,
        &alice,
        vec![Reposition {
            id: t1.id,
            status: TaskStatus::Backlog,
            position: 2500,
        }],
    )
    .await
    .unwrap();

    assert_eq!(
        column(&pool, &alice, workspace.id, TaskStatus::Backlog).await,
        vec![t1.id, t2.id]
    );
}

#[tokio::test]
async fn test_reorder_skips_missing_tasks() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let workspace = common::workspace(&pool, &alice).await;
    let project = common::project(&pool, &alice, workspace.id).await;

    let a = new_task(&pool, &alice, workspace.id, project.id, "A", TaskStatus::Todo).await;
    let b = new_task(&pool, &alice, workspace.id, project.id, "B", TaskStatus::Todo).await;
    let c = new_task(&pool, &alice, workspace.id, project.id, "C", TaskStatus::Todo).await;

    let updated = tasks::bulk_reorder(
        &pool,
        &alice,
        vec![
            Reposition { id: a.id, status: TaskStatus::InProgress, position: 3000 },
            Reposition { id: b.id, status: TaskStatus::InProgress, position: 2000 },
            Reposition { id: Uuid::new_v4(), status: TaskStatus::InProgress, position: 1500 },
            Reposition { id: c.id, status: TaskStatus::Done, position: 1000 },
        ],
    )
    .await
    .unwrap();
    assert_eq!(updated.len(), 3);

    let a = Task::find_by_id(&pool, a.id).await.unwrap().unwrap();
    let b = Task::find_by_id(&pool, b.id).await.unwrap().unwrap();
    let c = Task::find_by_id(&pool, c.id).await.unwrap().unwrap();

    assert_eq!((a.status, a.position), (TaskStatus::InProgress, 3000));
    assert_eq!((b.status, b.position), (TaskStatus::InProgress, 2000));
    assert_eq!((c.status, c.position), (TaskStatus::Done, 1000));
}

#[tokio::test]
async fn test_empty_reorder_is_bad_input() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;

    let result = tasks::bulk_reorder(&pool, &alice, vec![]).await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::BadUserInput);
}

#[tokio::test]
async fn test_reorder_with_missing_first_task_is_not_found() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;

    let result = tasks::bulk_reorder(
        &pool,
        &alice,
        vec![Reposition {
            id: Uuid::new_v4(),
            status: TaskStatus::Todo,
            position: 1000,
        }],
    )
    .await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_reorder_across_workspaces_changes_nothing() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let bob = common::signed_in(&pool, "Bob").await;

    let mine = common::workspace(&pool, &alice).await;
    let my_project = common::project(&pool, &alice, mine.id).await;
    let theirs = common::workspace(&pool, &bob).await;
    let their_project = common::project(&pool, &bob, theirs.id).await;

    let own = new_task(&pool, &alice, mine.id, my_project.id, "Mine", TaskStatus::Todo).await;
    let foreign = new_task(&pool, &bob, theirs.id, their_project.id, "Theirs", TaskStatus::Todo).await;

    let result = tasks::bulk_reorder(
        &pool,
        &alice,
        vec![
            Reposition { id: own.id, status: TaskStatus::Done, position: 9000 },
            Reposition { id: foreign.id, status: TaskStatus::Done, position: 9000 },
        ],
    )
    .await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Forbidden);

    let own_after = Task::find_by_id(&pool, own.id).await.unwrap().unwrap();
    let foreign_after = Task::find_by_id(&pool, foreign.id).await.unwrap().unwrap();
    assert_eq!((own_after.status, own_after.position), (TaskStatus::Todo, own.position));
    assert_eq!(
        (foreign_after.status, foreign_after.position),
        (TaskStatus::Todo, foreign.position)
    );
}

#[tokio::test]
async fn test_rebalance_keeps_display_order() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let workspace = common::workspace(&pool, &alice).await;
    let project = common::project(&pool, &alice, workspace.id).await;

    let t1 = new_task(&pool, &alice, workspace.id, project.id, "T1", TaskStatus::Todo).await;
    let t2 = new_task(&pool, &alice, workspace.id, project.id, "T2", TaskStatus::Todo).await;
    let t3 = new_task(&pool, &alice, workspace.id, project.id, "T3", TaskStatus::Todo).await;
    // T1=1000, T2=2000, T3=2000: T2 and T3 tie and fall back to creation order.
    assert_eq!(t3.position, 2000);

    let before = column(&pool, &alice, workspace.id, TaskStatus::Todo).await;
    assert_eq!(before, vec![t2.id, t3.id, t1.id]);

    let rebalanced = tasks::rebalance(&pool, &alice, workspace.id, TaskStatus::Todo)
        .await
        .unwrap();

    let positions: Vec<i32> = rebalanced.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![3000, 2000, 1000]);
    assert_eq!(column(&pool, &alice, workspace.id, TaskStatus::Todo).await, before);
}

#[tokio::test]
async fn test_status_change_moves_task_to_new_column() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let workspace = common::workspace(&pool, &alice).await;
    let project = common::project(&pool, &alice, workspace.id).await;

    new_task(&pool, &alice, workspace.id, project.id, "Done already", TaskStatus::Done).await;
    let task = new_task(&pool, &alice, workspace.id, project.id, "Moving", TaskStatus::Todo).await;

    let moved = tasks::update(
        &pool,
        &alice,
        task.id,
        UpdateTaskInput {
            status: Some(TaskStatus::Done),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(moved.task.status, TaskStatus::Done);
    assert_eq!(moved.task.position, 2000);
}

#[tokio::test]
async fn test_assignee_must_be_member() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let stranger = common::signed_in(&pool, "Stranger").await;
    let workspace = common::workspace(&pool, &alice).await;
    let project = common::project(&pool, &alice, workspace.id).await;

    let result = tasks::create(
        &pool,
        &alice,
        CreateTaskInput {
            workspace_id: workspace.id,
            project_id: project.id,
            name: "Assigned".to_string(),
            description: None,
            status: TaskStatus::Todo,
            due_date: None,
            assignee_id: Some(common::actor_id(&stranger)),
        },
    )
    .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::BadUserInput);
}

#[tokio::test]
async fn test_task_cannot_use_foreign_project() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let mine = common::workspace(&pool, &alice).await;
    let other = common::workspace(&pool, &alice).await;
    let other_project = common::project(&pool, &alice, other.id).await;

    let result = tasks::create(
        &pool,
        &alice,
        CreateTaskInput {
            workspace_id: mine.id,
            project_id: other_project.id,
            name: "Misplaced".to_string(),
            description: None,
            status: TaskStatus::Todo,
            due_date: None,
            assignee_id: None,
        },
    )
    .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::BadUserInput);
}

#[tokio::test]
async fn test_missing_task_is_not_found_before_forbidden() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let mallory = common::signed_in(&pool, "Mallory").await;
    let workspace = common::workspace(&pool, &alice).await;
    let project = common::project(&pool, &alice, workspace.id).await;
    let task = new_task(&pool, &alice, workspace.id, project.id, "Secret", TaskStatus::Todo).await;

    let missing = tasks::get(&pool, &mallory, Uuid::new_v4()).await;
    assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);

    let foreign = tasks::get(&pool, &mallory, task.id).await;
    assert_eq!(foreign.unwrap_err().kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_list_filters() {
    let Some(pool) = common::setup().await else { return };
    let alice = common::signed_in(&pool, "Alice").await;
    let workspace = common::workspace(&pool, &alice).await;
    let project = common::project(&pool, &alice, workspace.id).await;

    new_task(&pool, &alice, workspace.id, project.id, "Write report", TaskStatus::Todo).await;
    new_task(&pool, &alice, workspace.id, project.id, "Fix 100% bug", TaskStatus::Todo).await;

    let found = tasks::list(
        &pool,
        &alice,
        ListTasksInput {
            workspace_id: workspace.id,
            project_id: Some(project.id),
            assignee_id: None,
            status: None,
            search: Some("REPORT".to_string()),
            due_date: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].task.name, "Write report");
    assert_eq!(found[0].project.as_ref().map(|p| p.id), Some(project.id));

    let percent = tasks::list(
        &pool,
        &alice,
        ListTasksInput {
            workspace_id: workspace.id,
            project_id: None,
            assignee_id: None,
            status: None,
            search: Some("100%".to_string()),
            due_date: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(percent.len(), 1);
}
