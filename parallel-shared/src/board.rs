/// Task ordering engine
///
/// Orders tasks inside each (workspace, status) partition with sparse integer
/// positions, so that a single insert never rewrites other rows and a
/// drag-and-drop gesture is one atomic multi-row update.
///
/// # Conventions
///
/// - Display order is `position DESC, created_at ASC`.
/// - A new task gets `partition minimum + POSITION_STEP`, or `POSITION_STEP`
///   in an empty partition. In an evenly spaced column of two or more tasks
///   the new task ties with the one just above the bottom and, being newer,
///   displays right after it: second from the bottom, not at the head.
/// - Bulk reorder trusts the positions chosen by the client and applies them
///   as given. All rows change in one transaction or none do; ids that no
///   longer exist are skipped.
/// - Duplicate positions are tolerated; [`rebalance`] renumbers a partition
///   to `n * POSITION_STEP, …, POSITION_STEP` keeping the display order.
///
/// # Example
///
/// ```no_run
/// use parallel_shared::board::{bulk_reorder, Reposition};
/// use parallel_shared::models::task::TaskStatus;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, workspace_id: Uuid, task_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let moved = bulk_reorder(&pool, workspace_id, &[Reposition {
///     id: task_id,
///     status: TaskStatus::InProgress,
///     position: 2500,
/// }]).await?;
/// # Ok(())
/// # }
/// ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{CreateTask, Task, TaskStatus};

pub use crate::models::task::Reposition;

/// Gap between neighbouring positions
pub const POSITION_STEP: i32 = 1000;

/// Position for a task inserted into a partition whose minimum is `current_min`
pub fn next_position(current_min: Option<i32>) -> i32 {
    match current_min {
        Some(min) => min.saturating_add(POSITION_STEP),
        None => POSITION_STEP,
    }
}

/// Evenly spaced positions for `count` tasks, top of the column first
pub fn spaced_positions(count: usize) -> Vec<i32> {
    (1..=count)
        .rev()
        .map(|i| i32::try_from(i).unwrap_or(i32::MAX).saturating_mul(POSITION_STEP))
        .collect()
}

/// Rejects empty batches and batches naming a task twice
pub fn validate_batch(updates: &[Reposition]) -> ServiceResult<()> {
    if updates.is_empty() {
        return Err(ServiceError::bad_input("At least one task must be provided"));
    }

    let mut seen = HashSet::with_capacity(updates.len());
    for update in updates {
        if !seen.insert(update.id) {
            return Err(ServiceError::bad_input(format!(
                "Task {} appears more than once",
                update.id
            )));
        }
    }

    Ok(())
}

/// Checks that every existing task of a batch lives in `workspace_id`
pub fn check_batch_workspace(owners: &[(Uuid, Uuid)], workspace_id: Uuid) -> ServiceResult<()> {
    match owners.iter().find(|(_, owner)| *owner != workspace_id) {
        Some((task_id, _)) => {
            tracing::warn!(
                task_id = %task_id,
                workspace_id = %workspace_id,
                "Reorder batch references a task from another workspace"
            );
            Err(ServiceError::Forbidden(
                "All tasks must belong to the same workspace".to_string(),
            ))
        }
        None => Ok(()),
    }
}

/// A task before the board has placed it
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub name: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub workspace_id: Uuid,
    pub project_id: Uuid,
}

impl TaskDraft {
    fn placed_at(self, position: i32) -> CreateTask {
        CreateTask {
            name: self.name,
            description: self.description,
            assignee_id: self.assignee_id,
            status: self.status,
            due_date: self.due_date,
            position,
            workspace_id: self.workspace_id,
            project_id: self.project_id,
        }
    }
}

/// Position a task entering a partition should take
pub async fn head_position<'e, E>(
    executor: E,
    workspace_id: Uuid,
    status: TaskStatus,
) -> Result<i32, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let min = Task::min_position(executor, workspace_id, status).await?;
    Ok(next_position(min))
}

/// Inserts a task at the head of its partition
pub async fn insert_task(pool: &PgPool, draft: TaskDraft) -> ServiceResult<Task> {
    let mut tx = pool.begin().await?;

    let position = head_position(&mut *tx, draft.workspace_id, draft.status).await?;
    let task = Task::create(&mut *tx, draft.placed_at(position)).await?;

    tx.commit().await?;

    tracing::debug!(
        task_id = %task.id,
        status = %task.status,
        position = task.position,
        "Task placed"
    );
    Ok(task)
}

/// Applies a drag-and-drop batch atomically
///
/// The caller has already authorized against `workspace_id`. Every task in
/// the batch that still exists must belong to it, otherwise nothing changes.
pub async fn bulk_reorder(
    pool: &PgPool,
    workspace_id: Uuid,
    updates: &[Reposition],
) -> ServiceResult<Vec<Task>> {
    validate_batch(updates)?;

    let ids: Vec<Uuid> = updates.iter().map(|u| u.id).collect();
    let mut tx = pool.begin().await?;

    let owners = Task::lock_owners(&mut *tx, &ids).await?;
    check_batch_workspace(&owners, workspace_id)?;

    let updated = Task::apply_positions(&mut *tx, updates).await?;
    tx.commit().await?;

    tracing::info!(
        workspace_id = %workspace_id,
        requested = updates.len(),
        updated = updated.len(),
        "Tasks reordered"
    );
    Ok(updated)
}

/// Renumbers a partition to evenly spaced positions in display order
///
/// Returns the partition in display order.
pub async fn rebalance(
    pool: &PgPool,
    workspace_id: Uuid,
    status: TaskStatus,
) -> ServiceResult<Vec<Task>> {
    let mut tx = pool.begin().await?;

    let ids = Task::lock_partition(&mut *tx, workspace_id, status).await?;
    let updates: Vec<Reposition> = ids
        .iter()
        .zip(spaced_positions(ids.len()))
        .map(|(id, position)| Reposition {
            id: *id,
            status,
            position,
        })
        .collect();

    let mut tasks = if updates.is_empty() {
        Vec::new()
    } else {
        Task::apply_positions(&mut *tx, &updates).await?
    };
    tx.commit().await?;

    sort_for_display(&mut tasks);

    tracing::info!(
        workspace_id = %workspace_id,
        status = %status,
        count = tasks.len(),
        "Partition rebalanced"
    );
    Ok(tasks)
}

/// Sorts tasks into display order
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.position
            .cmp(&a.position)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reposition(id: Uuid, position: i32) -> Reposition {
        Reposition {
            id,
            status: TaskStatus::Backlog,
            position,
        }
    }

    fn task(position: i32, created_at: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            name: format!("task at {}", position),
            description: None,
            assignee_id: None,
            status: TaskStatus::Backlog,
            due_date: None,
            position,
            workspace_id: Uuid::nil(),
            project_id: Uuid::nil(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_empty_partition_starts_at_step() {
        assert_eq!(next_position(None), 1000);
    }

    #[test]
    fn test_next_position_adds_step_to_minimum() {
        assert_eq!(next_position(Some(1000)), 2000);
        assert_eq!(next_position(Some(-500)), 500);
        assert_eq!(next_position(Some(i32::MAX - 10)), i32::MAX);
    }

    #[test]
    fn test_spaced_positions() {
        assert_eq!(spaced_positions(3), vec![3000, 2000, 1000]);
        assert!(spaced_positions(0).is_empty());
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let err = validate_batch(&[]).unwrap_err();
        assert!(matches!(err, ServiceError::BadUserInput(_)));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let id = Uuid::new_v4();
        let err = validate_batch(&[reposition(id, 1000), reposition(id, 2000)]).unwrap_err();
        assert!(matches!(err, ServiceError::BadUserInput(_)));
    }

    #[test]
    fn test_valid_batch() {
        let batch = [reposition(Uuid::new_v4(), 1000), reposition(Uuid::new_v4(), 2000)];
        assert!(validate_batch(&batch).is_ok());
    }

    #[test]
    fn test_batch_spanning_workspaces_is_forbidden() {
        let workspace_id = Uuid::new_v4();
        let owners = vec![(Uuid::new_v4(), workspace_id), (Uuid::new_v4(), Uuid::new_v4())];

        let err = check_batch_workspace(&owners, workspace_id).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn test_batch_in_one_workspace_passes() {
        let workspace_id = Uuid::new_v4();
        let owners = vec![(Uuid::new_v4(), workspace_id), (Uuid::new_v4(), workspace_id)];

        assert!(check_batch_workspace(&owners, workspace_id).is_ok());
        assert!(check_batch_workspace(&[], workspace_id).is_ok());
    }

    #[test]
    fn test_display_order() {
        let now = Utc::now();
        let older_tie = task(2000, now - Duration::seconds(5));
        let newer_tie = task(2000, now);
        let top = task(2500, now);
        let bottom = task(1000, now);

        let mut tasks = vec![bottom.clone(), newer_tie.clone(), top.clone(), older_tie.clone()];
        sort_for_display(&mut tasks);

        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![top.id, older_tie.id, newer_tie.id, bottom.id]);
    }

    #[test]
    fn test_insert_into_spaced_column_lands_second_from_bottom() {
        let earlier = Utc::now() - Duration::seconds(10);
        let mut column: Vec<Task> = spaced_positions(3)
            .into_iter()
            .map(|position| task(position, earlier))
            .collect();

        let min = column.iter().map(|t| t.position).min();
        let inserted = task(next_position(min), Utc::now());
        assert_eq!(inserted.position, 2000);

        column.push(inserted.clone());
        sort_for_display(&mut column);

        let positions: Vec<i32> = column.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![3000, 2000, 2000, 1000]);
        assert_eq!(column[2].id, inserted.id);
    }
}
