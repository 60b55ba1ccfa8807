/// Month-over-month task analytics
///
/// For a workspace or project scope, counts the tasks created in the current
/// calendar month and in the previous one under five predicates, and reports
/// the current counts with their deltas against the previous month.
///
/// | Predicate  | Task counts when                                   |
/// |------------|----------------------------------------------------|
/// | total      | always                                             |
/// | assigned   | `assignee_id` is the caller                        |
/// | completed  | `status = DONE`                                    |
/// | incomplete | `status <> DONE`                                   |
/// | overdue    | `status <> DONE` and `due_date` is before "now"    |
///
/// Month membership is decided by `created_at`. Windows are half-open
/// `[first instant of month, first instant of next month)` in a fixed
/// reference offset, which is the same set of instants as "first through
/// last instant, inclusive".
///
/// All ten values come from one scan of the two months and one `now`
/// captured at the start of the call. Nothing is cached.

use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::task::{AnalyticsRow, Task};

/// What the analytics are computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsScope {
    Workspace(Uuid),
    Project(Uuid),
}

/// Half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// The month containing "now" and the month before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindows {
    pub current: MonthWindow,
    pub previous: MonthWindow,
}

impl MonthWindows {
    /// Builds both windows around `now`, with month boundaries taken in
    /// `offset`
    ///
    /// Returns `None` only at the edges of the representable calendar.
    pub fn around(now: DateTime<Utc>, offset: FixedOffset) -> Option<Self> {
        let local = now.with_timezone(&offset);
        let first = NaiveDate::from_ymd_opt(local.year(), local.month(), 1)?;

        let previous_first = first.checked_sub_months(Months::new(1))?;
        let next_first = first.checked_add_months(Months::new(1))?;

        let start_of = |date: NaiveDate| -> Option<DateTime<Utc>> {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            offset
                .from_local_datetime(&midnight)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        };

        let previous_start = start_of(previous_first)?;
        let current_start = start_of(first)?;
        let next_start = start_of(next_first)?;

        Some(Self {
            current: MonthWindow {
                start: current_start,
                end: next_start,
            },
            previous: MonthWindow {
                start: previous_start,
                end: current_start,
            },
        })
    }

    /// Range covering both months
    pub fn span(&self) -> MonthWindow {
        MonthWindow {
            start: self.previous.start,
            end: self.current.end,
        }
    }
}

/// Counts for a single month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthCounts {
    pub total: i64,
    pub assigned: i64,
    pub completed: i64,
    pub incomplete: i64,
    pub overdue: i64,
}

impl MonthCounts {
    fn add(&mut self, row: &AnalyticsRow, actor_id: Uuid, now: DateTime<Utc>) {
        self.total += 1;

        if row.assignee_id == Some(actor_id) {
            self.assigned += 1;
        }

        if row.status.is_done() {
            self.completed += 1;
        } else {
            self.incomplete += 1;
            if row.due_date.is_some_and(|due| due < now) {
                self.overdue += 1;
            }
        }
    }
}

/// Current-month counts and their change against the previous month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAnalytics {
    pub task_count: i64,
    pub task_difference: i64,
    pub assigned_task_count: i64,
    pub assigned_task_difference: i64,
    pub completed_task_count: i64,
    pub completed_task_difference: i64,
    pub incomplete_task_count: i64,
    pub incomplete_task_difference: i64,
    pub overdue_task_count: i64,
    pub overdue_task_difference: i64,
}

impl TaskAnalytics {
    pub fn from_counts(current: MonthCounts, previous: MonthCounts) -> Self {
        Self {
            task_count: current.total,
            task_difference: current.total - previous.total,
            assigned_task_count: current.assigned,
            assigned_task_difference: current.assigned - previous.assigned,
            completed_task_count: current.completed,
            completed_task_difference: current.completed - previous.completed,
            incomplete_task_count: current.incomplete,
            incomplete_task_difference: current.incomplete - previous.incomplete,
            overdue_task_count: current.overdue,
            overdue_task_difference: current.overdue - previous.overdue,
        }
    }
}

/// Splits rows into the two months and counts them
///
/// Rows outside both windows are ignored.
pub fn tally(
    rows: &[AnalyticsRow],
    windows: &MonthWindows,
    actor_id: Uuid,
    now: DateTime<Utc>,
) -> TaskAnalytics {
    let mut current = MonthCounts::default();
    let mut previous = MonthCounts::default();

    for row in rows {
        if windows.current.contains(row.created_at) {
            current.add(row, actor_id, now);
        } else if windows.previous.contains(row.created_at) {
            previous.add(row, actor_id, now);
        }
    }

    TaskAnalytics::from_counts(current, previous)
}

/// Computes analytics for a scope as seen by `actor_id` at `now`
pub async fn compute(
    pool: &PgPool,
    scope: AnalyticsScope,
    actor_id: Uuid,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<TaskAnalytics, sqlx::Error> {
    let windows = MonthWindows::around(now, offset).ok_or_else(|| {
        sqlx::Error::Protocol(format!("No calendar month around {}", now))
    })?;
    let span = windows.span();

    let (workspace_id, project_id) = match scope {
        AnalyticsScope::Workspace(id) => (Some(id), None),
        AnalyticsScope::Project(id) => (None, Some(id)),
    };

    let rows = Task::analytics_rows(pool, workspace_id, project_id, span.start, span.end).await?;

    tracing::debug!(scope = ?scope, rows = rows.len(), "Computing task analytics");
    Ok(tally(&rows, &windows, actor_id, now))
}
