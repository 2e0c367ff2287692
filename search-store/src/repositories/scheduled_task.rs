//! Repositories for `ScheduledTask` and `TaskResult` (spec §3, §4.7). The
//! scheduler crate owns the run loop; this crate owns the rows it reads
//! and writes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{Sqlite, SqlitePool};

use search_traits::{JobId, TaskId};

use crate::error::StoreError;
use crate::models::{
    ScheduledTask, ScheduledTaskRow, TaskResult, TaskResultRow, TASK_RESULT_HISTORY_LIMIT,
};
use crate::Result;

#[async_trait]
pub trait ScheduledTaskRepository: Send + Sync {
    async fn create(&self, task: &ScheduledTask) -> Result<()>;
    async fn get(&self, id: TaskId) -> Result<ScheduledTask>;
    async fn get_by_name(&self, name: &str) -> Result<Option<ScheduledTask>>;
    async fn list(&self) -> Result<Vec<ScheduledTask>>;
    async fn list_enabled(&self) -> Result<Vec<ScheduledTask>>;

    /// Records the outcome of one run: `{last_run, next_run, last_success |
    /// last_error}` per the §4.7 state machine.
    async fn record_run(
        &self,
        id: TaskId,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
        outcome: &std::result::Result<(), String>,
    ) -> Result<()>;
}

#[async_trait]
pub trait TaskResultRepository: Send + Sync {
    /// Inserts a `TaskResult` row, then prunes history down to the 100
    /// most recent rows for that task (§4.7).
    async fn record(&self, result: &TaskResult) -> Result<()>;
    async fn list_by_task(&self, task_id: TaskId) -> Result<Vec<TaskResult>>;
}

pub struct SqliteScheduledTaskRepository {
    pool: SqlitePool,
}

impl SqliteScheduledTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub struct SqliteTaskResultRepository {
    pool: SqlitePool,
}

impl SqliteTaskResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_task(row: ScheduledTaskRow) -> Result<ScheduledTask> {
    Ok(ScheduledTask {
        id: TaskId::from_string(&row.id).map_err(|e| StoreError::InvalidInput {
            field: "id".to_string(),
            message: e.to_string(),
        })?,
        name: row.name,
        interval: Duration::seconds(row.interval_secs),
        enabled: row.enabled != 0,
        last_run: row.last_run.and_then(DateTime::from_timestamp_millis),
        next_run: row.next_run.and_then(DateTime::from_timestamp_millis),
        last_success: row.last_success.and_then(DateTime::from_timestamp_millis),
        last_error: row.last_error,
    })
}

fn row_to_result(row: TaskResultRow) -> Result<TaskResult> {
    Ok(TaskResult {
        id: JobId::from_string(&row.id).map_err(|e| StoreError::InvalidInput {
            field: "id".to_string(),
            message: e.to_string(),
        })?,
        task_id: TaskId::from_string(&row.task_id).map_err(|e| StoreError::InvalidInput {
            field: "task_id".to_string(),
            message: e.to_string(),
        })?,
        started_at: DateTime::from_timestamp_millis(row.started_at).unwrap_or_default(),
        ended_at: DateTime::from_timestamp_millis(row.ended_at).unwrap_or_default(),
        success: row.success != 0,
        error: row.error,
        items_processed: row.items_processed as u64,
    })
}

#[async_trait]
impl ScheduledTaskRepository for SqliteScheduledTaskRepository {
    async fn create(&self, task: &ScheduledTask) -> Result<()> {
        sqlx::query::<Sqlite>(
            "INSERT INTO scheduled_tasks (id, name, interval_secs, enabled, last_run, next_run, last_success, last_error)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.as_str())
        .bind(&task.name)
        .bind(task.interval.num_seconds())
        .bind(task.enabled as i64)
        .bind(task.last_run.map(|t| t.timestamp_millis()))
        .bind(task.next_run.map(|t| t.timestamp_millis()))
        .bind(task.last_success.map(|t| t.timestamp_millis()))
        .bind(&task.last_error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: TaskId) -> Result<ScheduledTask> {
        let row = sqlx::query_as::<_, ScheduledTaskRow>("SELECT * FROM scheduled_tasks WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("ScheduledTask", id.as_str()))?;
        row_to_task(row)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ScheduledTask>> {
        let row = sqlx::query_as::<_, ScheduledTaskRow>("SELECT * FROM scheduled_tasks WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_task).transpose()
    }

    async fn list(&self) -> Result<Vec<ScheduledTask>> {
        let rows = sqlx::query_as::<_, ScheduledTaskRow>("SELECT * FROM scheduled_tasks ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_task).collect()
    }

    async fn list_enabled(&self) -> Result<Vec<ScheduledTask>> {
        let rows = sqlx::query_as::<_, ScheduledTaskRow>(
            "SELECT * FROM scheduled_tasks WHERE enabled = 1 ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_task).collect()
    }

    async fn record_run(
        &self,
        id: TaskId,
        last_run: DateTime<Utc>,
        next_run: DateTime<Utc>,
        outcome: &std::result::Result<(), String>,
    ) -> Result<()> {
        let (last_success, last_error): (Option<i64>, Option<String>) = match outcome {
            Ok(()) => (Some(last_run.timestamp_millis()), None),
            Err(message) => (None, Some(message.clone())),
        };

        let result = sqlx::query::<Sqlite>(
            "UPDATE scheduled_tasks
             SET last_run = ?, next_run = ?,
                 last_success = COALESCE(?, last_success),
                 last_error = ?
             WHERE id = ?",
        )
        .bind(last_run.timestamp_millis())
        .bind(next_run.timestamp_millis())
        .bind(last_success)
        .bind(last_error)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("ScheduledTask", id.as_str()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskResultRepository for SqliteTaskResultRepository {
    async fn record(&self, result: &TaskResult) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query::<Sqlite>(
            "INSERT INTO task_results (id, task_id, started_at, ended_at, success, error, items_processed)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(result.id.as_str())
        .bind(result.task_id.as_str())
        .bind(result.started_at.timestamp_millis())
        .bind(result.ended_at.timestamp_millis())
        .bind(result.success as i64)
        .bind(&result.error)
        .bind(result.items_processed as i64)
        .execute(&mut *tx)
        .await?;

        // Prune to the 100 most recent rows per task (§4.7).
        sqlx::query::<Sqlite>(
            "DELETE FROM task_results
             WHERE task_id = ? AND id NOT IN (
                 SELECT id FROM task_results WHERE task_id = ? ORDER BY started_at DESC LIMIT ?
             )",
        )
        .bind(result.task_id.as_str())
        .bind(result.task_id.as_str())
        .bind(TASK_RESULT_HISTORY_LIMIT)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_by_task(&self, task_id: TaskId) -> Result<Vec<TaskResult>> {
        let rows = sqlx::query_as::<_, TaskResultRow>(
            "SELECT * FROM task_results WHERE task_id = ? ORDER BY started_at DESC",
        )
        .bind(task_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_result).collect()
    }
}
