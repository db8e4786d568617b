use crate::domain::models::{Reminder, Task, TaskStatus};
use crate::infrastructure::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_task_by_id(&self, task_id: &str) -> Result<Option<Task>, StoreError>;
    async fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    db_path: PathBuf,
}

impl SqliteTaskStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Connection::open(&self.db_path).map_err(StoreError::from)
    }
}

type TaskRow = (String, String, Option<String>, String, String, String);

fn task_from_row(row: TaskRow) -> Result<Task, StoreError> {
    let (id, title, description, status_raw, reminders_raw, created_at_raw) = row;

    let status = parse_status(&status_raw)
        .ok_or_else(|| StoreError::InvalidRecord(format!("invalid task.status '{status_raw}'")))?;
    let created_at = parse_timestamp(&created_at_raw, "task.created_at")?;
    // A corrupt reminders column means that task simply has no schedulable
    // reminders; it must not fail the whole enumeration.
    let reminders: Vec<Reminder> = serde_json::from_str(&reminders_raw).unwrap_or_default();

    Ok(Task {
        id,
        title,
        description,
        status,
        reminders,
        created_at,
    })
}

fn parse_status(raw: &str) -> Option<TaskStatus> {
    match raw {
        "pending" => Some(TaskStatus::Pending),
        "in_progress" => Some(TaskStatus::InProgress),
        "completed" => Some(TaskStatus::Completed),
        "deferred" => Some(TaskStatus::Deferred),
        _ => None,
    }
}

pub(crate) fn parse_timestamp(raw: &str, field_name: &str) -> Result<DateTime<Utc>, StoreError> {
    let parsed = DateTime::parse_from_rfc3339(raw).map_err(|error| {
        StoreError::InvalidRecord(format!("invalid {field_name} '{raw}': {error}"))
    })?;
    Ok(parsed.with_timezone(&Utc))
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn get_task_by_id(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let connection = self.connect()?;
        let row: Option<TaskRow> = connection
            .query_row(
                "SELECT id, title, description, status, reminders, created_at
                 FROM tasks WHERE id = ?1",
                params![task_id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(task_from_row).transpose()
    }

    async fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let connection = self.connect()?;
        let mut statement = connection.prepare(
            "SELECT id, title, description, status, reminders, created_at
             FROM tasks ORDER BY created_at, id",
        )?;
        let rows = statement.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(task_from_row(row?)?);
        }
        Ok(tasks)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get_task_by_id(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let tasks = self
            .tasks
            .lock()
            .map_err(|error| StoreError::InvalidRecord(format!("task store lock poisoned: {error}")))?;
        Ok(tasks.iter().find(|task| task.id == task_id).cloned())
    }

    async fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = self
            .tasks
            .lock()
            .map_err(|error| StoreError::InvalidRecord(format!("task store lock poisoned: {error}")))?;
        Ok(tasks.clone())
    }
}
