use crate::domain::models::Habit;
use crate::infrastructure::error::StoreError;
use crate::infrastructure::task_store::parse_timestamp;
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[async_trait]
pub trait HabitStore: Send + Sync {
    async fn get_all_habits(&self) -> Result<Vec<Habit>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct SqliteHabitStore {
    db_path: PathBuf,
}

impl SqliteHabitStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Connection::open(&self.db_path).map_err(StoreError::from)
    }
}

type HabitRow = (String, String, bool, Option<String>, String, String);

fn habit_from_row(row: HabitRow) -> Result<Habit, StoreError> {
    let (id, title, reminder_enabled, reminder_duration, active_days_raw, created_at_raw) = row;

    let created_at = parse_timestamp(&created_at_raw, "habit.created_at")?;
    // Same degradation as task reminders: a corrupt day list means the habit
    // is treated as due every day rather than failing the enumeration.
    let active_days: Vec<String> = serde_json::from_str(&active_days_raw).unwrap_or_default();

    Ok(Habit {
        id,
        title,
        reminder_enabled,
        reminder_duration,
        active_days,
        created_at,
    })
}

#[async_trait]
impl HabitStore for SqliteHabitStore {
    async fn get_all_habits(&self) -> Result<Vec<Habit>, StoreError> {
        let connection = self.connect()?;
        let mut statement = connection.prepare(
            "SELECT id, title, reminder_enabled, reminder_duration, active_days, created_at
             FROM habits ORDER BY created_at, id",
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

        let mut habits = Vec::new();
        for row in rows {
            habits.push(habit_from_row(row?)?);
        }
        Ok(habits)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHabitStore {
    habits: Mutex<Vec<Habit>>,
}

impl InMemoryHabitStore {
    pub fn with_habits(habits: Vec<Habit>) -> Self {
        Self {
            habits: Mutex::new(habits),
        }
    }
}

#[async_trait]
impl HabitStore for InMemoryHabitStore {
    async fn get_all_habits(&self) -> Result<Vec<Habit>, StoreError> {
        let habits = self
            .habits
            .lock()
            .map_err(|error| StoreError::InvalidRecord(format!("habit store lock poisoned: {error}")))?;
        Ok(habits.clone())
    }
}
