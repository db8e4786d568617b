pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::resolver::{AlarmResolver, ResolvedAlarm, is_fallback_alarm};
pub use domain::alarm_id::{
    AlarmModule, SCHEDULE_HORIZON_DAYS, derive_habit_alarm_id, derive_task_alarm_id,
    habit_candidate_key, module_for_alarm_id, task_candidate_key,
};
pub use domain::models::{Habit, Reminder, ReminderKind, ReminderUnit, Task, TaskStatus};
pub use domain::reminder_text::{parse_custom_duration, parse_habit_reminders};
pub use infrastructure::error::StoreError;
pub use infrastructure::habit_store::{HabitStore, InMemoryHabitStore, SqliteHabitStore};
pub use infrastructure::storage::initialize_database;
pub use infrastructure::task_store::{InMemoryTaskStore, SqliteTaskStore, TaskStore};
