use crate::domain::alarm_id::{
    AlarmModule, SCHEDULE_HORIZON_DAYS, derive_habit_alarm_id, derive_task_alarm_id,
    module_for_alarm_id,
};
use crate::domain::models::{Habit, Task};
use crate::domain::reminder_text::parse_habit_reminders;
use crate::infrastructure::error::StoreError;
use crate::infrastructure::habit_store::HabitStore;
use crate::infrastructure::task_store::TaskStore;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Outcome of a resolution attempt. At most one side is populated; both empty
/// is a valid, displayable state and callers fall back to the raw alarm text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAlarm {
    pub task: Option<Task>,
    pub habit: Option<Habit>,
}

impl ResolvedAlarm {
    pub fn is_resolved(&self) -> bool {
        self.task.is_some() || self.habit.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolvedEntity {
    Task(Task),
    Habit(Habit),
}

impl From<Option<ResolvedEntity>> for ResolvedAlarm {
    fn from(entity: Option<ResolvedEntity>) -> Self {
        match entity {
            Some(ResolvedEntity::Task(task)) => Self {
                task: Some(task),
                habit: None,
            },
            Some(ResolvedEntity::Habit(habit)) => Self {
                task: None,
                habit: Some(habit),
            },
            None => Self::default(),
        }
    }
}

/// An alarm with no explicit task id and a missing or zero alarm id is an
/// intentionally entity-less fallback/test alarm, not a failed resolution.
pub fn is_fallback_alarm(explicit_task_id: Option<&str>, alarm_id: Option<i32>) -> bool {
    explicit_task_id.is_none() && alarm_id.unwrap_or(0) == 0
}

/// Reconstructs which task or habit produced a fired alarm id by replaying
/// the schedule-time derivation over all candidate (entity, reminder, date)
/// tuples. Best effort: store failures are logged and collapse to the empty
/// result so the alarm-response flow is never blocked.
pub struct AlarmResolver<T, H>
where
    T: TaskStore,
    H: HabitStore,
{
    task_store: Arc<T>,
    habit_store: Arc<H>,
    now_provider: NowProvider,
}

impl<T, H> AlarmResolver<T, H>
where
    T: TaskStore,
    H: HabitStore,
{
    pub fn new(task_store: Arc<T>, habit_store: Arc<H>) -> Self {
        Self {
            task_store,
            habit_store,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub async fn resolve(
        &self,
        explicit_task_id: Option<&str>,
        alarm_id: Option<i32>,
    ) -> ResolvedAlarm {
        if is_fallback_alarm(explicit_task_id, alarm_id) {
            tracing::debug!("entity-less fallback alarm, skipping resolution");
            return ResolvedAlarm::default();
        }

        let today = (self.now_provider)().date_naive();
        match self.lookup(explicit_task_id, alarm_id, today).await {
            Ok(entity) => ResolvedAlarm::from(entity),
            Err(error) => {
                tracing::warn!(%error, alarm_id, "alarm lookup failed, treating as unresolved");
                ResolvedAlarm::default()
            }
        }
    }

    async fn lookup(
        &self,
        explicit_task_id: Option<&str>,
        alarm_id: Option<i32>,
        today: NaiveDate,
    ) -> Result<Option<ResolvedEntity>, StoreError> {
        if let Some(task_id) = explicit_task_id {
            let task = self.task_store.get_task_by_id(task_id).await?;
            return Ok(task.map(ResolvedEntity::Task));
        }

        let Some(alarm_id) = alarm_id else {
            return Ok(None);
        };

        match module_for_alarm_id(alarm_id) {
            Some(AlarmModule::Task) => Ok(self
                .find_task_by_alarm_id(alarm_id)
                .await?
                .map(ResolvedEntity::Task)),
            Some(AlarmModule::Habit) => Ok(self
                .find_habit_by_alarm_id(alarm_id, today)
                .await?
                .map(ResolvedEntity::Habit)),
            // Legacy ids predate range partitioning; search both modules.
            None => {
                if let Some(task) = self.find_task_by_alarm_id(alarm_id).await? {
                    return Ok(Some(ResolvedEntity::Task(task)));
                }
                Ok(self
                    .find_habit_by_alarm_id(alarm_id, today)
                    .await?
                    .map(ResolvedEntity::Habit))
            }
        }
    }

    /// First task any of whose reminders derives to `alarm_id`. Collisions
    /// across tasks are rare enough that first match wins.
    async fn find_task_by_alarm_id(&self, alarm_id: i32) -> Result<Option<Task>, StoreError> {
        let tasks = self.task_store.get_all_tasks().await?;
        for task in tasks {
            if task.reminders.is_empty() {
                continue;
            }
            if task
                .reminders
                .iter()
                .any(|reminder| derive_task_alarm_id(&task.id, reminder) == alarm_id)
            {
                return Ok(Some(task));
            }
        }
        Ok(None)
    }

    /// Habit reminders recur daily, so every occurrence date in the
    /// scheduler's horizon (today through today + SCHEDULE_HORIZON_DAYS) is a
    /// candidate, skipping dates the habit is not due on.
    async fn find_habit_by_alarm_id(
        &self,
        alarm_id: i32,
        today: NaiveDate,
    ) -> Result<Option<Habit>, StoreError> {
        let habits = self.habit_store.get_all_habits().await?;
        for habit in habits {
            if !habit.reminder_enabled {
                continue;
            }
            let reminders = parse_habit_reminders(habit.reminder_duration.as_deref());
            if reminders.is_empty() {
                continue;
            }
            for reminder in &reminders {
                for day_offset in 0..=SCHEDULE_HORIZON_DAYS {
                    let date = today + Duration::days(day_offset);
                    if !habit.is_due_on(date) {
                        continue;
                    }
                    if derive_habit_alarm_id(&habit.id, reminder, date) == alarm_id {
                        return Ok(Some(habit));
                    }
                }
            }
        }
        Ok(None)
    }
}
