use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderKind {
    Before,
    AtTime,
}

impl ReminderKind {
    pub fn key_segment(self) -> &'static str {
        match self {
            ReminderKind::Before => "before",
            ReminderKind::AtTime => "at-time",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderUnit {
    #[default]
    Minutes,
    Hours,
    Days,
}

impl ReminderUnit {
    pub fn key_segment(self) -> &'static str {
        match self {
            ReminderUnit::Minutes => "minutes",
            ReminderUnit::Hours => "hours",
            ReminderUnit::Days => "days",
        }
    }
}

/// A configured alert attached to a task or habit. Immutable value data once
/// read from storage; serde names match the persisted JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub unit: ReminderUnit,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub custom_date_time: Option<DateTime<Utc>>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Reminder {
    pub fn before(value: u32, unit: ReminderUnit) -> Self {
        Self {
            kind: ReminderKind::Before,
            value,
            unit,
            custom_date_time: None,
            enabled: true,
        }
    }

    pub fn minutes_before(minutes: u32) -> Self {
        Self::before(minutes, ReminderUnit::Minutes)
    }

    pub fn hours_before(hours: u32) -> Self {
        Self::before(hours, ReminderUnit::Hours)
    }

    pub fn days_before(days: u32) -> Self {
        Self::before(days, ReminderUnit::Days)
    }

    /// Zero-offset reminder firing at the task or habit time itself.
    pub fn at_time() -> Self {
        Self {
            kind: ReminderKind::AtTime,
            value: 0,
            unit: ReminderUnit::Minutes,
            custom_date_time: None,
            enabled: true,
        }
    }

    /// Substitute used when a stored reminder description is unrecognized.
    pub fn default_before() -> Self {
        Self::minutes_before(5)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Deferred,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub reminders: Vec<Reminder>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "task.id")?;
        validate_non_empty(&self.title, "task.title")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub reminder_enabled: bool,
    /// Raw reminder configuration as stored: either a JSON list of reminders
    /// or a legacy free-text descriptor.
    pub reminder_duration: Option<String>,
    /// Weekday names the habit is active on; empty means every day.
    pub active_days: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "habit.id")?;
        validate_non_empty(&self.title, "habit.title")?;
        for day in &self.active_days {
            validate_non_empty(day, "habit.active_days[]")?;
        }
        Ok(())
    }

    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        if self.active_days.is_empty() {
            return true;
        }
        let day = weekday_name(date.weekday());
        self.active_days
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(day))
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_task() -> Task {
        Task {
            id: "tsk-1".to_string(),
            title: "Renew passport".to_string(),
            description: None,
            status: TaskStatus::Pending,
            reminders: vec![Reminder::minutes_before(15)],
            created_at: fixed_time("2026-02-16T08:00:00Z"),
        }
    }

    fn sample_habit() -> Habit {
        Habit {
            id: "hbt-1".to_string(),
            title: "Morning run".to_string(),
            reminder_enabled: true,
            reminder_duration: Some("15 mins before".to_string()),
            active_days: vec!["Monday".to_string(), "Wednesday".to_string()],
            created_at: fixed_time("2026-02-16T08:00:00Z"),
        }
    }

    #[test]
    fn task_validate_rejects_empty_title() {
        let mut task = sample_task();
        task.title = "   ".to_string();
        assert!(task.validate().is_err());
    }

    #[test]
    fn habit_validate_accepts_valid_habit() {
        assert!(sample_habit().validate().is_ok());
    }

    #[test]
    fn habit_due_only_on_active_days() {
        let habit = sample_habit();
        // 2026-02-16 is a Monday, 2026-02-17 a Tuesday.
        assert!(habit.is_due_on(NaiveDate::from_ymd_opt(2026, 2, 16).expect("valid date")));
        assert!(!habit.is_due_on(NaiveDate::from_ymd_opt(2026, 2, 17).expect("valid date")));
    }

    #[test]
    fn habit_with_no_active_days_is_due_daily() {
        let mut habit = sample_habit();
        habit.active_days.clear();
        assert!(habit.is_due_on(NaiveDate::from_ymd_opt(2026, 2, 17).expect("valid date")));
    }

    #[test]
    fn reminder_deserializes_stored_json_shape() {
        let raw = r#"{"type":"before","value":30,"unit":"minutes","enabled":true}"#;
        let reminder: Reminder = serde_json::from_str(raw).expect("deserialize reminder");
        assert_eq!(reminder, Reminder::minutes_before(30));
    }

    #[test]
    fn reminder_enabled_defaults_to_true_when_absent() {
        let raw = r#"{"type":"at-time"}"#;
        let reminder: Reminder = serde_json::from_str(raw).expect("deserialize reminder");
        assert!(reminder.enabled);
        assert_eq!(reminder.kind, ReminderKind::AtTime);
    }

    #[test]
    fn reminder_custom_timestamp_roundtrips_as_millis() {
        let mut reminder = Reminder::at_time();
        reminder.custom_date_time = Some(fixed_time("2026-02-16T09:30:00Z"));
        let raw = serde_json::to_string(&reminder).expect("serialize reminder");
        assert!(raw.contains("\"customDateTime\":1771234200000"));
        let roundtrip: Reminder = serde_json::from_str(&raw).expect("deserialize reminder");
        assert_eq!(roundtrip, reminder);
    }
}
