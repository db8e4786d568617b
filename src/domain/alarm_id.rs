//! Shared alarm-id derivation.
//!
//! The scheduler and the resolver must produce identical ids for the same
//! (entity, reminder, date) tuple, so the whole derivation lives here as pure
//! functions with no external dependencies. Ids are partitioned into disjoint
//! per-module ranges so a fired alarm's kind can be inferred before searching.

use crate::domain::models::Reminder;
use chrono::{Datelike, NaiveDate};
use std::ops::RangeInclusive;

/// Number of days past today a habit reminder may be pre-scheduled. The
/// resolver's habit search window (today plus this many days) must cover the
/// same horizon.
pub const SCHEDULE_HORIZON_DAYS: i64 = 14;

const KEY_DELIMITER: char = '|';

const TASK_RANGE_START: i32 = 100_000;
const TASK_RANGE_END: i32 = 199_999;
const HABIT_RANGE_START: i32 = 200_000;
const HABIT_RANGE_END: i32 = 299_999;

/// Entity kinds that own a slice of the notification-id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmModule {
    Task,
    Habit,
}

impl AlarmModule {
    pub const fn range(self) -> RangeInclusive<i32> {
        match self {
            AlarmModule::Task => TASK_RANGE_START..=TASK_RANGE_END,
            AlarmModule::Habit => HABIT_RANGE_START..=HABIT_RANGE_END,
        }
    }

    const fn range_start(self) -> i32 {
        match self {
            AlarmModule::Task => TASK_RANGE_START,
            AlarmModule::Habit => HABIT_RANGE_START,
        }
    }

    const fn range_size(self) -> u64 {
        match self {
            AlarmModule::Task => (TASK_RANGE_END - TASK_RANGE_START + 1) as u64,
            AlarmModule::Habit => (HABIT_RANGE_END - HABIT_RANGE_START + 1) as u64,
        }
    }
}

/// Classify a fired alarm id by the module range it falls in. `None` marks a
/// legacy id predating range partitioning; callers fall back to an unranged
/// search.
pub fn module_for_alarm_id(alarm_id: i32) -> Option<AlarmModule> {
    if AlarmModule::Task.range().contains(&alarm_id) {
        Some(AlarmModule::Task)
    } else if AlarmModule::Habit.range().contains(&alarm_id) {
        Some(AlarmModule::Habit)
    } else {
        None
    }
}

pub fn derive_task_alarm_id(task_id: &str, reminder: &Reminder) -> i32 {
    derive_id(AlarmModule::Task, &task_candidate_key(task_id, reminder))
}

pub fn derive_habit_alarm_id(habit_id: &str, reminder: &Reminder, date: NaiveDate) -> i32 {
    derive_id(
        AlarmModule::Habit,
        &habit_candidate_key(habit_id, reminder, date),
    )
}

pub fn task_candidate_key(task_id: &str, reminder: &Reminder) -> String {
    let mut key = String::with_capacity(task_id.len() + 32);
    key.push_str(task_id);
    push_reminder_segments(&mut key, reminder);
    key
}

/// Habit keys carry the occurrence date: the same reminder recurs daily and
/// each day's occurrence must map to its own id.
pub fn habit_candidate_key(habit_id: &str, reminder: &Reminder, date: NaiveDate) -> String {
    let mut key = task_candidate_key(habit_id, reminder);
    key.push(KEY_DELIMITER);
    key.push_str(&format!(
        "{:04}{:02}{:02}",
        date.year(),
        date.month(),
        date.day()
    ));
    key
}

fn push_reminder_segments(key: &mut String, reminder: &Reminder) {
    key.push(KEY_DELIMITER);
    key.push_str(reminder.kind.key_segment());
    key.push(KEY_DELIMITER);
    if let Some(custom) = reminder.custom_date_time {
        key.push_str("custom");
        key.push(KEY_DELIMITER);
        key.push_str(&custom.timestamp_millis().to_string());
    } else {
        key.push_str(&reminder.value.to_string());
        key.push(KEY_DELIMITER);
        key.push_str(reminder.unit.key_segment());
    }
}

fn derive_id(module: AlarmModule, candidate_key: &str) -> i32 {
    let offset = fnv1a64(candidate_key) % module.range_size();
    module.range_start() + offset as i32
}

// FNV-1a, 64-bit. Deterministic across processes, unlike the stdlib hasher.
fn fnv1a64(input: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET_BASIS;
    for byte in input.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ReminderKind, ReminderUnit};
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).expect("valid date")
    }

    #[test]
    fn task_key_includes_id_kind_value_and_unit() {
        let reminder = Reminder::minutes_before(15);
        assert_eq!(
            task_candidate_key("tsk-1", &reminder),
            "tsk-1|before|15|minutes"
        );
    }

    #[test]
    fn custom_reminder_key_uses_millis_instead_of_value() {
        let mut reminder = Reminder::minutes_before(15);
        reminder.custom_date_time = Some(
            DateTime::parse_from_rfc3339("2026-02-16T09:30:00Z")
                .expect("valid datetime")
                .with_timezone(&Utc),
        );
        assert_eq!(
            task_candidate_key("tsk-1", &reminder),
            "tsk-1|before|custom|1771234200000"
        );
    }

    #[test]
    fn habit_key_appends_zero_padded_date() {
        let reminder = Reminder::at_time();
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).expect("valid date");
        assert_eq!(
            habit_candidate_key("hbt-1", &reminder, date),
            "hbt-1|at-time|0|minutes|20260203"
        );
    }

    #[test]
    fn module_classification_at_range_boundaries() {
        assert_eq!(module_for_alarm_id(99_999), None);
        assert_eq!(module_for_alarm_id(100_000), Some(AlarmModule::Task));
        assert_eq!(module_for_alarm_id(199_999), Some(AlarmModule::Task));
        assert_eq!(module_for_alarm_id(200_000), Some(AlarmModule::Habit));
        assert_eq!(module_for_alarm_id(299_999), Some(AlarmModule::Habit));
        assert_eq!(module_for_alarm_id(300_000), None);
        assert_eq!(module_for_alarm_id(0), None);
    }

    fn arb_reminder() -> impl Strategy<Value = Reminder> {
        (
            prop_oneof![Just(ReminderKind::Before), Just(ReminderKind::AtTime)],
            0u32..10_000u32,
            prop_oneof![
                Just(ReminderUnit::Minutes),
                Just(ReminderUnit::Hours),
                Just(ReminderUnit::Days)
            ],
            prop::option::of(0i64..4_102_444_800_000i64),
        )
            .prop_map(|(kind, value, unit, custom_millis)| Reminder {
                kind,
                value,
                unit,
                custom_date_time: custom_millis
                    .and_then(DateTime::<Utc>::from_timestamp_millis),
                enabled: true,
            })
    }

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (2020i32..2040i32, 1u32..=12u32, 1u32..=28u32).prop_map(|(year, month, day)| {
            NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
        })
    }

    proptest! {
        #[test]
        fn task_derivation_is_deterministic_and_in_range(
            task_id in "[a-z0-9\\-]{1,24}",
            reminder in arb_reminder()
        ) {
            let first = derive_task_alarm_id(&task_id, &reminder);
            let second = derive_task_alarm_id(&task_id, &reminder);
            prop_assert_eq!(first, second);
            prop_assert!(AlarmModule::Task.range().contains(&first));
        }

        #[test]
        fn habit_derivation_is_in_range_and_key_varies_with_date(
            habit_id in "[a-z0-9\\-]{1,24}",
            reminder in arb_reminder(),
            date in arb_date()
        ) {
            let id = derive_habit_alarm_id(&habit_id, &reminder, date);
            prop_assert!(AlarmModule::Habit.range().contains(&id));

            let next_day = date.succ_opt().expect("valid successor date");
            prop_assert_ne!(
                habit_candidate_key(&habit_id, &reminder, date),
                habit_candidate_key(&habit_id, &reminder, next_day)
            );
        }

        #[test]
        fn derived_ids_always_classify_back_to_their_module(
            entity_id in "[a-z0-9\\-]{1,24}",
            reminder in arb_reminder(),
            date in arb_date()
        ) {
            let task_id = derive_task_alarm_id(&entity_id, &reminder);
            let habit_id = derive_habit_alarm_id(&entity_id, &reminder, date);
            prop_assert_eq!(module_for_alarm_id(task_id), Some(AlarmModule::Task));
            prop_assert_eq!(module_for_alarm_id(habit_id), Some(AlarmModule::Habit));
        }
    }

    #[test]
    fn same_habit_reminder_on_two_dates_still_lands_in_habit_range() {
        let reminder = Reminder::minutes_before(5);
        let today = sample_date();
        let tomorrow = today.succ_opt().expect("valid successor date");
        let first = derive_habit_alarm_id("hbt-1", &reminder, today);
        let second = derive_habit_alarm_id("hbt-1", &reminder, tomorrow);
        assert!(AlarmModule::Habit.range().contains(&first));
        assert!(AlarmModule::Habit.range().contains(&second));
    }
}
