//! Parsing of stored habit reminder configuration.
//!
//! Two formats coexist in storage: the current one is a JSON list of
//! structured reminders, the legacy one a free-text descriptor such as
//! "15 mins before" or "Custom: 1h 30m". Parsing never fails: malformed JSON
//! yields no reminders, unrecognized legacy text yields the default.

use crate::domain::models::Reminder;

/// Parse a habit's raw reminder configuration into structured reminders.
pub fn parse_habit_reminders(raw: Option<&str>) -> Vec<Reminder> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') {
        return parse_reminder_list(trimmed);
    }
    parse_legacy_text(trimmed)
}

fn parse_reminder_list(raw: &str) -> Vec<Reminder> {
    let Ok(reminders) = serde_json::from_str::<Vec<Reminder>>(raw) else {
        return Vec::new();
    };
    reminders
        .into_iter()
        .filter(|reminder| reminder.enabled)
        .collect()
}

fn parse_legacy_text(raw: &str) -> Vec<Reminder> {
    let lowered = raw.to_lowercase();

    if lowered == "no reminder" {
        return Vec::new();
    }
    // "15 min before" contains "5 min before" as a substring, so the longer
    // minute patterns must be tested first.
    if mentions_minutes_before(&lowered, 15) {
        return vec![Reminder::minutes_before(15)];
    }
    if mentions_minutes_before(&lowered, 30) {
        return vec![Reminder::minutes_before(30)];
    }
    if mentions_minutes_before(&lowered, 5) {
        return vec![Reminder::minutes_before(5)];
    }
    if lowered.contains("1 hour before") || lowered.contains("1 hr before") {
        return vec![Reminder::hours_before(1)];
    }
    if lowered.contains("1 day before") {
        return vec![Reminder::days_before(1)];
    }
    if lowered == "at task time" || lowered == "at habit time" || lowered == "on time" {
        return vec![Reminder::at_time()];
    }
    if let Some(rest) = lowered.strip_prefix("custom:") {
        return vec![parse_custom_duration(rest)];
    }

    // Unrecognized legacy text gets the default rather than an error.
    vec![Reminder::default_before()]
}

fn mentions_minutes_before(lowered: &str, minutes: u32) -> bool {
    lowered.contains(&format!("{minutes} min before"))
        || lowered.contains(&format!("{minutes} mins before"))
}

/// Parse the free text after a "Custom:" prefix: an optional "<n>h" and an
/// optional "<n>m" combine into a minutes-before offset.
pub fn parse_custom_duration(text: &str) -> Reminder {
    let hours = number_before_suffix(text, 'h').unwrap_or(0);
    let minutes = number_before_suffix(text, 'm').unwrap_or(0);
    let total_minutes = hours * 60 + minutes;
    if total_minutes == 0 {
        return Reminder::default_before();
    }
    Reminder::minutes_before(total_minutes)
}

/// First run of digits followed (after optional spaces) by `suffix`,
/// case-insensitive. Returns `None` when no such run exists.
fn number_before_suffix(text: &str, suffix: char) -> Option<u32> {
    let bytes = text.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index].is_ascii_digit() {
            let start = index;
            while index < bytes.len() && bytes[index].is_ascii_digit() {
                index += 1;
            }
            let mut cursor = index;
            while cursor < bytes.len() && bytes[cursor] == b' ' {
                cursor += 1;
            }
            if cursor < bytes.len() && bytes[cursor].to_ascii_lowercase() == suffix as u8 {
                if let Ok(value) = text[start..index].parse::<u32>() {
                    return Some(value);
                }
            }
        } else {
            index += 1;
        }
    }
    None
}
