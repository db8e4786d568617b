pub mod alarm_id;
pub mod models;
pub mod reminder_text;
