pub mod error;
pub mod habit_store;
pub mod storage;
pub mod task_store;
