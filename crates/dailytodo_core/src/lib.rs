//! Core domain logic for DailyToDo.
//! This crate owns the persisted task list and its invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{format_deadline, Task, TaskId, TaskValidationError};
pub use repo::kv_store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use repo::task_store::{
    CorruptPolicy, CorruptStoreError, LoadOutcome, PersistenceError, StoreError, StoreOptions,
    StoreResult, TaskRepository, TaskStore, TASKS_KEY,
};
pub use service::task_service::{example_tasks, TaskDraft, TaskService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
