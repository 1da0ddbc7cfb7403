//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task list CRUD use-cases to Dart via FRB.
//! - Translate core types into string-friendly envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failed writes always return `ok=false`; they never claim success.
//! - Every call opens its own connection; no store handle outlives a call.

use chrono::{DateTime, Utc};
use dailytodo_core::db::open_db;
use dailytodo_core::{
    core_version as core_version_inner, example_tasks, format_deadline,
    init_logging as init_logging_inner, ping as ping_inner, CorruptPolicy, SqliteKeyValueStore,
    StoreOptions, StoreResult, Task, TaskDraft, TaskId, TaskService, TaskStore,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const TASK_DB_FILE_NAME: &str = "dailytodo.sqlite3";
const DB_PATH_ENV: &str = "DAILYTODO_DB_PATH";
const STRICT_LOAD_ENV: &str = "DAILYTODO_STRICT_LOAD";
static TASK_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_OPTIONS: OnceLock<StoreOptions> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task record as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Stable task ID in string form.
    pub id: String,
    pub name: String,
    pub description: String,
    pub done: bool,
    /// Minutes.
    pub time_estimate: u32,
    /// RFC 3339 UTC timestamp, `None` when the task has no deadline.
    pub deadline: Option<String>,
}

/// Full task list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Whether the list was read successfully.
    pub ok: bool,
    pub items: Vec<TaskItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the operation succeeded. A missing id is not a failure.
    pub ok: bool,
    /// Affected task ID when one applies.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: Option<TaskId>) -> Self {
        Self {
            ok: true,
            task_id: task_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Lists every stored task in insertion order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> TaskListResponse {
    match with_task_service(|service| service.list_tasks()) {
        Ok(tasks) => {
            let items = tasks.iter().map(to_task_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("Loaded {} task(s).", items.len())
            };
            TaskListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("task_list failed: {err}"),
        },
    }
}

/// Creates a task from the create screen.
///
/// `deadline` is an RFC 3339 timestamp; `None` or blank means no deadline.
///
/// # FFI contract
/// - Returns created task ID on success.
/// - Rejects blank names and unparseable deadlines without writing.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    name: String,
    description: String,
    time_estimate: u32,
    deadline: Option<String>,
) -> TaskActionResponse {
    let deadline = match parse_deadline(deadline.as_deref()) {
        Ok(deadline) => deadline,
        Err(message) => {
            return TaskActionResponse::failure(format!("task_create failed: {message}"))
        }
    };
    let draft = TaskDraft {
        time_estimate,
        deadline,
        ..TaskDraft::new(name, description)
    };

    match with_task_service(|service| service.create_task(draft)) {
        Ok(id) => TaskActionResponse::success("Task created.", Some(id)),
        Err(err) => TaskActionResponse::failure(format!("task_create failed: {err}")),
    }
}

/// Replaces a task's fields by id.
///
/// # FFI contract
/// - Unknown id is a silent no-op reported as `ok=true` with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(item: TaskItem) -> TaskActionResponse {
    let task = match from_task_item(item) {
        Ok(task) => task,
        Err(message) => {
            return TaskActionResponse::failure(format!("task_update failed: {message}"))
        }
    };

    match with_task_service(|service| service.edit_task(&task)) {
        Ok(true) => TaskActionResponse::success("Task updated.", Some(task.id)),
        Ok(false) => TaskActionResponse::success("Task not found; nothing changed.", None),
        Err(err) => TaskActionResponse::failure(format!("task_update failed: {err}")),
    }
}

/// Sets the completion flag of one task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_set_done(id: String, done: bool) -> TaskActionResponse {
    let id = match parse_task_id(&id) {
        Ok(id) => id,
        Err(message) => {
            return TaskActionResponse::failure(format!("task_set_done failed: {message}"))
        }
    };

    match with_task_service(|service| service.set_done(id, done)) {
        Ok(true) => TaskActionResponse::success("Task updated.", Some(id)),
        Ok(false) => TaskActionResponse::success("Task not found; nothing changed.", None),
        Err(err) => TaskActionResponse::failure(format!("task_set_done failed: {err}")),
    }
}

/// Deletes one task. The UI confirms before calling.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskActionResponse {
    let id = match parse_task_id(&id) {
        Ok(id) => id,
        Err(message) => {
            return TaskActionResponse::failure(format!("task_delete failed: {message}"))
        }
    };

    match with_task_service(|service| service.delete_task(id)) {
        Ok(true) => TaskActionResponse::success("Task deleted.", Some(id)),
        Ok(false) => TaskActionResponse::success("Task not found; nothing changed.", None),
        Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Appends the example tasks. Called by the UI on first launch.
#[flutter_rust_bridge::frb(sync)]
pub fn task_seed_examples() -> TaskActionResponse {
    match with_task_service(|service| service.seed_tasks(example_tasks())) {
        Ok(ids) => TaskActionResponse::success(format!("Seeded {} task(s).", ids.len()), None),
        Err(err) => TaskActionResponse::failure(format!("task_seed_examples failed: {err}")),
    }
}

fn resolve_task_db_path() -> PathBuf {
    TASK_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(TASK_DB_FILE_NAME)
        })
        .clone()
}

fn resolve_store_options() -> StoreOptions {
    *STORE_OPTIONS.get_or_init(|| {
        let strict = std::env::var(STRICT_LOAD_ENV)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);
        StoreOptions {
            corrupt_policy: if strict {
                CorruptPolicy::Strict
            } else {
                CorruptPolicy::TreatAsEmpty
            },
        }
    })
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn with_task_service<T>(
    f: impl FnOnce(&TaskService<TaskStore<SqliteKeyValueStore<'_>>>) -> StoreResult<T>,
) -> Result<T, String> {
    let db_path = resolve_task_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    let slots = SqliteKeyValueStore::try_new(&conn)
        .map_err(|err| format!("task store init failed: {err}"))?;
    let service = TaskService::new(TaskStore::with_options(slots, resolve_store_options()));
    f(&service).map_err(|err| {
        warn!("event=ffi_call module=ffi status=error error={err}");
        err.to_string()
    })
}

fn parse_task_id(raw: &str) -> Result<TaskId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid task id `{raw}`"))
}

fn parse_deadline(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|err| format!("invalid deadline `{value}`: {err}")),
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        name: task.name.clone(),
        description: task.description.clone(),
        done: task.done,
        time_estimate: task.time_estimate,
        deadline: task.deadline.as_ref().map(format_deadline),
    }
}

fn from_task_item(item: TaskItem) -> Result<Task, String> {
    let id = parse_task_id(&item.id)?;
    let deadline = parse_deadline(item.deadline.as_deref())?;
    let mut task = Task::with_id(id, item.name, item.description)
        .map_err(|err| err.to_string())?
        .with_time_estimate(item.time_estimate)
        .with_done(item.done);
    task.deadline = deadline;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, parse_deadline, parse_flag, ping, resolve_task_db_path,
        task_create, task_delete, task_list, task_seed_examples, task_set_done, task_update,
        TASK_DB_FILE_NAME, TASK_DB_PATH,
    };
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use tempfile::TempDir;

    // Every call rewrites the same blob; concurrent test threads would race
    // and lose each other's writes.
    static DB_LOCK: Mutex<()> = Mutex::new(());
    static TEST_DB_DIR: OnceLock<TempDir> = OnceLock::new();

    /// Pins the process-wide DB path to a private temp dir, then serializes.
    fn lock_test_db() -> MutexGuard<'static, ()> {
        let dir = TEST_DB_DIR
            .get_or_init(|| tempfile::tempdir().expect("test db dir should be created"));
        let _ = TASK_DB_PATH.set(dir.path().join(TASK_DB_FILE_NAME));
        DB_LOCK.lock().unwrap_or_else(|err| err.into_inner())
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn parse_deadline_accepts_rfc3339_and_blank() {
        assert_eq!(parse_deadline(None).unwrap(), None);
        assert_eq!(parse_deadline(Some("  ")).unwrap(), None);
        assert!(parse_deadline(Some("2024-12-20T18:30:00Z")).unwrap().is_some());
        assert!(parse_deadline(Some("tomorrow")).is_err());
    }

    #[test]
    fn parse_flag_accepts_common_truthy_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn task_create_then_list_returns_item() {
        let _guard = lock_test_db();
        let created = task_create(
            "Buy milk".to_string(),
            "2%".to_string(),
            10,
            Some("2024-12-20T20:30:00+02:00".to_string()),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.task_id.expect("create should return task_id");

        let listed = task_list();
        assert!(listed.ok, "{}", listed.message);
        let item = listed
            .items
            .iter()
            .find(|item| item.id == id)
            .expect("created task should be listed");
        assert_eq!(item.name, "Buy milk");
        assert_eq!(item.time_estimate, 10);
        assert_eq!(item.deadline.as_deref(), Some("2024-12-20T18:30:00Z"));
        assert!(!item.done);
    }

    #[test]
    fn tests_use_a_private_database_file() {
        let _guard = lock_test_db();
        let dir = TEST_DB_DIR.get().expect("test db dir should be set");

        let path = resolve_task_db_path();
        assert!(path.starts_with(dir.path()), "{}", path.display());
        assert_ne!(path, std::env::temp_dir().join(TASK_DB_FILE_NAME));
    }

    #[test]
    fn task_list_keeps_fractional_deadline_seconds() {
        let _guard = lock_test_db();
        let created = task_create(
            "Submit report".to_string(),
            String::new(),
            0,
            Some("2024-12-20T18:30:00.750Z".to_string()),
        );
        let id = created.task_id.expect("create should return task_id");

        let item = find_item(&id).expect("task should exist");
        assert_eq!(item.deadline.as_deref(), Some("2024-12-20T18:30:00.750Z"));

        let updated = task_update(item.clone());
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(find_item(&id), Some(item));
    }

    #[test]
    fn task_create_rejects_blank_name_and_bad_deadline() {
        let _guard = lock_test_db();
        let blank = task_create(" ".to_string(), "x".to_string(), 0, None);
        assert!(!blank.ok);
        assert!(blank.message.contains("name"));

        let bad = task_create("ok".to_string(), String::new(), 0, Some("soon".to_string()));
        assert!(!bad.ok);
        assert!(bad.message.contains("deadline"));
    }

    #[test]
    fn task_set_done_update_and_delete_round_trip() {
        let _guard = lock_test_db();
        let created = task_create("Workout".to_string(), String::new(), 30, None);
        let id = created.task_id.expect("create should return task_id");

        let done = task_set_done(id.clone(), true);
        assert!(done.ok, "{}", done.message);
        let mut item = find_item(&id).expect("task should exist");
        assert!(item.done);

        item.name = "Evening workout".to_string();
        let updated = task_update(item);
        assert_eq!(updated.task_id.as_deref(), Some(id.as_str()));
        assert_eq!(find_item(&id).unwrap().name, "Evening workout");

        let deleted = task_delete(id.clone());
        assert!(deleted.ok);
        assert_eq!(deleted.task_id.as_deref(), Some(id.as_str()));
        assert!(find_item(&id).is_none());

        let again = task_delete(id);
        assert!(again.ok);
        assert_eq!(again.task_id, None);
    }

    #[test]
    fn task_delete_rejects_malformed_id() {
        let response = task_delete("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid task id"));
    }

    #[test]
    fn task_seed_examples_appends_five_tasks() {
        let _guard = lock_test_db();
        let before = task_list().items.len();

        let seeded = task_seed_examples();
        assert!(seeded.ok, "{}", seeded.message);

        let after = task_list().items;
        assert_eq!(after.len(), before + 5);
        assert_eq!(after[before].name, "Clean Apartment");
        assert!(after[before].done);
    }

    fn find_item(id: &str) -> Option<super::TaskItem> {
        task_list().items.into_iter().find(|item| item.id == id)
    }
}
