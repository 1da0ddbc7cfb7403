//! Task store contract and key-value backed implementation.
//!
//! # Responsibility
//! - Own the canonical task list and persist it as one JSON blob under
//!   [`TASKS_KEY`].
//! - Provide identity-addressed CRUD with full load-mutate-save cycles.
//!
//! # Invariants
//! - Every mutation rewrites the whole list; there are no partial writes.
//! - Every read goes back to storage; nothing is cached between calls.
//! - A failed save leaves the previously persisted blob untouched.
//! - List order is insertion order.
//!
//! # Limitations
//! - Callers on independent threads/processes are not coordinated. Two
//!   interleaved load-mutate-save cycles race and the last writer wins.

use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::repo::kv_store::{KeyValueStore, StorageError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Well-known slot holding the serialized task list.
pub const TASKS_KEY: &str = "tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Writing or reading the blob failed at the codec or storage level.
#[derive(Debug)]
pub enum PersistenceError {
    Encode(serde_json::Error),
    Read(StorageError),
    Write(StorageError),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode task list: {err}"),
            Self::Read(err) => write!(f, "failed to read task list: {err}"),
            Self::Write(err) => write!(f, "failed to write task list: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Read(err) | Self::Write(err) => Some(err),
        }
    }
}

/// A blob exists under the key but does not decode into a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptStoreError {
    pub key: &'static str,
    pub reason: String,
}

impl Display for CorruptStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "corrupt data under `{}`: {}", self.key, self.reason)
    }
}

impl Error for CorruptStoreError {}

/// Error surface of task store operations.
#[derive(Debug)]
pub enum StoreError {
    Persistence(PersistenceError),
    Corrupt(CorruptStoreError),
    Validation(TaskValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Corrupt(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Corrupt(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<CorruptStoreError> for StoreError {
    fn from(value: CorruptStoreError) -> Self {
        Self::Corrupt(value)
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// What to do when the persisted blob cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// Log and behave as if nothing was stored. The next save overwrites
    /// the unreadable blob.
    #[default]
    TreatAsEmpty,
    /// Surface `StoreError::Corrupt` and refuse to mutate.
    Strict,
}

/// Construction options for [`TaskStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub corrupt_policy: CorruptPolicy,
}

/// Tagged result of reading the task slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing has ever been saved.
    Missing,
    Loaded(Vec<Task>),
    Corrupt(CorruptStoreError),
}

impl LoadOutcome {
    /// Resolves the outcome into a task list under `policy`.
    pub fn into_tasks(self, policy: CorruptPolicy) -> StoreResult<Vec<Task>> {
        match self {
            Self::Missing => Ok(Vec::new()),
            Self::Loaded(tasks) => Ok(tasks),
            Self::Corrupt(err) => match policy {
                CorruptPolicy::TreatAsEmpty => Ok(Vec::new()),
                CorruptPolicy::Strict => Err(err.into()),
            },
        }
    }
}

/// Repository interface for task CRUD.
///
/// All calls operate on full `Task` values, never partial patches.
pub trait TaskRepository {
    fn load_all(&self) -> StoreResult<Vec<Task>>;
    fn save_all(&self, tasks: &[Task]) -> StoreResult<()>;
    fn create(&self, task: &Task) -> StoreResult<()>;
    /// Replaces the first record with `task.id`. Returns `false` and writes
    /// nothing when no record matches.
    fn update(&self, task: &Task) -> StoreResult<bool>;
    /// Removes every record with `id`. Returns the number removed.
    fn delete_by_id(&self, id: TaskId) -> StoreResult<usize>;

    fn delete(&self, task: &Task) -> StoreResult<usize> {
        self.delete_by_id(task.id)
    }

    fn find(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.load_all()?.into_iter().find(|task| task.id == id))
    }
}

/// Task list persisted as one JSON array in a key-value slot.
pub struct TaskStore<S: KeyValueStore> {
    slots: S,
    options: StoreOptions,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Creates a store with default options. Nothing is loaded eagerly.
    pub fn new(slots: S) -> Self {
        Self::with_options(slots, StoreOptions::default())
    }

    pub fn with_options(slots: S, options: StoreOptions) -> Self {
        Self { slots, options }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Reads the slot without applying the corruption policy.
    ///
    /// # Errors
    /// - `PersistenceError::Read` when the backend itself fails.
    pub fn load_outcome(&self) -> StoreResult<LoadOutcome> {
        let bytes = self
            .slots
            .get(TASKS_KEY)
            .map_err(PersistenceError::Read)?;
        let Some(bytes) = bytes else {
            return Ok(LoadOutcome::Missing);
        };

        match serde_json::from_slice::<Vec<Task>>(&bytes) {
            Ok(tasks) => Ok(LoadOutcome::Loaded(tasks)),
            Err(err) => Ok(LoadOutcome::Corrupt(CorruptStoreError {
                key: TASKS_KEY,
                reason: err.to_string(),
            })),
        }
    }

    fn load_for_mutation(&self, op: &'static str) -> StoreResult<Vec<Task>> {
        self.load_all().inspect_err(|err| {
            error!("event=task_store_{op} module=store status=error stage=load error={err}");
        })
    }
}

impl<S: KeyValueStore> TaskRepository for TaskStore<S> {
    fn load_all(&self) -> StoreResult<Vec<Task>> {
        let started_at = Instant::now();
        let outcome = self.load_outcome()?;
        if let LoadOutcome::Corrupt(err) = &outcome {
            warn!(
                "event=task_store_load module=store status=corrupt policy={:?} error={}",
                self.options.corrupt_policy, err
            );
        }

        let tasks = outcome.into_tasks(self.options.corrupt_policy)?;
        debug!(
            "event=task_store_load module=store status=ok count={} duration_ms={}",
            tasks.len(),
            started_at.elapsed().as_millis()
        );
        Ok(tasks)
    }

    fn save_all(&self, tasks: &[Task]) -> StoreResult<()> {
        let started_at = Instant::now();
        for task in tasks {
            task.validate()?;
        }

        let encoded = serde_json::to_vec(tasks).map_err(|err| {
            error!("event=task_store_save module=store status=error error_code=encode_failed error={err}");
            PersistenceError::Encode(err)
        })?;

        self.slots.set(TASKS_KEY, &encoded).map_err(|err| {
            error!("event=task_store_save module=store status=error error_code=write_failed error={err}");
            PersistenceError::Write(err)
        })?;

        info!(
            "event=task_store_save module=store status=ok count={} bytes={} duration_ms={}",
            tasks.len(),
            encoded.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn create(&self, task: &Task) -> StoreResult<()> {
        task.validate()?;
        let mut tasks = self.load_for_mutation("create")?;
        tasks.push(task.clone());
        self.save_all(&tasks)
    }

    fn update(&self, task: &Task) -> StoreResult<bool> {
        task.validate()?;
        let mut tasks = self.load_for_mutation("update")?;
        let Some(slot) = tasks.iter_mut().find(|existing| existing.id == task.id) else {
            debug!("event=task_store_update module=store status=skipped reason=not_found");
            return Ok(false);
        };

        *slot = task.clone();
        self.save_all(&tasks)?;
        Ok(true)
    }

    fn delete_by_id(&self, id: TaskId) -> StoreResult<usize> {
        let mut tasks = self.load_for_mutation("delete")?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        let removed = before - tasks.len();
        if removed == 0 {
            debug!("event=task_store_delete module=store status=skipped reason=not_found");
            return Ok(0);
        }

        self.save_all(&tasks)?;
        Ok(removed)
    }
}
