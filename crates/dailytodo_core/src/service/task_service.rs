//! Task use-case service.
//!
//! # Responsibility
//! - Provide the entry points the UI layer calls: create from a draft,
//!   toggle completion, edit, delete, seed examples.
//! - Delegate persistence to a `TaskRepository`.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - Operations on a missing id are no-ops reported through return values.

use crate::model::task::{Task, TaskId};
use crate::repo::task_store::{StoreResult, TaskRepository};
use chrono::{DateTime, Utc};
use log::info;

/// Caller-supplied fields for a new task, before an id is minted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub time_estimate: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub done: bool,
}

impl TaskDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Use-case service wrapper for task CRUD.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds a task from `draft` and appends it.
    ///
    /// # Contract
    /// - `name` and `description` are trimmed before validation.
    /// - A fresh id is minted for every call.
    pub fn create_task(&self, draft: TaskDraft) -> StoreResult<TaskId> {
        let task = task_from_draft(draft)?;
        self.repo.create(&task)?;
        Ok(task.id)
    }

    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.repo.load_all()
    }

    pub fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.repo.find(id)
    }

    /// Full-record replace keyed by `task.id`. Returns `false` when missing.
    pub fn edit_task(&self, task: &Task) -> StoreResult<bool> {
        self.repo.update(task)
    }

    /// Sets the completion flag. Returns `false` when the id is missing.
    pub fn set_done(&self, id: TaskId, done: bool) -> StoreResult<bool> {
        let Some(mut task) = self.repo.find(id)? else {
            return Ok(false);
        };
        task.done = done;
        self.repo.update(&task)
    }

    /// Flips the completion flag and returns the new value, or `None` when
    /// the id is missing.
    pub fn toggle_done(&self, id: TaskId) -> StoreResult<Option<bool>> {
        let Some(mut task) = self.repo.find(id)? else {
            return Ok(None);
        };
        let done = task.toggle_done();
        if self.repo.update(&task)? {
            Ok(Some(done))
        } else {
            Ok(None)
        }
    }

    /// Returns whether a record was removed.
    pub fn delete_task(&self, id: TaskId) -> StoreResult<bool> {
        Ok(self.repo.delete_by_id(id)? > 0)
    }

    /// Creates every draft in order and returns the new ids.
    ///
    /// Deciding whether seeding should happen (first launch) is the
    /// caller's job.
    pub fn seed_tasks(&self, drafts: Vec<TaskDraft>) -> StoreResult<Vec<TaskId>> {
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            ids.push(self.create_task(draft)?);
        }
        info!(
            "event=task_seed module=service status=ok count={}",
            ids.len()
        );
        Ok(ids)
    }
}

/// Sample tasks shown to a user on first launch.
pub fn example_tasks() -> Vec<TaskDraft> {
    vec![
        TaskDraft {
            done: true,
            ..TaskDraft::new("Clean Apartment", "Vacuum and do laundry")
        },
        TaskDraft::new("Buy Groceries", "Milk, bread, eggs, and vegetables"),
        TaskDraft::new("Workout", "30 minutes of cardio at the gym"),
        TaskDraft::new("Read a Book", "Finish the first chapter of the new novel"),
        TaskDraft::new(
            "Plan Weekend Trip",
            "Research destinations and book accommodation",
        ),
    ]
}

fn task_from_draft(draft: TaskDraft) -> StoreResult<Task> {
    let mut task = Task::new(draft.name.trim(), draft.description.trim())?
        .with_time_estimate(draft.time_estimate)
        .with_done(draft.done);
    task.deadline = draft.deadline;
    Ok(task)
}
