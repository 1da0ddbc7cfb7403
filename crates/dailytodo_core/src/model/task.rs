//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical to-do record persisted by the task store.
//! - Validate record shape on construction, write and decode.
//!
//! # Invariants
//! - `id` is stable, never nil, and never reused for another task.
//! - `name` is non-empty. Whitespace is kept as written; trimming is the
//!   caller's job.
//! - `time_estimate` is whole minutes and cannot be negative.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Validation errors for task invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    EmptyName,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyName => write!(f, "task name must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Renders a deadline as RFC 3339 UTC with a `Z` suffix.
///
/// Sub-second precision is printed only when present, so the text parses
/// back to the same instant.
pub fn format_deadline(deadline: &DateTime<Utc>) -> String {
    deadline.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Canonical to-do record.
///
/// Serialized with camelCase keys so the blob matches the shape the mobile
/// client has always written (`timeEstimate`, not `time_estimate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub done: bool,
    /// Estimated effort in minutes.
    pub time_estimate: u32,
    /// `None` means the task has no deadline.
    pub deadline: Option<DateTime<Utc>>,
}

/// Decode-side mirror of [`Task`].
///
/// Records written before `timeEstimate`/`deadline` existed decode with
/// their defaults instead of failing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    name: String,
    description: String,
    done: bool,
    #[serde(default)]
    time_estimate: u32,
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let task = Self {
            id: record.id,
            name: record.name,
            description: record.description,
            done: record.done,
            time_estimate: record.time_estimate,
            deadline: record.deadline,
        };
        task.validate()?;
        Ok(task)
    }
}

impl Task {
    /// Creates an open task with a freshly minted id.
    ///
    /// `time_estimate` starts at 0 and `deadline` at `None`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), name, description)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(
        id: TaskId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            name: name.into(),
            description: description.into(),
            done: false,
            time_estimate: 0,
            deadline: None,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn with_time_estimate(mut self, minutes: u32) -> Self {
        self.time_estimate = minutes;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_done(&mut self) -> bool {
        self.done = !self.done;
        self.done
    }

    /// Returns whether an open task has a deadline strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.done && self.deadline.is_some_and(|deadline| deadline < now)
    }

    /// Checks record invariants.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    /// - `EmptyName` when `name` is the empty string.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.name.is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        Ok(())
    }
}
