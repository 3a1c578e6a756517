//! Task model and wire types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::time;

/// Prefix for locally synthesized identifiers; the server assigns UUIDs,
/// so a prefixed id can never collide with a real one.
const TEMP_ID_PREFIX: &str = "temp-";

/// Task status on the wire: `todo`, `in-progress`, `done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

/// A task record as the server holds it
///
/// Timestamps are whole seconds since the Unix epoch. Optional fields are
/// omitted from JSON when absent, never serialized as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// Build a server record from a validated draft.
    pub fn from_draft(draft: NewTask, now: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Synthesize a temporary identifier for a provisional record.
    pub fn temp_id() -> String {
        format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())
    }

    /// True if the identifier was synthesized locally.
    pub fn is_temp_id(id: &str) -> bool {
        id.starts_with(TEMP_ID_PREFIX)
    }
}

/// Fields for creating a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
}

impl NewTask {
    /// Create a draft with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the due date (seconds since epoch)
    pub fn with_due_date(mut self, due_date: i64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set the due date from a `YYYY-MM-DD` date input
    pub fn with_due_date_input(self, input: &str) -> Result<Self, ValidationError> {
        Ok(self.with_due_date(time::parse_date_input(input)?))
    }
}

/// Three-way edit for a clearable field: not mentioned, explicitly
/// cleared, or set to a value.
///
/// On the wire a missing field is `Keep`, an explicit null is `Clear`,
/// and a value is `Set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Apply this edit to an optional field.
    pub fn apply(self, field: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *field = None,
            Patch::Set(value) => *field = Some(value),
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            // Keep is skipped at the field level; a bare Keep still has to
            // serialize as something, and null is the closest.
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
            Patch::Set(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // A missing field never reaches this point (serde falls back to
        // Default = Keep), so null here means an explicit Clear.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

/// Partial update for a task
///
/// `title`/`description`/`status` are never clearable, so plain `Option`
/// (absent = unchanged) suffices; `priority`/`due_date` carry the
/// three-way [`Patch`] semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub priority: Patch<u8>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub due_date: Patch<i64>,
}

impl TaskPatch {
    /// True if the patch touches no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_keep()
            && self.due_date.is_keep()
    }

    /// Apply the patch to a record in place. Timestamps are the caller's
    /// concern.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        self.priority.apply(&mut task.priority);
        self.due_date.apply(&mut task.due_date);
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Patch::Set(priority);
        self
    }

    /// Clear the priority
    pub fn clear_priority(mut self) -> Self {
        self.priority = Patch::Clear;
        self
    }

    /// Set the due date (seconds since epoch)
    pub fn with_due_date(mut self, due_date: i64) -> Self {
        self.due_date = Patch::Set(due_date);
        self
    }

    /// Set the due date from a `YYYY-MM-DD` date input
    pub fn with_due_date_input(self, input: &str) -> Result<Self, ValidationError> {
        Ok(self.with_due_date(time::parse_date_input(input)?))
    }

    /// Clear the due date
    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Patch::Clear;
        self
    }
}
