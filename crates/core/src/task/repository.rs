//! Task repository trait
//!
//! Defines the interface for task storage operations. Implementations
//! validate drafts and patches, assign identifiers and timestamps, and
//! keep `updated_at` monotonically non-decreasing.

use async_trait::async_trait;

use super::model::{NewTask, Task, TaskPatch};
use crate::Result;

/// Repository interface for task CRUD operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a task from a draft, assigning id and timestamps
    async fn create(&self, draft: NewTask) -> Result<Task>;

    /// Get a task by ID
    async fn get(&self, id: &str) -> Result<Option<Task>>;

    /// Get all tasks, newest first
    async fn list(&self) -> Result<Vec<Task>>;

    /// Apply a partial update to an existing task
    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task>;

    /// Delete a task by ID; false if it did not exist
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Newest-first ordering: created-at descending, insertion recency
/// breaking whole-second ties. `records` is in insertion order.
pub(super) fn newest_first(records: &[Task]) -> Vec<Task> {
    let mut tasks: Vec<Task> = records.iter().rev().cloned().collect();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tasks
}

/// Shared update path: validate, apply, bump `updated_at` monotonically.
/// An empty patch is a successful no-op that leaves the record untouched.
pub(super) fn apply_update(task: &mut Task, patch: &TaskPatch, now: i64) {
    if patch.is_empty() {
        return;
    }
    patch.apply_to(task);
    task.updated_at = now.max(task.updated_at);
}
