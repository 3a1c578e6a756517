//! In-memory task storage implementation
//!
//! Keeps records in insertion order so list ordering is stable when
//! several tasks share a creation second.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::{NewTask, Task, TaskPatch};
use super::repository::{apply_update, newest_first, TaskRepository};
use super::validate;
use crate::{time, Error, Result};

/// In-memory task store
#[derive(Default)]
pub struct MemoryTaskStore {
    records: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskStore {
    async fn create(&self, draft: NewTask) -> Result<Task> {
        let draft = validate::new_task(&draft)?;
        let task = Task::from_draft(draft, time::now_seconds());
        let mut records = self.records.write().await;
        records.push(task.clone());
        Ok(task)
    }

    async fn get(&self, id: &str) -> Result<Option<Task>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let records = self.records.read().await;
        Ok(newest_first(&records))
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        let patch = validate::task_patch(&patch)?;
        let mut records = self.records.write().await;
        let task = records
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        apply_update(task, &patch, time::now_seconds());
        Ok(task.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|t| t.id != id);
        Ok(records.len() < before)
    }
}
