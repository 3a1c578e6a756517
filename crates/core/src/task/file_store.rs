//! File-based task storage implementation
//!
//! Stores tasks as JSON in a file on disk, in insertion order so list
//! ordering survives restarts.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;

use super::model::{NewTask, Task, TaskPatch};
use super::repository::{apply_update, newest_first, TaskRepository};
use super::validate;
use crate::{time, Error, Result};

/// File-based task store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of records, insertion order
    records: RwLock<Vec<Task>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Persist the records to disk
    async fn persist(&self) -> Result<()> {
        let records = self.records.read().await;
        let content = serde_json::to_string_pretty(&*records)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

// Memory and disk must not diverge: every mutation rolls its in-memory
// change back when the persist fails.
#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn create(&self, draft: NewTask) -> Result<Task> {
        let draft = validate::new_task(&draft)?;
        let task = Task::from_draft(draft, time::now_seconds());
        {
            let mut records = self.records.write().await;
            records.push(task.clone());
        }
        if let Err(err) = self.persist().await {
            let mut records = self.records.write().await;
            records.retain(|t| t.id != task.id);
            return Err(err);
        }
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
        let (prior, updated) = {
            let mut records = self.records.write().await;
            let task = records
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
            let prior = task.clone();
            apply_update(task, &patch, time::now_seconds());
            (prior, task.clone())
        };
        if let Err(err) = self.persist().await {
            let mut records = self.records.write().await;
            if let Some(task) = records.iter_mut().find(|t| t.id == id) {
                *task = prior;
            }
            return Err(err);
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut records = self.records.write().await;
            records
                .iter()
                .position(|t| t.id == id)
                .map(|index| (index, records.remove(index)))
        };
        let Some((index, record)) = removed else {
            return Ok(false);
        };
        if let Err(err) = self.persist().await {
            let mut records = self.records.write().await;
            let len = records.len();
            records.insert(index.min(len), record);
            return Err(err);
        }
        Ok(true)
    }
}
