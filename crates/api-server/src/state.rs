//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use taskdeck_core::task::{FileTaskStore, TaskRepository};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: Arc<dyn TaskRepository>,
}

impl AppState {
    /// Create a new AppState backed by file storage in the data directory
    pub async fn new(data_dir: PathBuf) -> taskdeck_core::Result<Self> {
        let tasks_path = data_dir.join("tasks.json");
        let task_store = FileTaskStore::new(tasks_path).await?;
        Ok(Self::with_store(Arc::new(task_store)))
    }

    /// Create an AppState over any repository (in-memory in tests)
    pub fn with_store(task_store: Arc<dyn TaskRepository>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { task_store }),
        }
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &dyn TaskRepository {
        self.inner.task_store.as_ref()
    }
}
