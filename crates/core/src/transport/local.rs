//! In-process transport
//!
//! Adapts a [`TaskRepository`] to the transport interface: the
//! persistence collaborator without the network. Used for development
//! and as the happy-path double in tests.

use std::sync::Arc;

use async_trait::async_trait;

use super::TaskTransport;
use crate::task::{NewTask, Task, TaskPatch, TaskRepository};
use crate::{Error, Result};

pub struct LocalTransport {
    repository: Arc<dyn TaskRepository>,
}

impl LocalTransport {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl TaskTransport for LocalTransport {
    async fn list(&self) -> Result<Vec<Task>> {
        self.repository.list().await
    }

    async fn get(&self, id: &str) -> Result<Task> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    async fn create(&self, draft: &NewTask) -> Result<Task> {
        self.repository.create(draft.clone()).await
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        self.repository.update(id, patch.clone()).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(Error::TaskNotFound(id.to_string()))
        }
    }
}
