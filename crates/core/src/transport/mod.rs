//! Transport boundary
//!
//! The coordinator and query layer speak to persistence only through
//! [`TaskTransport`]; swapping HTTP for an in-process repository changes
//! nothing above this seam.

mod http;
mod local;

use async_trait::async_trait;

use crate::task::{NewTask, Task, TaskPatch};
use crate::Result;

pub use http::HttpTransport;
pub use local::LocalTransport;

/// Network boundary for task CRUD operations
///
/// Each operation fails with a structured [`crate::Error`] carrying a
/// human-readable message.
#[async_trait]
pub trait TaskTransport: Send + Sync {
    /// Fetch all tasks, newest first
    async fn list(&self) -> Result<Vec<Task>>;

    /// Fetch a single task
    async fn get(&self, id: &str) -> Result<Task>;

    /// Create a task from a draft
    async fn create(&self, draft: &NewTask) -> Result<Task>;

    /// Apply a partial update
    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task>;

    /// Delete a task
    async fn delete(&self, id: &str) -> Result<()>;
}
