//! Mutation coordinator
//!
//! Sequences each mutation: validate, apply the optimistic patch, send
//! the request, then commit or revert. Per mutation the state machine is
//! `Idle -> Patched -> {Committed | Reverted}`; validation failures stop
//! in `Idle`, before any patch is applied or any request is sent.
//!
//! Each mutation body runs in a detached task, so dropping the caller's
//! future after issue abandons the notification, never the resolution.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheStore, CachedView, QueryKey, Tag};
use crate::task::{validate, NewTask, Task, TaskPatch};
use crate::transport::TaskTransport;
use crate::{time, Error, Result};

pub struct MutationCoordinator {
    cache: CacheStore,
    transport: Arc<dyn TaskTransport>,
}

impl MutationCoordinator {
    pub fn new(cache: CacheStore, transport: Arc<dyn TaskTransport>) -> Self {
        Self { cache, transport }
    }

    /// Create a task: a provisional record goes to the head of the list,
    /// then is replaced in place by the server record, or removed again.
    pub async fn create(&self, draft: NewTask) -> Result<Task> {
        let draft = validate::new_task(&draft)?;
        let cache = self.cache.clone();
        let transport = Arc::clone(&self.transport);
        let resolution = tokio::spawn(async move {
            let temp_id = Task::temp_id();
            let mut provisional = Task::from_draft(draft.clone(), time::now_seconds());
            provisional.id = temp_id.clone();

            let mut pending = cache.begin_optimistic(&[QueryKey::TaskList], |_, view| {
                if let CachedView::List(tasks) = view {
                    tasks.insert(0, provisional.clone());
                }
            });

            match transport.create(&draft).await {
                Ok(task) => {
                    pending.commit();
                    cache.replace_record(&temp_id, &task);
                    cache.invalidate(&[Tag::TaskList]);
                    debug!(id = %task.id, "create committed");
                    Ok(task)
                }
                Err(err) => {
                    pending.revert();
                    warn!(error = %err, "create reverted");
                    Err(err)
                }
            }
        });
        resolution
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
    }

    /// Update a task: the patch is merged into every view holding the
    /// record with a provisional `updated_at`, then the whole record is
    /// replaced by the authoritative one, or the prior state restored.
    pub async fn update(&self, id: impl Into<String>, patch: TaskPatch) -> Result<Task> {
        let id = id.into();
        let patch = validate::task_patch(&patch)?;
        let cache = self.cache.clone();
        let transport = Arc::clone(&self.transport);
        let resolution = tokio::spawn(async move {
            let now = time::now_seconds();
            let keys = [QueryKey::TaskList, QueryKey::task(id.clone())];
            let mut pending = cache.begin_optimistic(&keys, |_, view| {
                let slot = match view {
                    CachedView::List(tasks) => tasks.iter_mut().find(|t| t.id == id),
                    CachedView::Detail(task) => (task.id == id).then_some(task),
                };
                if let Some(task) = slot {
                    patch.apply_to(task);
                    task.updated_at = now.max(task.updated_at);
                }
            });

            match transport.update(&id, &patch).await {
                Ok(task) => {
                    pending.commit();
                    cache.replace_record(&id, &task);
                    cache.invalidate(&[Tag::task(&id), Tag::TaskList]);
                    debug!(%id, "update committed");
                    Ok(task)
                }
                Err(err) => {
                    pending.revert();
                    warn!(%id, error = %err, "update reverted");
                    Err(err)
                }
            }
        });
        resolution
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
    }

    /// Delete a task: the record leaves the list immediately; a failure
    /// restores the prior list snapshot, original position included.
    pub async fn delete(&self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        let cache = self.cache.clone();
        let transport = Arc::clone(&self.transport);
        let resolution = tokio::spawn(async move {
            let mut pending = cache.begin_optimistic(&[QueryKey::TaskList], |_, view| {
                if let CachedView::List(tasks) = view {
                    tasks.retain(|t| t.id != id);
                }
            });

            match transport.delete(&id).await {
                Ok(()) => {
                    pending.commit();
                    cache.remove(&QueryKey::task(id.clone()));
                    cache.invalidate(&[Tag::TaskList]);
                    debug!(%id, "delete committed");
                    Ok(())
                }
                Err(err) => {
                    pending.revert();
                    warn!(%id, error = %err, "delete reverted");
                    Err(err)
                }
            }
        });
        resolution
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
    }
}
