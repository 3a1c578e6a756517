//! Query layer: the UI-facing facade
//!
//! Wraps a cache store, a transport, and a mutation coordinator behind
//! one handle. Reads are cache-first; a fresh entry never touches the
//! network, an absent or stale one refetches and rewrites the cache.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::cache::{CacheEvent, CacheStore, CachedView, QueryKey};
use crate::coordinator::MutationCoordinator;
use crate::task::{NewTask, Task, TaskPatch};
use crate::transport::TaskTransport;
use crate::Result;

/// Synchronous view of the cached list plus the flags the UI consumes.
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    pub tasks: Vec<Task>,
    /// The list has been fetched at least once
    pub loaded: bool,
    /// The cached value is stale; the next read will hit the network
    pub refreshing: bool,
}

pub struct TaskClient {
    cache: CacheStore,
    transport: Arc<dyn TaskTransport>,
    coordinator: MutationCoordinator,
}

impl TaskClient {
    /// Build a client with a fresh cache.
    pub fn new(transport: Arc<dyn TaskTransport>) -> Self {
        Self::with_cache(CacheStore::new(), transport)
    }

    /// Build a client around an existing cache instance.
    pub fn with_cache(cache: CacheStore, transport: Arc<dyn TaskTransport>) -> Self {
        let coordinator = MutationCoordinator::new(cache.clone(), Arc::clone(&transport));
        Self {
            cache,
            transport,
            coordinator,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }

    /// Cache-first list read.
    pub async fn tasks(&self) -> Result<Vec<Task>> {
        if let Some(entry) = self.cache.get(&QueryKey::TaskList) {
            if !entry.stale {
                if let Some(tasks) = entry.view.as_list() {
                    return Ok(tasks.to_vec());
                }
            }
        }
        self.refresh_tasks().await
    }

    /// Refetch the list regardless of freshness. On failure the cache is
    /// left untouched, so stale data stays readable.
    pub async fn refresh_tasks(&self) -> Result<Vec<Task>> {
        let tasks = self.transport.list().await?;
        self.cache
            .write(QueryKey::TaskList, CachedView::List(tasks.clone()));
        Ok(tasks)
    }

    /// Cache-first detail read.
    pub async fn task(&self, id: &str) -> Result<Task> {
        let key = QueryKey::task(id);
        if let Some(entry) = self.cache.get(&key) {
            if !entry.stale {
                if let Some(task) = entry.view.as_detail() {
                    return Ok(task.clone());
                }
            }
        }
        let task = self.transport.get(id).await?;
        self.cache.write(key, CachedView::Detail(task.clone()));
        Ok(task)
    }

    /// Current cached list and loading flags, without network access.
    pub fn list_snapshot(&self) -> ListSnapshot {
        match self.cache.get(&QueryKey::TaskList) {
            Some(entry) => ListSnapshot {
                tasks: entry.view.as_list().map(<[Task]>::to_vec).unwrap_or_default(),
                loaded: true,
                refreshing: entry.stale,
            },
            None => ListSnapshot::default(),
        }
    }

    pub async fn create(&self, draft: NewTask) -> Result<Task> {
        self.coordinator.create(draft).await
    }

    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        self.coordinator.update(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.coordinator.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{MemoryTaskStore, TaskRepository, TaskStatus};
    use crate::transport::LocalTransport;
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts list calls and can be switched into failure mode.
    struct InstrumentedTransport {
        inner: LocalTransport,
        list_calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl InstrumentedTransport {
        fn new(repository: Arc<dyn TaskRepository>) -> Self {
            Self {
                inner: LocalTransport::new(repository),
                list_calls: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }

        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(Error::transport("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl TaskTransport for InstrumentedTransport {
        async fn list(&self) -> Result<Vec<Task>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.inner.list().await
        }
        async fn get(&self, id: &str) -> Result<Task> {
            self.check()?;
            self.inner.get(id).await
        }
        async fn create(&self, draft: &NewTask) -> Result<Task> {
            self.check()?;
            self.inner.create(draft).await
        }
        async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
            self.check()?;
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: &str) -> Result<()> {
            self.check()?;
            self.inner.delete(id).await
        }
    }

    async fn seeded_client(titles: &[&str]) -> (TaskClient, Arc<InstrumentedTransport>) {
        let repository = Arc::new(MemoryTaskStore::new());
        for title in titles {
            repository.create(NewTask::new(*title)).await.unwrap();
        }
        let transport = Arc::new(InstrumentedTransport::new(repository));
        let client = TaskClient::new(Arc::clone(&transport) as Arc<dyn TaskTransport>);
        (client, transport)
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let (client, transport) = seeded_client(&["One", "Two"]).await;

        let first = client.tasks().await.unwrap();
        let second = client.tasks().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_refetches() {
        let (client, transport) = seeded_client(&["One"]).await;

        client.tasks().await.unwrap();
        // A successful create marks the list stale
        client.create(NewTask::new("Two")).await.unwrap();
        assert!(client.list_snapshot().refreshing);

        let tasks = client.tasks().await.unwrap();
        assert_eq!(transport.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(tasks.len(), 2);
        assert!(!client.list_snapshot().refreshing);
    }

    #[tokio::test]
    async fn test_detail_read_is_cache_first() {
        let (client, _transport) = seeded_client(&["One"]).await;
        let listed = client.tasks().await.unwrap();
        let id = listed[0].id.clone();

        let fetched = client.task(&id).await.unwrap();
        assert_eq!(fetched.title, "One");
        // Second read served from cache even if the backend disappears
        _transport.failing.store(true, Ordering::SeqCst);
        let cached = client.task(&id).await.unwrap();
        assert_eq!(cached, fetched);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_stale_data_readable() {
        let (client, transport) = seeded_client(&["One"]).await;
        client.tasks().await.unwrap();

        transport.failing.store(true, Ordering::SeqCst);
        let result = client.refresh_tasks().await;
        assert!(matches!(result, Err(Error::Transport { .. })));

        let snapshot = client.list_snapshot();
        assert!(snapshot.loaded);
        assert_eq!(snapshot.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_list_snapshot_before_first_fetch() {
        let (client, _transport) = seeded_client(&[]).await;
        let snapshot = client.list_snapshot();
        assert!(!snapshot.loaded);
        assert!(!snapshot.refreshing);
        assert!(snapshot.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_full_optimistic_round_trip() {
        let (client, _transport) = seeded_client(&[]).await;
        assert!(client.tasks().await.unwrap().is_empty());

        let created = client
            .create(NewTask::new("Buy milk").with_priority(3))
            .await
            .unwrap();
        let tasks = client.tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0], created);

        let updated = client
            .update(&created.id, TaskPatch::default().with_status(TaskStatus::Done))
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);

        client.delete(&created.id).await.unwrap();
        assert!(client.tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shared_cache_across_clients() {
        let repository = Arc::new(MemoryTaskStore::new());
        let cache = CacheStore::new();
        let a = TaskClient::with_cache(
            cache.clone(),
            Arc::new(LocalTransport::new(Arc::clone(&repository) as Arc<dyn TaskRepository>)),
        );
        let b = TaskClient::with_cache(
            cache,
            Arc::new(LocalTransport::new(repository as Arc<dyn TaskRepository>)),
        );

        a.create(NewTask::new("Shared")).await.unwrap();
        a.tasks().await.unwrap();

        // b sees a's cached list without a fetch of its own
        let snapshot = b.list_snapshot();
        assert!(snapshot.loaded);
        assert_eq!(snapshot.tasks.len(), 1);
    }
}
