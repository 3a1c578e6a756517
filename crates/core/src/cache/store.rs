//! Cache store: query-keyed views with tag-based invalidation
//!
//! The store is an explicitly constructed, injectable instance shared by
//! handle (cheap `Clone`), never ambient global state. All operations are
//! synchronous and run to completion under the interior lock; there is no
//! suspension point inside the store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::task::Task;

const EVENT_CAPACITY: usize = 256;

/// Identity of a cached query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The "all tasks" singleton
    TaskList,
    /// A single task fetched by identifier
    Task(String),
}

impl QueryKey {
    pub fn task(id: impl Into<String>) -> Self {
        Self::Task(id.into())
    }
}

/// Invalidation label shared between queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    TaskList,
    Task(String),
}

impl Tag {
    pub fn task(id: impl Into<String>) -> Self {
        Self::Task(id.into())
    }
}

/// A cached query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedView {
    /// Ordered task collection, newest first
    List(Vec<Task>),
    /// Single task keyed by identifier
    Detail(Task),
}

impl CachedView {
    pub fn as_list(&self) -> Option<&[Task]> {
        match self {
            Self::List(tasks) => Some(tasks),
            Self::Detail(_) => None,
        }
    }

    pub fn as_detail(&self) -> Option<&Task> {
        match self {
            Self::Detail(task) => Some(task),
            Self::List(_) => None,
        }
    }

    /// Tags this value provides: the list provides the list tag plus one
    /// per contained record, a detail provides its record's tag.
    fn provided_tags(&self) -> Vec<Tag> {
        match self {
            Self::List(tasks) => std::iter::once(Tag::TaskList)
                .chain(tasks.iter().map(|t| Tag::task(&t.id)))
                .collect(),
            Self::Detail(task) => vec![Tag::task(&task.id)],
        }
    }
}

/// Notification sent to cache observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Written(QueryKey),
    Invalidated(QueryKey),
    Removed(QueryKey),
}

/// A cached value together with its staleness flag
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub view: CachedView,
    pub stale: bool,
}

struct Entry {
    view: CachedView,
    stale: bool,
    tags: Vec<Tag>,
}

/// Query-keyed cache with tag-based invalidation and change events
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<RwLock<HashMap<QueryKey, Entry>>>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Last value written for the key, without staleness information.
    pub fn read(&self, key: &QueryKey) -> Option<CachedView> {
        let inner = self.inner.read();
        inner.get(key).map(|e| e.view.clone())
    }

    /// Last value written for the key plus its staleness flag.
    pub fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        let inner = self.inner.read();
        inner.get(key).map(|e| CacheEntry {
            view: e.view.clone(),
            stale: e.stale,
        })
    }

    /// Replace the cached value for a key, clearing its staleness.
    ///
    /// Records in the written value are propagated into other views that
    /// already hold the same identifier, so all views agree on the next
    /// read. Propagation changes values only; it never creates entries
    /// and never touches other keys' staleness.
    pub fn write(&self, key: QueryKey, view: CachedView) {
        let mut inner = self.inner.write();
        let propagated = Self::propagate(&mut inner, &key, &view);
        let tags = view.provided_tags();
        inner.insert(
            key.clone(),
            Entry {
                view,
                stale: false,
                tags,
            },
        );
        self.emit(CacheEvent::Written(key));
        for touched in propagated {
            self.emit(CacheEvent::Written(touched));
        }
    }

    /// Mark every query providing one of the tags as stale.
    ///
    /// Data is not dropped; the next read through the query layer
    /// refetches.
    pub fn invalidate(&self, tags: &[Tag]) {
        let mut inner = self.inner.write();
        for (key, entry) in inner.iter_mut() {
            if entry.tags.iter().any(|t| tags.contains(t)) {
                entry.stale = true;
                debug!(?key, "cache entry marked stale");
                self.emit(CacheEvent::Invalidated(key.clone()));
            }
        }
    }

    /// Drop the entry for a key entirely.
    pub fn remove(&self, key: &QueryKey) {
        let mut inner = self.inner.write();
        if inner.remove(key).is_some() {
            self.emit(CacheEvent::Removed(key.clone()));
        }
    }

    /// Replace every cached occurrence of `match_id` with `record`.
    ///
    /// Used to reconcile an authoritative server record into whichever
    /// views currently hold the (possibly provisional) version. Never
    /// creates entries.
    pub fn replace_record(&self, match_id: &str, record: &Task) {
        let mut inner = self.inner.write();
        let mut touched = Vec::new();
        for (key, entry) in inner.iter_mut() {
            let changed = match &mut entry.view {
                CachedView::List(tasks) => {
                    if let Some(slot) = tasks.iter_mut().find(|t| t.id == match_id) {
                        *slot = record.clone();
                        true
                    } else {
                        false
                    }
                }
                CachedView::Detail(task) => {
                    if task.id == match_id {
                        *task = record.clone();
                        true
                    } else {
                        false
                    }
                }
            };
            if changed {
                entry.tags = entry.view.provided_tags();
                touched.push(key.clone());
            }
        }
        for key in touched {
            self.emit(CacheEvent::Written(key));
        }
    }

    /// Subscribe to cache change events. Delivery happens on the
    /// receiver's next poll; a dropped receiver is simply ignored.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Snapshot-and-patch every present key under one lock acquisition.
    /// Absent keys are skipped. Returns the pre-patch snapshots.
    pub(crate) fn patch_views(
        &self,
        keys: &[QueryKey],
        patch_fn: &mut dyn FnMut(&QueryKey, &mut CachedView),
    ) -> Vec<(QueryKey, CachedView)> {
        let mut inner = self.inner.write();
        let mut snapshots = Vec::new();
        for key in keys {
            if let Some(entry) = inner.get_mut(key) {
                let old = entry.view.clone();
                patch_fn(key, &mut entry.view);
                entry.tags = entry.view.provided_tags();
                snapshots.push((key.clone(), old));
                self.emit(CacheEvent::Written(key.clone()));
            }
        }
        snapshots
    }

    /// Write snapshots back verbatim, last-revert-wins. No cross-view
    /// propagation: each snapshot goes back to its own key exactly. An
    /// entry removed in the interim is reinserted.
    pub(crate) fn restore(&self, snapshots: &[(QueryKey, CachedView)]) {
        let mut inner = self.inner.write();
        for (key, view) in snapshots {
            let tags = view.provided_tags();
            match inner.get_mut(key) {
                Some(entry) => {
                    entry.view = view.clone();
                    entry.tags = tags;
                }
                None => {
                    inner.insert(
                        key.clone(),
                        Entry {
                            view: view.clone(),
                            stale: false,
                            tags,
                        },
                    );
                }
            }
            self.emit(CacheEvent::Written(key.clone()));
        }
    }

    /// Push written records into other views already holding the same
    /// identifier. Returns the keys whose values changed.
    fn propagate(
        inner: &mut HashMap<QueryKey, Entry>,
        written_key: &QueryKey,
        view: &CachedView,
    ) -> Vec<QueryKey> {
        let records: Vec<&Task> = match view {
            CachedView::List(tasks) => tasks.iter().collect(),
            CachedView::Detail(task) => vec![task],
        };
        let mut touched = Vec::new();
        for (key, entry) in inner.iter_mut() {
            if key == written_key {
                continue;
            }
            let changed = match &mut entry.view {
                CachedView::List(tasks) => {
                    let mut any = false;
                    for slot in tasks.iter_mut() {
                        if let Some(record) = records.iter().find(|r| r.id == slot.id) {
                            if *slot != **record {
                                *slot = (*record).clone();
                                any = true;
                            }
                        }
                    }
                    any
                }
                CachedView::Detail(task) => match records.iter().find(|r| r.id == task.id) {
                    Some(record) if *task != **record => {
                        *task = (*record).clone();
                        true
                    }
                    _ => false,
                },
            };
            if changed {
                touched.push(key.clone());
            }
        }
        touched
    }

    fn emit(&self, event: CacheEvent) {
        // No receivers is not an error; the cache is the source of truth.
        let _ = self.events.send(event);
    }
}
