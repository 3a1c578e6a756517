//! Optimistic patch engine
//!
//! Applies a provisional edit to one or more cached views at the moment a
//! mutation is issued, and resolves it once the outcome is known. Each
//! handle captures its own full pre-patch snapshots, so concurrent
//! patches cannot interfere with each other's revert.

use tracing::{debug, warn};

use super::store::{CacheStore, CachedView, QueryKey};

/// Resolution state of a pending patch: `Patched` until committed or
/// reverted, exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchState {
    Patched,
    Committed,
    Reverted,
}

/// Handle to a pending optimistic patch
///
/// Dropping an unresolved handle leaves the speculative edit in place;
/// callers are expected to resolve every mutation they issue.
pub struct PatchHandle {
    store: CacheStore,
    snapshots: Option<Vec<(QueryKey, CachedView)>>,
    state: PatchState,
}

impl CacheStore {
    /// Apply `patch_fn` to every affected key present in the cache, under
    /// a single lock acquisition, snapshotting each prior value. Absent
    /// keys are skipped, not treated as an error.
    pub fn begin_optimistic<F>(&self, affected_keys: &[QueryKey], mut patch_fn: F) -> PatchHandle
    where
        F: FnMut(&QueryKey, &mut CachedView),
    {
        let snapshots = self.patch_views(affected_keys, &mut patch_fn);
        debug!(patched = snapshots.len(), "optimistic patch applied");
        PatchHandle {
            store: self.clone(),
            snapshots: Some(snapshots),
            state: PatchState::Patched,
        }
    }
}

impl PatchHandle {
    /// Discard the snapshots without touching the cache; the caller
    /// writes the authoritative result separately. No-op once resolved.
    pub fn commit(&mut self) {
        if self.state == PatchState::Patched {
            self.snapshots = None;
            self.state = PatchState::Committed;
        }
    }

    /// Write every captured pre-patch value back, overwriting whatever is
    /// currently cached for those keys. No-op once resolved.
    pub fn revert(&mut self) {
        if self.state == PatchState::Patched {
            if let Some(snapshots) = self.snapshots.take() {
                warn!(restored = snapshots.len(), "optimistic patch reverted");
                self.store.restore(&snapshots);
            }
            self.state = PatchState::Reverted;
        }
    }

    pub fn state(&self) -> PatchState {
        self.state
    }
}
