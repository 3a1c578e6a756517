//! Client-side query cache
//!
//! Holds the most recently known server state per query key, marks it
//! stale through tag-based invalidation, and supports speculative edits
//! that can be committed or reverted once the server answers.

mod optimistic;
mod store;

pub use optimistic::{PatchHandle, PatchState};
pub use store::{CacheEntry, CacheEvent, CacheStore, CachedView, QueryKey, Tag};
