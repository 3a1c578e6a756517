//! Task module
//!
//! This module contains task-related types, validation, and storage.

mod file_store;
mod memory_store;
mod model;
mod repository;
pub mod validate;

pub use file_store::FileTaskStore;
pub use memory_store::MemoryTaskStore;
pub use model::*;
pub use repository::TaskRepository;
