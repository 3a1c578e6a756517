//! Core library for Taskdeck
//!
//! This crate contains the client-side task cache and its collaborators:
//! - Task model, validation, and storage
//! - Query cache with optimistic mutations
//! - Mutation coordination and transports

pub mod cache;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod task;
pub mod time;
pub mod transport;

pub use error::{Error, ValidationError};
pub type Result<T> = std::result::Result<T, Error>;
