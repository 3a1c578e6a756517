//! Shared validation rules
//!
//! The same rules run client-side (before any request is sent) and inside
//! the repositories, so the two sides cannot drift apart.

use crate::error::ValidationError;
use crate::time;

use super::model::{NewTask, Patch, TaskPatch};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;
pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 9;

/// Trim and check a title: required, at most 200 characters.
pub fn title(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::TitleEmpty);
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(trimmed.to_string())
}

/// Trim and check a description: may be empty, at most 2000 characters.
pub fn description(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(trimmed.to_string())
}

/// Check a priority: 1 through 9 inclusive.
pub fn priority(value: u8) -> Result<u8, ValidationError> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&value) {
        return Err(ValidationError::PriorityOutOfRange);
    }
    Ok(value)
}

/// Check a due date: any timestamp chrono can represent.
pub fn due_date(seconds: i64) -> Result<i64, ValidationError> {
    if !time::is_valid_timestamp(seconds) {
        return Err(ValidationError::InvalidDueDate(seconds.to_string()));
    }
    Ok(seconds)
}

/// Validate a create draft, returning its normalized (trimmed) form.
pub fn new_task(draft: &NewTask) -> Result<NewTask, ValidationError> {
    let mut normalized = draft.clone();
    normalized.title = title(&draft.title)?;
    if let Some(raw) = &draft.description {
        normalized.description = Some(description(raw)?);
    }
    if let Some(value) = draft.priority {
        priority(value)?;
    }
    if let Some(seconds) = draft.due_date {
        due_date(seconds)?;
    }
    Ok(normalized)
}

/// Validate a partial update, returning its normalized (trimmed) form.
pub fn task_patch(patch: &TaskPatch) -> Result<TaskPatch, ValidationError> {
    let mut normalized = patch.clone();
    if let Some(raw) = &patch.title {
        normalized.title = Some(title(raw)?);
    }
    if let Some(raw) = &patch.description {
        normalized.description = Some(description(raw)?);
    }
    if let Patch::Set(value) = patch.priority {
        priority(value)?;
    }
    if let Patch::Set(seconds) = patch.due_date {
        due_date(seconds)?;
    }
    Ok(normalized)
}
