//! Whole-second clock and date-input helpers
//!
//! Timestamps live in the model as plain `i64` seconds since the Unix
//! epoch; chrono is used only here, at the edges.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;

/// Current time as whole seconds since the Unix epoch.
pub fn now_seconds() -> i64 {
    Utc::now().timestamp()
}

/// True if `seconds` is a timestamp chrono can represent.
pub fn is_valid_timestamp(seconds: i64) -> bool {
    DateTime::<Utc>::from_timestamp(seconds, 0).is_some()
}

/// Parse a `YYYY-MM-DD` date input into seconds since epoch (midnight UTC).
pub fn parse_date_input(input: &str) -> Result<i64, ValidationError> {
    let trimmed = input.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDueDate(trimmed.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ValidationError::InvalidDueDate(trimmed.to_string()))?;
    Ok(midnight.and_utc().timestamp())
}

/// Format seconds since epoch as a `YYYY-MM-DD` date input (UTC).
///
/// Returns `None` for timestamps outside chrono's representable range.
pub fn format_date_input(seconds: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}
