//! Operator surfaces beyond the compose workflow
//!
//! Each panel validates its input locally, issues at most one request through
//! the [`ConsoleApi`](crate::traits::ConsoleApi) boundary and returns the
//! service's payload. Panel failures stay local to the panel; callers render
//! them with [`ConsoleError::user_message`] and the panel's fallback text.

pub mod blend;
pub mod control;
pub mod evaluate;
pub mod film_plan;
pub mod generate;
pub mod library;
pub mod retrieval;

use serde_json::Value;

use crate::error::{ConsoleError, ConsoleResult};

/// Trimmed `value`, or a validation error carrying `message` when blank
pub(crate) fn required(value: &str, message: &str) -> ConsoleResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ConsoleError::validation(message))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse operator-supplied JSON; blank text is `None`
pub fn parse_json_field(field: &str, raw: &str) -> ConsoleResult<Option<Value>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| ConsoleError::malformed(field, &e))
}

/// Blank or absent text as `None`, trimmed otherwise
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
