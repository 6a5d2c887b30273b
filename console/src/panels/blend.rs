//! Blend an active state

use serde_json::{json, Value};

use shared::BlendRequest;
use crate::error::{ConsoleError, ConsoleResult};
use crate::panels::parse_json_field;
use crate::traits::ConsoleApi;

pub const FAILED: &str = "Blend failed";
pub const MISSING_ACTIVE: &str = "Provide an active state to blend";

/// Starting point offered to the operator
pub fn sample_active_state() -> Value {
    json!({
        "schemas": ["path"],
        "metaphors": ["time_is_motion"],
        "poles": {},
        "gates": []
    })
}

/// `active_json` is operator text and is parsed before anything is sent
pub async fn blend<A: ConsoleApi + ?Sized>(api: &A, active_json: &str, explosion_fired: bool) -> ConsoleResult<Value> {
    let active = parse_json_field("Active", active_json)?
        .ok_or_else(|| ConsoleError::validation(MISSING_ACTIVE))?;

    api.blend(BlendRequest { active, explosion_fired }).await
}
