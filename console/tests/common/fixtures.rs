//! Standard test data for console tests

use serde_json::{json, Value};
use shared::{BeatResult, ComposeResult, PlanResult, RetrievalHit, SearchResult};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const FRAME_ID: &'static str = "journey";
    pub const QUERY: &'static str = "a door of light";
    pub const K: u32 = 6;

    /// Beats the standard plan returns
    pub const PLAN_BEATS: [&'static str; 2] = ["hook", "setup"];

    /// Active context the planner hands back
    pub fn plan_active() -> Value {
        json!({ "schemas": ["path"], "metaphors": ["time_is_motion"], "poles": {}, "gates": [] })
    }

    /// Active context after composition, with the blend applied
    pub fn compose_active() -> Value {
        json!({ "schemas": ["path", "container"], "metaphors": ["time_is_motion"], "poles": { "tension": "high" }, "gates": [] })
    }

    pub fn plan_result() -> PlanResult {
        serde_json::from_value(json!({
            "plan": Self::PLAN_BEATS.iter().map(|beat| json!({ "beat": beat, "weight": 0.5 })).collect::<Vec<_>>(),
            "active": Self::plan_active(),
            "warnings": []
        }))
        .unwrap()
    }

    pub fn compose_result() -> ComposeResult {
        serde_json::from_value(json!({
            "active": Self::compose_active(),
            "prompts": {
                "beats": {
                    "hook": { "system": "Open on the threshold.", "user": "A door of light." },
                    "setup": { "system": "Establish the corridor.", "user": "Footsteps echo." }
                }
            },
            "trace": { "blend": "applied" },
            "warnings": ["gate list empty"],
            "bankset": ["default"]
        }))
        .unwrap()
    }

    pub fn beat_result() -> BeatResult {
        serde_json::from_value(json!({
            "prompts": { "system": "Open on the threshold, again.", "user": "The light narrows." },
            "trace_beat": { "beat": "hook" }
        }))
        .unwrap()
    }

    pub fn search_result() -> SearchResult {
        SearchResult {
            hits: vec![
                RetrievalHit::new("path", "schema", 0.91),
                RetrievalHit::new("time_is_motion", "metaphor", 0.84),
                RetrievalHit::new("threshold", "exemplar", 0.42),
            ],
            ..Default::default()
        }
    }
}
