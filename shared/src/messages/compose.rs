//! Plan → compose → beat workflow bodies and one-shot generation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// `POST /compose/plan`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub frame_id: String,
    pub query: String,
    pub k: u32,
}

/// One entry of a plan's ordered beat list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatDescriptor {
    #[serde(default)]
    pub beat: Option<String>,
    #[serde(flatten)]
    pub detail: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanResult {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub plan: Vec<BeatDescriptor>,
    #[serde(default)]
    pub active: Option<Value>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub warnings: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanResult {
    /// Non-blank beat names in plan order
    pub fn beat_names(&self) -> Vec<String> {
        self.plan
            .iter()
            .filter_map(|descriptor| descriptor.beat.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The server-issued active context, ignoring an explicit null
    pub fn active_context(&self) -> Option<&Value> {
        self.active.as_ref().filter(|value| !value.is_null())
    }
}

/// `POST /compose`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub frame_id: String,
    pub query: String,
    pub beats: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<Value>,
}

/// Prompts keyed by beat, then by section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComposePrompts {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub beats: BTreeMap<String, Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComposePrompts {
    pub fn sections(&self, beat: &str) -> Option<&Map<String, Value>> {
        self.beats.get(beat)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComposeResult {
    #[serde(default)]
    pub active: Option<Value>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub prompts: ComposePrompts,
    #[serde(default)]
    pub trace: Value,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub warnings: Vec<String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub bankset: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComposeResult {
    pub fn active_context(&self) -> Option<&Value> {
        self.active.as_ref().filter(|value| !value.is_null())
    }
}

/// `POST /compose/beat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatRequest {
    pub frame_id: String,
    pub beat: String,
    pub query: String,
    pub active: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BeatResult {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub prompts: Map<String, Value>,
    #[serde(default)]
    pub trace_beat: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /generate`; a missing `llm` is filled from the configured harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub frame_id: String,
    pub query: String,
    pub beats: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_beat_names_skip_unnamed_descriptors() {
        let plan: PlanResult = serde_json::from_value(json!({
            "plan": [{"beat": "hook", "schema": "path"}, {"note": "x"}, {"beat": " turn "}],
            "active": {"schemas": []}
        }))
        .unwrap();

        assert_eq!(plan.beat_names(), vec!["hook", "turn"]);
        assert_eq!(plan.plan[0].detail.get("schema"), Some(&json!("path")));
        assert!(plan.active_context().is_some());
    }

    #[test]
    fn test_null_active_is_not_a_context() {
        let result: ComposeResult = serde_json::from_value(json!({"active": null})).unwrap();
        assert!(result.active_context().is_none());
    }

    #[test]
    fn test_compose_prompts_by_beat_and_section() {
        let result: ComposeResult = serde_json::from_value(json!({
            "active": {"frames": ["journey"]},
            "prompts": {"beats": {"hook": {"system": "s", "user": "u"}}},
            "trace": {"steps": 2},
            "bankset": ["default"]
        }))
        .unwrap();

        let sections = result.prompts.sections("hook").unwrap();
        assert_eq!(sections.get("user"), Some(&json!("u")));
        assert_eq!(result.bankset, vec!["default"]);
    }

    #[test]
    fn test_null_plan_warnings_keep_the_plan() {
        let plan: PlanResult = serde_json::from_value(json!({
            "plan": [{"beat": "hook"}],
            "active": {"schemas": ["path"]},
            "warnings": null
        }))
        .unwrap();

        assert!(plan.warnings.is_empty());
        assert_eq!(plan.beat_names(), vec!["hook"]);
        assert!(plan.active_context().is_some());
    }

    #[test]
    fn test_null_compose_fields_read_as_empty() {
        let result: ComposeResult = serde_json::from_value(json!({
            "active": {"frames": ["journey"]},
            "prompts": {"beats": null},
            "warnings": null,
            "bankset": null
        }))
        .unwrap();

        assert!(result.prompts.beats.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.bankset.is_empty());
        assert!(result.active_context().is_some());

        let result: ComposeResult = serde_json::from_value(json!({"prompts": null})).unwrap();
        assert!(result.prompts.sections("hook").is_none());
    }

    #[test]
    fn test_null_beat_prompts_read_as_empty() {
        let result: BeatResult =
            serde_json::from_value(json!({"prompts": null, "trace_beat": {"beat": "hook"}})).unwrap();

        assert!(result.prompts.is_empty());
        assert_eq!(result.trace_beat["beat"], "hook");
    }

    #[test]
    fn test_compose_request_omits_missing_active() {
        let request = ComposeRequest {
            frame_id: "journey".to_string(),
            query: "a door of light".to_string(),
            beats: vec!["hook".to_string()],
            active: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("active").is_none());
    }
}
