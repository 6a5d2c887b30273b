//! Blend and evaluation bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `POST /blend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendRequest {
    pub active: Value,
    pub explosion_fired: bool,
}

/// `POST /evaluate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub piece: String,
    #[serde(default)]
    pub trace: Value,
}

/// One element of `POST /evaluate/batch`; unknown fields pass through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub piece: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub trace: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /eval/framecheck`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramecheckRequest {
    pub frame_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Value>,
}
