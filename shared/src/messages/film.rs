//! P12 film plan request

use serde::{Deserialize, Serialize};

/// `POST /p12/filmplan`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmPlanRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beats: Option<Vec<String>>,
    pub total_duration_sec: u32,
    pub scene_length_sec: u32,
    pub aspect_ratio: String,
    /// Free text, `CurveWeighted` unless the operator names another mode
    pub allocation_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_pack: Option<String>,
    pub llm_enrich: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl FilmPlanRequest {
    pub const DEFAULT_TOTAL_DURATION_SEC: u32 = 60;
    pub const DEFAULT_SCENE_LENGTH_SEC: u32 = 10;
    pub const DEFAULT_ASPECT_RATIO: &'static str = "16:9";
    pub const DEFAULT_ALLOCATION_MODE: &'static str = "CurveWeighted";
    pub const DEFAULT_TEMPERATURE: f64 = 0.35;
    /// Scene lengths the planner accepts
    pub const SCENE_LENGTHS: [u32; 2] = [5, 10];

    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            frame_id: None,
            beats: None,
            total_duration_sec: Self::DEFAULT_TOTAL_DURATION_SEC,
            scene_length_sec: Self::DEFAULT_SCENE_LENGTH_SEC,
            aspect_ratio: Self::DEFAULT_ASPECT_RATIO.to_string(),
            allocation_mode: Self::DEFAULT_ALLOCATION_MODE.to_string(),
            style_pack: None,
            llm_enrich: false,
            temperature: None,
            seed: None,
        }
    }

    pub fn has_valid_scene_length(&self) -> bool {
        Self::SCENE_LENGTHS.contains(&self.scene_length_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_serialize_without_optional_fields() {
        let value = serde_json::to_value(FilmPlanRequest::new("a lighthouse at dusk")).unwrap();
        assert_eq!(
            value,
            json!({
                "prompt": "a lighthouse at dusk",
                "total_duration_sec": 60,
                "scene_length_sec": 10,
                "aspect_ratio": "16:9",
                "allocation_mode": "CurveWeighted",
                "llm_enrich": false
            })
        );
    }

    #[test]
    fn test_scene_length_validation() {
        let mut request = FilmPlanRequest::new("x");
        assert!(request.has_valid_scene_length());
        request.scene_length_sec = 5;
        assert!(request.has_valid_scene_length());
        request.scene_length_sec = 7;
        assert!(!request.has_valid_scene_length());
    }
}
