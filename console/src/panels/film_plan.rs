//! Film plan requests

use serde_json::Value;

use shared::{process_info, FilmPlanRequest, ProcessId};
use crate::core::workflow::{to_list, DEFAULT_BEATS};
use crate::error::{ConsoleError, ConsoleResult};
use crate::panels::{optional_text, required};
use crate::traits::ConsoleApi;

pub const FAILED: &str = "Film plan failed";
pub const MISSING_PROMPT: &str = "Prompt is required";
pub const INVALID_SCENE_LENGTH: &str = "Scene length must be 5 or 10 seconds as required by the API";

/// Film plan form
#[derive(Debug, Clone)]
pub struct FilmPlanInput {
    pub prompt: String,
    pub frame_id: Option<String>,
    /// Comma separated; blank omits beats from the request
    pub beats: String,
    /// Zero falls back to the default duration
    pub total_duration_sec: u32,
    pub scene_length_sec: u32,
    pub aspect_ratio: String,
    pub allocation_mode: String,
    pub style_pack: Option<String>,
    pub llm_enrich: bool,
    /// Only sent when `llm_enrich` is set
    pub temperature: Option<f64>,
    pub seed: Option<i64>,
}

impl Default for FilmPlanInput {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            frame_id: None,
            beats: DEFAULT_BEATS.join(","),
            total_duration_sec: FilmPlanRequest::DEFAULT_TOTAL_DURATION_SEC,
            scene_length_sec: FilmPlanRequest::DEFAULT_SCENE_LENGTH_SEC,
            aspect_ratio: FilmPlanRequest::DEFAULT_ASPECT_RATIO.to_string(),
            allocation_mode: FilmPlanRequest::DEFAULT_ALLOCATION_MODE.to_string(),
            style_pack: None,
            llm_enrich: false,
            temperature: Some(FilmPlanRequest::DEFAULT_TEMPERATURE),
            seed: None,
        }
    }
}

impl FilmPlanInput {
    pub fn to_request(&self) -> ConsoleResult<FilmPlanRequest> {
        let prompt = required(&self.prompt, MISSING_PROMPT)?;

        let mut request = FilmPlanRequest::new(prompt);
        request.scene_length_sec = self.scene_length_sec;
        if !request.has_valid_scene_length() {
            return Err(ConsoleError::validation(INVALID_SCENE_LENGTH));
        }

        let beats = to_list(&self.beats);
        request.frame_id = optional_text(self.frame_id.as_deref());
        request.beats = (!beats.is_empty()).then_some(beats);
        if self.total_duration_sec > 0 {
            request.total_duration_sec = self.total_duration_sec;
        }
        if let Some(aspect_ratio) = optional_text(Some(&self.aspect_ratio)) {
            request.aspect_ratio = aspect_ratio;
        }
        if let Some(allocation_mode) = optional_text(Some(&self.allocation_mode)) {
            request.allocation_mode = allocation_mode;
        }
        request.style_pack = optional_text(self.style_pack.as_deref());
        request.llm_enrich = self.llm_enrich;
        request.temperature = if self.llm_enrich {
            self.temperature.filter(|t| t.is_finite() && *t != 0.0)
        } else {
            None
        };
        request.seed = self.seed;
        Ok(request)
    }
}

pub async fn film_plan<A: ConsoleApi + ?Sized>(api: &A, input: &FilmPlanInput) -> ConsoleResult<Value> {
    let request = input.to_request()?;
    process_info!(
        ProcessId::current(),
        "🎬 Planning {}s film in {}s scenes",
        request.total_duration_sec,
        request.scene_length_sec
    );
    api.film_plan(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(prompt: &str) -> FilmPlanInput {
        FilmPlanInput { prompt: prompt.to_string(), ..Default::default() }
    }

    #[test]
    fn test_prompt_required() {
        let error = input("   ").to_request().unwrap_err();
        assert_eq!(error.to_string(), MISSING_PROMPT);
    }

    #[test]
    fn test_scene_length_must_be_supported() {
        let mut form = input("a lighthouse at dusk");
        form.scene_length_sec = 7;
        assert_eq!(form.to_request().unwrap_err().to_string(), INVALID_SCENE_LENGTH);

        form.scene_length_sec = 5;
        assert_eq!(form.to_request().unwrap().scene_length_sec, 5);
    }

    #[test]
    fn test_defaults_and_omissions() {
        let mut form = input("a lighthouse at dusk");
        form.beats = " , ".to_string();
        form.total_duration_sec = 0;
        form.style_pack = Some("  ".to_string());

        let request = form.to_request().unwrap();
        assert_eq!(request.beats, None);
        assert_eq!(request.total_duration_sec, 60);
        assert_eq!(request.style_pack, None);
        assert_eq!(request.temperature, None);
        assert_eq!(request.allocation_mode, "CurveWeighted");
    }

    #[test]
    fn test_temperature_follows_enrichment() {
        let mut form = input("a lighthouse at dusk");
        form.llm_enrich = true;
        form.seed = Some(7);

        let request = form.to_request().unwrap();
        assert_eq!(request.temperature, Some(0.35));
        assert_eq!(request.seed, Some(7));
        assert_eq!(request.beats.as_ref().map(Vec::len), Some(6));
    }
}
