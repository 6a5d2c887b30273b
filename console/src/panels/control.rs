//! Expectation curves, viewpoint and attention probes

use serde_json::Value;

use shared::{validate_lang, AttentionRequest, ExpectationRequest, ViewpointRequest, DEFAULT_LANG};
use crate::core::workflow::{to_list, DEFAULT_BEATS};
use crate::core::CurveView;
use crate::error::{ConsoleError, ConsoleResult};
use crate::panels::{optional_text, required};
use crate::traits::ConsoleApi;

pub const EXPECTATION_FAILED: &str = "Expectation request failed";
pub const VIEWPOINT_FAILED: &str = "Viewpoint request failed";
pub const ATTENTION_FAILED: &str = "Attention request failed";

pub const MISSING_METAPHOR: &str = "Provide at least one active metaphor";
pub const MISSING_PROMPT: &str = "Prompt is required";
pub const MISSING_TEXT: &str = "Text is required";

/// Expectation form as typed by the operator. Lists are comma separated.
#[derive(Debug, Clone)]
pub struct ExpectationInput {
    pub metaphors: String,
    pub beats: String,
    /// `axis:pole` pairs
    pub poles: String,
    pub base: String,
}

impl Default for ExpectationInput {
    fn default() -> Self {
        Self {
            metaphors: String::new(),
            beats: DEFAULT_BEATS.join(","),
            poles: String::new(),
            base: ExpectationRequest::DEFAULT_BASE.to_string(),
        }
    }
}

impl ExpectationInput {
    pub fn to_request(&self) -> ConsoleResult<ExpectationRequest> {
        let active_metaphors = to_list(&self.metaphors);
        if active_metaphors.is_empty() {
            return Err(ConsoleError::validation(MISSING_METAPHOR));
        }

        let base = optional_text(Some(&self.base))
            .unwrap_or_else(|| ExpectationRequest::DEFAULT_BASE.to_string());
        Ok(ExpectationRequest {
            active_metaphors,
            beats: to_list(&self.beats),
            base,
            poles: ExpectationRequest::parse_poles(&to_list(&self.poles)),
        })
    }
}

/// Expectation payload together with its aligned before/after curve
#[derive(Debug, Clone)]
pub struct ExpectationOutcome {
    pub result: Value,
    pub curve: CurveView,
}

pub async fn expectation<A: ConsoleApi + ?Sized>(api: &A, input: &ExpectationInput) -> ConsoleResult<ExpectationOutcome> {
    let request = input.to_request()?;
    let result = api.expectation(request).await?;
    let curve = CurveView::from_result(&result);
    Ok(ExpectationOutcome { result, curve })
}

fn language(lang: &str) -> ConsoleResult<String> {
    if lang.trim().is_empty() {
        return Ok(DEFAULT_LANG.to_string());
    }
    validate_lang(lang).map_err(|_| ConsoleError::validation(format!("Unsupported language tag: {}", lang.trim())))
}

pub async fn viewpoint<A: ConsoleApi + ?Sized>(
    api: &A,
    prompt: &str,
    frame_id: Option<&str>,
    lang: &str,
) -> ConsoleResult<Value> {
    required(prompt, MISSING_PROMPT)?;
    let request = ViewpointRequest {
        prompt: prompt.to_string(),
        frame_id: optional_text(frame_id),
        lang: language(lang)?,
    };
    api.viewpoint(request).await
}

pub async fn attention<A: ConsoleApi + ?Sized>(api: &A, text: &str, lang: &str, top_k: u32) -> ConsoleResult<Value> {
    required(text, MISSING_TEXT)?;
    let request = AttentionRequest {
        text: text.to_string(),
        lang: language(lang)?,
        top_k: top_k.max(1),
    };
    api.attention(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expectation_input_defaults() {
        let input = ExpectationInput {
            metaphors: "time_is_motion, ,journey".to_string(),
            base: "  ".to_string(),
            ..Default::default()
        };
        let request = input.to_request().unwrap();

        assert_eq!(request.active_metaphors, vec!["time_is_motion", "journey"]);
        assert_eq!(request.beats.len(), DEFAULT_BEATS.len());
        assert_eq!(request.base, "linear");
        assert!(request.poles.is_empty());
    }

    #[test]
    fn test_expectation_input_poles() {
        let input = ExpectationInput {
            metaphors: "journey".to_string(),
            poles: "tension:high, tone : dark, broken".to_string(),
            ..Default::default()
        };
        let request = input.to_request().unwrap();
        assert_eq!(request.poles.len(), 2);
        assert_eq!(request.poles["tone"], "dark");
    }

    #[test]
    fn test_expectation_requires_metaphor() {
        let error = ExpectationInput::default().to_request().unwrap_err();
        assert_eq!(error.to_string(), MISSING_METAPHOR);
        assert!(error.is_local());
    }

    #[test]
    fn test_language() {
        assert_eq!(language("").unwrap(), "en");
        assert_eq!(language("FR").unwrap(), "fr");
        assert!(language("f r").is_err());
    }
}
